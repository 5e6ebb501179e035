//! Core data model types for edugain.
//!
//! These mirror the records the persistence layer keeps for one experiment:
//! cohorts, assessments with their questions and choices, participants and
//! their participations. Answer payloads stay serialized on the record and
//! are parsed into typed sets at the boundary.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultError};

/// A pre/post experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What the experiment studies.
    #[serde(default)]
    pub description: String,
    /// When the experiment was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A group of participants receiving one treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cohort {
    pub id: String,
    pub experiment_id: String,
    /// Label such as "Control" or "Intervention".
    pub name: String,
}

/// When an assessment is administered relative to the intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Pre,
    Post,
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentKind::Pre => write!(f, "pre"),
            AssessmentKind::Post => write!(f, "post"),
        }
    }
}

impl FromStr for AssessmentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pre" => Ok(AssessmentKind::Pre),
            "post" => Ok(AssessmentKind::Post),
            other => Err(format!("unknown assessment kind: {other}")),
        }
    }
}

/// A pre- or post-test of an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub experiment_id: String,
    pub kind: AssessmentKind,
    #[serde(default)]
    pub description: String,
}

/// How a question is answered, which also decides how it is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    #[serde(rename = "single", alias = "single-choice")]
    SingleChoice,
    #[serde(rename = "multiple", alias = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "text", alias = "free-text")]
    FreeText,
}

impl InputKind {
    /// Whether answers to this kind of question reference choices.
    pub fn has_choices(self) -> bool {
        !matches!(self, InputKind::FreeText)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::SingleChoice => write!(f, "single"),
            InputKind::MultipleChoice => write!(f, "multiple"),
            InputKind::FreeText => write!(f, "text"),
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "single-choice" => Ok(InputKind::SingleChoice),
            "multiple" | "multiple-choice" => Ok(InputKind::MultipleChoice),
            "text" | "free-text" => Ok(InputKind::FreeText),
            other => Err(format!("unknown input kind: {other}")),
        }
    }
}

/// A question of an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub assessment_id: String,
    /// The prompt shown to participants. Identical text across assessments
    /// marks the same measurement instrument.
    pub text: String,
    pub kind: InputKind,
}

/// One selectable answer of a choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub question_id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Someone taking part in an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub experiment_id: String,
    pub cohort_id: String,
    /// Opaque token the participant uses to access assessments.
    #[serde(default)]
    pub access_token: String,
}

/// One participant's recorded answers for one assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    pub experiment_id: String,
    pub assessment_id: String,
    pub participant_id: String,
    /// Serialized answer set: question id to selected choice ids.
    #[serde(default)]
    pub answers: Option<String>,
    /// Serialized demographic answers: demographic id to option id(s).
    #[serde(default)]
    pub demographics: Option<String>,
}

impl Participation {
    /// Identifier used in diagnostics.
    pub fn key(&self) -> String {
        format!("{}/{}", self.participant_id, self.assessment_id)
    }

    /// Parse the answer payload, if any.
    pub fn answer_set(&self) -> Result<Option<AnswerSet>> {
        self.answers
            .as_deref()
            .map(|raw| {
                AnswerSet::parse(raw).map_err(|source| ResultError::Parse {
                    participation: self.key(),
                    source,
                })
            })
            .transpose()
    }

    /// Parse the demographic payload, if any.
    pub fn demographic_answers(&self) -> Result<Option<DemographicAnswers>> {
        self.demographics
            .as_deref()
            .map(|raw| {
                DemographicAnswers::parse(raw).map_err(|source| ResultError::Parse {
                    participation: self.key(),
                    source,
                })
            })
            .transpose()
    }
}

/// A question about participants themselves (age range, prior course...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographic {
    pub id: String,
    pub experiment_id: String,
    pub text: String,
    pub kind: InputKind,
}

/// One option of a demographic question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicOption {
    pub id: String,
    pub demographic_id: String,
    pub text: String,
}

/// Validated answers of one participation: question id to selected choice ids.
///
/// Free-text answers are stored as a one-element list holding the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, Vec<String>>);

impl AnswerSet {
    /// Parse a serialized answer payload, rejecting any other shape.
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Selected choice ids for a question, if it was answered.
    pub fn get(&self, question_id: &str) -> Option<&[String]> {
        self.0.get(question_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        AnswerSet(iter.into_iter().collect())
    }
}

/// Value of one demographic answer: a single option or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum DemographicValue {
    One(String),
    Many(Vec<String>),
}

/// Validated demographic answers: demographic id to selected option ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemographicAnswers(BTreeMap<String, Vec<String>>);

impl DemographicAnswers {
    /// Parse a serialized demographic payload. Each value must be a string
    /// or a list of strings.
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        let values: BTreeMap<String, DemographicValue> = serde_json::from_str(raw)?;
        Ok(DemographicAnswers(
            values
                .into_iter()
                .map(|(id, value)| match value {
                    DemographicValue::One(option) => (id, vec![option]),
                    DemographicValue::Many(options) => (id, options),
                })
                .collect(),
        ))
    }

    pub fn get(&self, demographic_id: &str) -> Option<&[String]> {
        self.0.get(demographic_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

/// Order identifiers numerically when both are unsigned integers, and
/// lexicographically otherwise.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
