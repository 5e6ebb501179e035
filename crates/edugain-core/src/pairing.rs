//! Matching of equivalent questions across assessments.
//!
//! Questions with verbatim identical text are the same instrument measured
//! at different times. Only scored (choice) questions are matched.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::loader::Dataset;
use crate::model::compare_ids;

/// One member of a matched group: a question and the assessment it is in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub assessment_id: String,
    pub question_id: String,
}

impl AssessmentQuestion {
    pub fn new(assessment_id: impl Into<String>, question_id: impl Into<String>) -> Self {
        Self {
            assessment_id: assessment_id.into(),
            question_id: question_id.into(),
        }
    }

    /// Ascending by assessment id, then question id.
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        compare_ids(&self.assessment_id, &other.assessment_id)
            .then_with(|| compare_ids(&self.question_id, &other.question_id))
    }
}

/// Questions sharing one text, sorted by position. Always two or more.
pub type PairGroup = Vec<AssessmentQuestion>;

impl Dataset {
    /// Cohort ids in ascending order, and the groups of comparable questions.
    ///
    /// Every question kind is grouped. Free-text groups carry no scores, so
    /// they yield empty columns.
    pub fn comparison_pairs(&self) -> (Vec<String>, Vec<PairGroup>) {
        let mut by_text: HashMap<&str, PairGroup> = HashMap::new();
        for question in self.questions() {
            by_text
                .entry(question.text.as_str())
                .or_default()
                .push(AssessmentQuestion::new(&question.assessment_id, &question.id));
        }

        let mut groups: Vec<PairGroup> = by_text
            .into_values()
            .filter(|group| group.len() >= 2)
            .map(|mut group| {
                group.sort_by(AssessmentQuestion::cmp_position);
                group
            })
            .collect();
        groups.sort_by(|a, b| a[0].cmp_position(&b[0]));

        let mut cohorts: Vec<String> = self.cohorts().map(|c| c.id.clone()).collect();
        cohorts.sort();

        tracing::debug!(
            experiment = self.experiment_id(),
            groups = groups.len(),
            "matched questions across assessments"
        );

        (cohorts, groups)
    }
}
