//! TOML dataset files.
//!
//! A dataset file holds the records of one or more experiments as arrays of
//! tables, one array per entity. Answer and demographic payloads are kept as
//! the JSON strings the persistence layer stores.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use edugain_core::memory::MemoryStore;
use edugain_core::model::{
    AnswerSet, Assessment, Choice, Cohort, Demographic, DemographicAnswers, DemographicOption,
    Experiment, InputKind, Participant, Participation, Question,
};

/// The records of a dataset file, in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(default)]
    pub experiments: Vec<Experiment>,
    #[serde(default)]
    pub cohorts: Vec<Cohort>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub participations: Vec<Participation>,
    #[serde(default)]
    pub demographics: Vec<Demographic>,
    #[serde(default)]
    pub demographic_options: Vec<DemographicOption>,
}

impl DatasetFile {
    /// Insert every record into a fresh in-memory store.
    pub fn into_store(self) -> MemoryStore {
        let store = MemoryStore::new();
        self.experiments
            .into_iter()
            .for_each(|e| store.insert_experiment(e));
        self.cohorts.into_iter().for_each(|c| store.insert_cohort(c));
        self.assessments
            .into_iter()
            .for_each(|a| store.insert_assessment(a));
        self.questions
            .into_iter()
            .for_each(|q| store.insert_question(q));
        self.choices.into_iter().for_each(|c| store.insert_choice(c));
        self.participants
            .into_iter()
            .for_each(|p| store.insert_participant(p));
        self.participations
            .into_iter()
            .for_each(|p| store.upsert_participation(p));
        self.demographics
            .into_iter()
            .for_each(|d| store.insert_demographic(d));
        self.demographic_options
            .into_iter()
            .for_each(|o| store.insert_demographic_option(o));
        store
    }
}

/// Parse a dataset file.
pub fn parse_dataset(path: &Path) -> Result<DatasetFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file: {}", path.display()))?;

    parse_dataset_str(&content, path)
}

/// Parse a TOML string into a dataset (useful for testing).
pub fn parse_dataset_str(content: &str, source_path: &Path) -> Result<DatasetFile> {
    let dataset: DatasetFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    tracing::debug!(
        path = %source_path.display(),
        experiments = dataset.experiments.len(),
        participations = dataset.participations.len(),
        "parsed dataset"
    );
    Ok(dataset)
}

/// Parse a dataset file and load it into an in-memory store.
pub fn load_dataset(path: &Path) -> Result<MemoryStore> {
    Ok(parse_dataset(path)?.into_store())
}

/// A warning from dataset validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The record concerned, as `<entity> <id>`.
    pub record: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(entity: &str, id: &str, message: impl Into<String>) -> Self {
        Self {
            record: Some(format!("{entity} {id}")),
            message: message.into(),
        }
    }
}

fn duplicates<'a>(
    entity: &str,
    ids: impl Iterator<Item = &'a str>,
    warnings: &mut Vec<ValidationWarning>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            warnings.push(ValidationWarning::new(
                entity,
                id,
                format!("duplicate {entity} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validate a dataset for common issues.
pub fn validate_dataset(dataset: &DatasetFile) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate ids
    let experiments = duplicates(
        "experiment",
        dataset.experiments.iter().map(|e| e.id.as_str()),
        &mut warnings,
    );
    let cohorts = duplicates(
        "cohort",
        dataset.cohorts.iter().map(|c| c.id.as_str()),
        &mut warnings,
    );
    let assessments = duplicates(
        "assessment",
        dataset.assessments.iter().map(|a| a.id.as_str()),
        &mut warnings,
    );
    let questions = duplicates(
        "question",
        dataset.questions.iter().map(|q| q.id.as_str()),
        &mut warnings,
    );
    duplicates(
        "choice",
        dataset.choices.iter().map(|c| c.id.as_str()),
        &mut warnings,
    );
    let participants = duplicates(
        "participant",
        dataset.participants.iter().map(|p| p.id.as_str()),
        &mut warnings,
    );
    let demographics = duplicates(
        "demographic",
        dataset.demographics.iter().map(|d| d.id.as_str()),
        &mut warnings,
    );

    // Dangling references
    let mut dangling = |entity: &str,
                        id: &str,
                        target: &str,
                        target_id: &str,
                        known: &HashSet<&str>| {
        if !known.contains(target_id) {
            warnings.push(ValidationWarning::new(
                entity,
                id,
                format!("references unknown {target} {target_id}"),
            ));
        }
    };
    for c in &dataset.cohorts {
        dangling("cohort", &c.id, "experiment", &c.experiment_id, &experiments);
    }
    for a in &dataset.assessments {
        dangling("assessment", &a.id, "experiment", &a.experiment_id, &experiments);
    }
    for q in &dataset.questions {
        dangling("question", &q.id, "assessment", &q.assessment_id, &assessments);
    }
    for c in &dataset.choices {
        dangling("choice", &c.id, "question", &c.question_id, &questions);
    }
    for p in &dataset.participants {
        dangling("participant", &p.id, "experiment", &p.experiment_id, &experiments);
        dangling("participant", &p.id, "cohort", &p.cohort_id, &cohorts);
    }
    for d in &dataset.demographics {
        dangling("demographic", &d.id, "experiment", &d.experiment_id, &experiments);
    }
    for o in &dataset.demographic_options {
        dangling("demographic option", &o.id, "demographic", &o.demographic_id, &demographics);
    }
    for p in &dataset.participations {
        let key = p.key();
        dangling("participation", &key, "experiment", &p.experiment_id, &experiments);
        dangling("participation", &key, "assessment", &p.assessment_id, &assessments);
        dangling("participation", &key, "participant", &p.participant_id, &participants);
    }

    // Participation payloads
    let question_assessment: HashMap<&str, &str> = dataset
        .questions
        .iter()
        .map(|q| (q.id.as_str(), q.assessment_id.as_str()))
        .collect();
    for p in &dataset.participations {
        if let Some(raw) = p.answers.as_deref() {
            match AnswerSet::parse(raw) {
                Ok(answers) => {
                    for (question_id, _) in answers.iter() {
                        match question_assessment.get(question_id.as_str()) {
                            Some(assessment) if *assessment == p.assessment_id => {}
                            Some(assessment) => warnings.push(ValidationWarning::new(
                                "participation",
                                &p.key(),
                                format!(
                                    "answers question {question_id} of assessment {assessment}"
                                ),
                            )),
                            None => warnings.push(ValidationWarning::new(
                                "participation",
                                &p.key(),
                                format!("answers unknown question {question_id}"),
                            )),
                        }
                    }
                }
                Err(e) => warnings.push(ValidationWarning::new(
                    "participation",
                    &p.key(),
                    format!("malformed answers: {e}"),
                )),
            }
        }
        if let Some(raw) = p.demographics.as_deref() {
            if let Err(e) = DemographicAnswers::parse(raw) {
                warnings.push(ValidationWarning::new(
                    "participation",
                    &p.key(),
                    format!("malformed demographics: {e}"),
                ));
            }
        }
    }

    // Answer keys
    for q in dataset.questions.iter().filter(|q| q.kind.has_choices()) {
        let correct = dataset
            .choices
            .iter()
            .filter(|c| c.question_id == q.id && c.is_correct)
            .count();
        if correct == 0 {
            warnings.push(ValidationWarning::new(
                "question",
                &q.id,
                "no correct choice, every answer will score 0",
            ));
        } else if correct > 1 && q.kind == InputKind::SingleChoice {
            warnings.push(ValidationWarning::new(
                "question",
                &q.id,
                format!("single-choice question has {correct} correct choices"),
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use edugain_core::loader::Dataset;
    use edugain_core::traits::ExperimentStore;

    const VALID_TOML: &str = r#"
[[experiments]]
id = "1"
name = "Fractions workshop"
created_at = "2024-03-01T09:00:00Z"

[[cohorts]]
id = "1"
experiment_id = "1"
name = "Control"

[[cohorts]]
id = "2"
experiment_id = "1"
name = "Intervention"

[[assessments]]
id = "1"
experiment_id = "1"
kind = "pre"

[[assessments]]
id = "2"
experiment_id = "1"
kind = "post"

[[questions]]
id = "1"
assessment_id = "1"
text = "What is 1/2 + 1/4?"
kind = "single"

[[questions]]
id = "2"
assessment_id = "2"
text = "What is 1/2 + 1/4?"
kind = "single-choice"

[[choices]]
id = "1"
question_id = "1"
text = "3/4"
is_correct = true

[[choices]]
id = "2"
question_id = "1"
text = "2/6"

[[choices]]
id = "3"
question_id = "2"
text = "3/4"
is_correct = true

[[choices]]
id = "4"
question_id = "2"
text = "2/6"

[[participants]]
id = "1"
experiment_id = "1"
cohort_id = "1"

[[participants]]
id = "2"
experiment_id = "1"
cohort_id = "2"

[[participations]]
experiment_id = "1"
assessment_id = "1"
participant_id = "1"
answers = '{"1":["2"]}'

[[participations]]
experiment_id = "1"
assessment_id = "2"
participant_id = "1"
answers = '{"2":["3"]}'

[[participations]]
experiment_id = "1"
assessment_id = "1"
participant_id = "2"
answers = '{"1":["1"]}'
demographics = '{"1":"1"}'
"#;

    fn parse(content: &str) -> DatasetFile {
        parse_dataset_str(content, &PathBuf::from("test.toml")).unwrap()
    }

    #[test]
    fn parse_valid_dataset() {
        let dataset = parse(VALID_TOML);
        assert_eq!(dataset.experiments.len(), 1);
        assert!(dataset.experiments[0].created_at.is_some());
        assert_eq!(dataset.cohorts.len(), 2);
        assert_eq!(dataset.questions.len(), 2);
        assert_eq!(dataset.participations.len(), 3);
        assert!(!dataset.choices[1].is_correct);
        assert!(validate_dataset(&dataset).is_empty());
    }

    #[test]
    fn store_serves_loaded_records() {
        let store = parse(VALID_TOML).into_store();
        assert_eq!(store.find_experiment("1").unwrap().name, "Fractions workshop");
        assert_eq!(store.count_participations("1").unwrap(), 3);

        let dataset = Dataset::load(&store, "1").unwrap();
        assert!(dataset.is_ready());
        assert_eq!(dataset.question_score("2").unwrap()["1"], vec![1.0]);
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let bad = r#"
[[questions]]
id = "1"
assessment_id = "1"
text = "Q"
kind = "essay"
"#;
        let result = parse_dataset_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_dataset_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn empty_file_is_an_empty_dataset() {
        let dataset = parse("");
        assert!(dataset.experiments.is_empty());
        assert!(validate_dataset(&dataset).is_empty());
    }

    #[test]
    fn validate_duplicate_ids() {
        let mut dataset = parse(VALID_TOML);
        let copy = dataset.cohorts[0].clone();
        dataset.cohorts.push(copy);
        let warnings = validate_dataset(&dataset);
        assert!(warnings
            .iter()
            .any(|w| w.message == "duplicate cohort ID: 1"));
    }

    #[test]
    fn validate_dangling_references() {
        let mut dataset = parse(VALID_TOML);
        dataset.participants[1].cohort_id = "9".into();
        let warnings = validate_dataset(&dataset);
        let warning = warnings
            .iter()
            .find(|w| w.message.contains("unknown cohort 9"))
            .unwrap();
        assert_eq!(warning.record.as_deref(), Some("participant 2"));
    }

    #[test]
    fn validate_payloads() {
        let mut dataset = parse(VALID_TOML);
        dataset.participations[0].answers = Some(r#"{"1":"2"}"#.into());
        dataset.participations[1].answers = Some(r#"{"1":["1"]}"#.into());
        dataset.participations[2].demographics = Some(r#"{"1":7}"#.into());

        let messages: Vec<String> = validate_dataset(&dataset)
            .into_iter()
            .map(|w| w.message)
            .collect();
        assert!(messages.iter().any(|m| m.starts_with("malformed answers")));
        assert!(messages
            .iter()
            .any(|m| m == "answers question 1 of assessment 1"));
        assert!(messages.iter().any(|m| m.starts_with("malformed demographics")));
    }

    #[test]
    fn validate_answer_keys() {
        let mut dataset = parse(VALID_TOML);
        dataset.choices[0].is_correct = false;
        dataset.choices[3].is_correct = true;

        let warnings = validate_dataset(&dataset);
        assert!(warnings.iter().any(|w| {
            w.record.as_deref() == Some("question 1") && w.message.contains("no correct choice")
        }));
        assert!(warnings.iter().any(|w| {
            w.record.as_deref() == Some("question 2") && w.message.contains("2 correct choices")
        }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.toml");
        std::fs::write(&path, VALID_TOML).unwrap();

        let store = load_dataset(&path).unwrap();
        assert_eq!(store.find_cohorts("1").unwrap().len(), 2);
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_dataset(Path::new("/nonexistent/data.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/data.toml"));
    }
}
