//! Loads one experiment into in-memory indices.
//!
//! A load is a single fan-out of reads against the store. Any failed read
//! aborts the load, and no partially filled dataset is ever returned.

use std::collections::HashMap;

use crate::error::{Result, ResultError};
use crate::model::{Assessment, Choice, Cohort, Participant, Participation, Question};
use crate::traits::ExperimentStore;

/// Everything the results engine needs about one experiment.
#[derive(Debug, Clone)]
pub struct Dataset {
    experiment_id: String,
    participants: HashMap<String, Participant>,
    cohorts: HashMap<String, Cohort>,
    cohort_order: Vec<String>,
    assessments: HashMap<String, Assessment>,
    assessment_order: Vec<String>,
    questions: HashMap<String, Question>,
    question_order: Vec<String>,
    choices: HashMap<String, Vec<Choice>>,
    participations: Vec<Participation>,
}

impl Dataset {
    /// Load an experiment's records from the store.
    pub fn load(store: &dyn ExperimentStore, experiment_id: &str) -> Result<Self> {
        let participants = store.find_participants(experiment_id).map_err(|e| {
            ResultError::store(format!("find participants of experiment {experiment_id}"), e)
        })?;
        let cohorts = store.find_cohorts(experiment_id).map_err(|e| {
            ResultError::store(format!("find cohorts of experiment {experiment_id}"), e)
        })?;
        let assessments = store.find_assessments(experiment_id).map_err(|e| {
            ResultError::store(format!("find assessments of experiment {experiment_id}"), e)
        })?;

        let mut questions = Vec::new();
        let mut choices: HashMap<String, Vec<Choice>> = HashMap::new();
        for assessment in &assessments {
            let assessment_questions = store.find_questions(&assessment.id).map_err(|e| {
                ResultError::store(format!("find questions of assessment {}", assessment.id), e)
            })?;
            let assessment_choices = store.find_question_choices(&assessment.id).map_err(|e| {
                ResultError::store(format!("find choices of assessment {}", assessment.id), e)
            })?;

            for question in &assessment_questions {
                choices.insert(
                    question.id.clone(),
                    assessment_choices
                        .iter()
                        .filter(|c| c.question_id == question.id)
                        .cloned()
                        .collect(),
                );
            }
            questions.extend(assessment_questions);
        }

        let participations = store.find_participations(experiment_id).map_err(|e| {
            ResultError::store(format!("find participations of experiment {experiment_id}"), e)
        })?;

        let dataset = Dataset {
            experiment_id: experiment_id.to_string(),
            cohort_order: cohorts.iter().map(|c| c.id.clone()).collect(),
            assessment_order: assessments.iter().map(|a| a.id.clone()).collect(),
            question_order: questions.iter().map(|q| q.id.clone()).collect(),
            participants: participants.into_iter().map(|p| (p.id.clone(), p)).collect(),
            cohorts: cohorts.into_iter().map(|c| (c.id.clone(), c)).collect(),
            assessments: assessments.into_iter().map(|a| (a.id.clone(), a)).collect(),
            questions: questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
            choices,
            participations,
        };
        dataset.check_integrity()?;

        tracing::debug!(
            experiment = experiment_id,
            participants = dataset.participants.len(),
            cohorts = dataset.cohorts.len(),
            assessments = dataset.assessments.len(),
            questions = dataset.questions.len(),
            participations = dataset.participations.len(),
            "loaded experiment"
        );

        Ok(dataset)
    }

    /// Every participation must point at an assessment and a participant of
    /// this experiment, and every participant at one of its cohorts.
    fn check_integrity(&self) -> Result<()> {
        for participant in self.participants.values() {
            if !self.cohorts.contains_key(&participant.cohort_id) {
                return Err(ResultError::Integrity(format!(
                    "participant {} belongs to unknown cohort {}",
                    participant.id, participant.cohort_id
                )));
            }
        }
        for p in &self.participations {
            if p.experiment_id != self.experiment_id {
                return Err(ResultError::Integrity(format!(
                    "participation {} belongs to experiment {}",
                    p.key(),
                    p.experiment_id
                )));
            }
            if !self.assessments.contains_key(&p.assessment_id) {
                return Err(ResultError::Integrity(format!(
                    "participation {} references unknown assessment {}",
                    p.key(),
                    p.assessment_id
                )));
            }
            if !self.participants.contains_key(&p.participant_id) {
                return Err(ResultError::Integrity(format!(
                    "participation {} references unknown participant {}",
                    p.key(),
                    p.participant_id
                )));
            }
        }
        Ok(())
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn cohort(&self, id: &str) -> Option<&Cohort> {
        self.cohorts.get(id)
    }

    /// Cohorts in store order.
    pub fn cohorts(&self) -> impl Iterator<Item = &Cohort> {
        self.cohort_order.iter().filter_map(|id| self.cohorts.get(id))
    }

    pub fn assessment(&self, id: &str) -> Option<&Assessment> {
        self.assessments.get(id)
    }

    /// Assessments in store order.
    pub fn assessments(&self) -> impl Iterator<Item = &Assessment> {
        self.assessment_order
            .iter()
            .filter_map(|id| self.assessments.get(id))
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.get(id)
    }

    /// Questions in assessment order, then presentation order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.question_order
            .iter()
            .filter_map(|id| self.questions.get(id))
    }

    /// Choices of a question, in store order.
    pub fn choices(&self, question_id: &str) -> &[Choice] {
        self.choices
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn participations(&self) -> &[Participation] {
        &self.participations
    }

    /// Number of participations at load time.
    pub fn participation_count(&self) -> usize {
        self.participations.len()
    }

    /// Whether there is enough data to compare cohorts at all.
    pub fn is_ready(&self) -> bool {
        self.cohorts.len() >= 2 && !self.assessments.is_empty() && !self.participations.is_empty()
    }
}
