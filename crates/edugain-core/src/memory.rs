//! In-memory experiment store.
//!
//! Keeps every record in insertion order, like the tables of the real
//! database. Used by dataset files, tests and benches. Reads can be made to
//! fail by operation name to exercise fail-fast paths.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::StoreError;
use crate::model::{
    Assessment, Choice, Cohort, Demographic, DemographicOption, Experiment, Participant,
    Participation, Question,
};
use crate::traits::{ExperimentStore, StoreResult};

#[derive(Debug, Default)]
struct Records {
    experiments: Vec<Experiment>,
    cohorts: Vec<Cohort>,
    assessments: Vec<Assessment>,
    questions: Vec<Question>,
    choices: Vec<Choice>,
    participants: Vec<Participant>,
    participations: Vec<Participation>,
    demographics: Vec<Demographic>,
    demographic_options: Vec<DemographicOption>,
}

/// A store holding all records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
    failing: RwLock<HashSet<String>>,
    reads: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of the named operation (e.g. `"find_cohorts"`) fail.
    pub fn fail_on(&self, operation: &str) {
        self.failing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation.to_string());
    }

    /// Number of reads served so far.
    pub fn read_count(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn insert_experiment(&self, experiment: Experiment) {
        self.write(|r| r.experiments.push(experiment));
    }

    pub fn insert_cohort(&self, cohort: Cohort) {
        self.write(|r| r.cohorts.push(cohort));
    }

    pub fn insert_assessment(&self, assessment: Assessment) {
        self.write(|r| r.assessments.push(assessment));
    }

    pub fn insert_question(&self, question: Question) {
        self.write(|r| r.questions.push(question));
    }

    pub fn insert_choice(&self, choice: Choice) {
        self.write(|r| r.choices.push(choice));
    }

    pub fn insert_participant(&self, participant: Participant) {
        self.write(|r| r.participants.push(participant));
    }

    /// Insert a participation, replacing the one recorded for the same
    /// (experiment, assessment, participant) triple.
    pub fn upsert_participation(&self, participation: Participation) {
        self.write(|r| {
            let existing = r.participations.iter_mut().find(|p| {
                p.experiment_id == participation.experiment_id
                    && p.assessment_id == participation.assessment_id
                    && p.participant_id == participation.participant_id
            });
            match existing {
                Some(slot) => *slot = participation,
                None => r.participations.push(participation),
            }
        });
    }

    pub fn insert_demographic(&self, demographic: Demographic) {
        self.write(|r| r.demographics.push(demographic));
    }

    pub fn insert_demographic_option(&self, option: DemographicOption) {
        self.write(|r| r.demographic_options.push(option));
    }

    fn write(&self, f: impl FnOnce(&mut Records)) {
        f(&mut self.records.write().unwrap_or_else(PoisonError::into_inner));
    }

    fn read<T>(&self, operation: &str, f: impl FnOnce(&Records) -> StoreResult<T>) -> StoreResult<T> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if self
            .failing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(operation)
        {
            return Err(StoreError::Backend(format!("{operation} unavailable")));
        }
        f(&self.records.read().unwrap_or_else(PoisonError::into_inner))
    }
}

fn filtered<T: Clone>(items: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|item| keep(item)).cloned().collect()
}

impl ExperimentStore for MemoryStore {
    fn find_experiment(&self, experiment_id: &str) -> StoreResult<Experiment> {
        self.read("find_experiment", |r| {
            r.experiments
                .iter()
                .find(|e| e.id == experiment_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    entity: "experiment",
                    id: experiment_id.to_string(),
                })
        })
    }

    fn find_participants(&self, experiment_id: &str) -> StoreResult<Vec<Participant>> {
        self.read("find_participants", |r| {
            Ok(filtered(&r.participants, |p| p.experiment_id == experiment_id))
        })
    }

    fn find_cohorts(&self, experiment_id: &str) -> StoreResult<Vec<Cohort>> {
        self.read("find_cohorts", |r| {
            Ok(filtered(&r.cohorts, |c| c.experiment_id == experiment_id))
        })
    }

    fn find_assessments(&self, experiment_id: &str) -> StoreResult<Vec<Assessment>> {
        self.read("find_assessments", |r| {
            Ok(filtered(&r.assessments, |a| a.experiment_id == experiment_id))
        })
    }

    fn find_questions(&self, assessment_id: &str) -> StoreResult<Vec<Question>> {
        self.read("find_questions", |r| {
            Ok(filtered(&r.questions, |q| q.assessment_id == assessment_id))
        })
    }

    fn find_question_choices(&self, assessment_id: &str) -> StoreResult<Vec<Choice>> {
        self.read("find_question_choices", |r| {
            let question_ids: HashSet<&str> = r
                .questions
                .iter()
                .filter(|q| q.assessment_id == assessment_id)
                .map(|q| q.id.as_str())
                .collect();
            Ok(filtered(&r.choices, |c| {
                question_ids.contains(c.question_id.as_str())
            }))
        })
    }

    fn find_participations(&self, experiment_id: &str) -> StoreResult<Vec<Participation>> {
        self.read("find_participations", |r| {
            Ok(filtered(&r.participations, |p| {
                p.experiment_id == experiment_id
            }))
        })
    }

    fn find_participations_by_participant(
        &self,
        experiment_id: &str,
        participant_id: &str,
    ) -> StoreResult<Vec<Participation>> {
        self.read("find_participations_by_participant", |r| {
            Ok(filtered(&r.participations, |p| {
                p.experiment_id == experiment_id && p.participant_id == participant_id
            }))
        })
    }

    fn find_participations_by_assessment(
        &self,
        experiment_id: &str,
        assessment_id: &str,
    ) -> StoreResult<Vec<Participation>> {
        self.read("find_participations_by_assessment", |r| {
            Ok(filtered(&r.participations, |p| {
                p.experiment_id == experiment_id && p.assessment_id == assessment_id
            }))
        })
    }

    fn find_demographics(&self, experiment_id: &str) -> StoreResult<Vec<Demographic>> {
        self.read("find_demographics", |r| {
            Ok(filtered(&r.demographics, |d| d.experiment_id == experiment_id))
        })
    }

    fn find_demographic_options(
        &self,
        demographic_id: &str,
    ) -> StoreResult<Vec<DemographicOption>> {
        self.read("find_demographic_options", |r| {
            Ok(filtered(&r.demographic_options, |o| {
                o.demographic_id == demographic_id
            }))
        })
    }

    fn count_participations(&self, experiment_id: &str) -> StoreResult<usize> {
        self.read("count_participations", |r| {
            Ok(r.participations
                .iter()
                .filter(|p| p.experiment_id == experiment_id)
                .count())
        })
    }
}
