//! The persistence collaborator the engine reads from.
//!
//! Implemented by [`MemoryStore`](crate::memory::MemoryStore) and by any
//! database-backed store. The engine only ever reads; every call returns
//! records in insertion order.

use crate::error::StoreError;
use crate::model::{
    Assessment, Choice, Cohort, Demographic, DemographicOption, Experiment, Participant,
    Participation, Question,
};

/// Result of a store read.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read-only access to the records of experiments.
pub trait ExperimentStore: Send + Sync {
    /// Look up one experiment.
    fn find_experiment(&self, experiment_id: &str) -> StoreResult<Experiment>;

    /// Participants enrolled in an experiment.
    fn find_participants(&self, experiment_id: &str) -> StoreResult<Vec<Participant>>;

    /// Cohorts of an experiment.
    fn find_cohorts(&self, experiment_id: &str) -> StoreResult<Vec<Cohort>>;

    /// Assessments of an experiment.
    fn find_assessments(&self, experiment_id: &str) -> StoreResult<Vec<Assessment>>;

    /// Questions of an assessment, in presentation order.
    fn find_questions(&self, assessment_id: &str) -> StoreResult<Vec<Question>>;

    /// Choices of every question of an assessment.
    fn find_question_choices(&self, assessment_id: &str) -> StoreResult<Vec<Choice>>;

    /// Every participation recorded for an experiment.
    fn find_participations(&self, experiment_id: &str) -> StoreResult<Vec<Participation>>;

    /// Participations of one participant.
    fn find_participations_by_participant(
        &self,
        experiment_id: &str,
        participant_id: &str,
    ) -> StoreResult<Vec<Participation>>;

    /// Participations of one assessment.
    fn find_participations_by_assessment(
        &self,
        experiment_id: &str,
        assessment_id: &str,
    ) -> StoreResult<Vec<Participation>>;

    /// Demographic questions of an experiment.
    fn find_demographics(&self, experiment_id: &str) -> StoreResult<Vec<Demographic>>;

    /// Options of one demographic question.
    fn find_demographic_options(&self, demographic_id: &str)
        -> StoreResult<Vec<DemographicOption>>;

    /// Number of participations recorded for an experiment.
    ///
    /// Used as the result cache fingerprint. Backends with a cheap count
    /// should override this.
    fn count_participations(&self, experiment_id: &str) -> StoreResult<usize> {
        Ok(self.find_participations(experiment_id)?.len())
    }
}
