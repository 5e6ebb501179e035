//! Error types for the results engine.
//!
//! `StoreError` is what the persistence collaborator reports; `ResultError`
//! is what every engine operation returns. A store failure is wrapped with
//! the name of the read that failed so the whole computation aborts with a
//! useful message.

use thiserror::Error;

/// Errors reported by an [`ExperimentStore`](crate::traits::ExperimentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The backend failed to serve the read.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` if the record simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Errors produced while computing experiment results.
#[derive(Debug, Error)]
pub enum ResultError {
    /// A read against the persistence collaborator failed.
    #[error("failed to {operation}")]
    Store {
        operation: String,
        #[source]
        source: StoreError,
    },

    /// A participation carried a malformed answer or demographic payload.
    #[error("failed to parse payload of participation {participation}")]
    Parse {
        participation: String,
        #[source]
        source: serde_json::Error,
    },

    /// The question is not part of the loaded experiment.
    #[error("question not found: {0}")]
    QuestionNotFound(String),

    /// The assessment is not part of the loaded experiment.
    #[error("assessment not found: {0}")]
    UnknownAssessment(String),

    /// The cohort is not part of the loaded experiment.
    #[error("cohort not found: {0}")]
    UnknownCohort(String),

    /// Two columns of one comparison would share a header.
    #[error("`{0}` already exists")]
    DuplicateHeader(String),

    /// A comparison lacks a column the stats rows need.
    #[error("comparison has no `{0}` column")]
    MissingColumn(String),

    /// Loaded records violate a cross-entity invariant.
    #[error("inconsistent experiment data: {0}")]
    Integrity(String),

    /// A comparison CSV could not be read.
    #[error("invalid CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    /// A payload could not be serialized.
    #[error("failed to serialize payload")]
    Serialize(#[source] serde_json::Error),
}

impl ResultError {
    /// Wrap a store failure with the read that triggered it.
    pub fn store(operation: impl Into<String>, source: StoreError) -> Self {
        ResultError::Store {
            operation: operation.into(),
            source,
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, ResultError>;
