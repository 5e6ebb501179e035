//! edugain-core: Results engine for pre/post classroom experiments.
//!
//! Loads an experiment from an [`ExperimentStore`](traits::ExperimentStore),
//! scores answers per cohort, matches identical questions across
//! assessments, and tests whether the intervention cohort gained more than
//! the control cohort.

pub mod cache;
pub mod comparison;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod memory;
pub mod model;
pub mod pairing;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod tally;
pub mod traits;

#[cfg(test)]
mod testing;
