//! edugain-store: Dataset files and configuration.
//!
//! Reads TOML dataset files into an in-memory
//! [`ExperimentStore`](edugain_core::traits::ExperimentStore), validates
//! them, and loads the edugain configuration.

pub mod config;
pub mod dataset;
