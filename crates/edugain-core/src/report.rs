//! Gains report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::GainChart;
use crate::evaluator::Significance;
use crate::loader::Dataset;
use crate::model::Experiment;

/// Learning-gains results of one experiment at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GainsReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub experiment: ExperimentSummary,
    /// One chart per matched question group.
    pub charts: Vec<GainChart>,
}

/// Summary of an experiment (without its records).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub id: String,
    pub name: String,
    /// Cohort names, in store order.
    pub cohorts: Vec<String>,
    pub participations: usize,
}

impl GainsReport {
    pub fn new(experiment: &Experiment, dataset: &Dataset, charts: Vec<GainChart>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            experiment: ExperimentSummary {
                id: experiment.id.clone(),
                name: experiment.name.clone(),
                cohorts: dataset.cohorts().map(|c| c.name.clone()).collect(),
                participations: dataset.participation_count(),
            },
            charts,
        }
    }

    /// Charts whose intervention effect is significant at the 5% level.
    pub fn significant(&self) -> impl Iterator<Item = &GainChart> {
        self.charts
            .iter()
            .filter(|c| Significance::of(c.p_value) == Significance::Significant)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse report JSON")
    }
}
