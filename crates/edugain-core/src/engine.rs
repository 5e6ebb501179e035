//! The learning-gains pipeline.
//!
//! load -> match questions -> build comparisons -> align rows -> regress ->
//! evaluate, once per matched question group. The serialized chart list of
//! an experiment is served through the [`ResultCache`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::ResultCache;
use crate::comparison::{Comparison, StatsRow};
use crate::error::{Result, ResultError};
use crate::evaluator::evaluate_experiment;
use crate::loader::Dataset;
use crate::model::Experiment;
use crate::pairing::PairGroup;
use crate::statistics::{mean, GainStatistics};
use crate::traits::ExperimentStore;

/// Default maximum length of a chart label, in characters.
pub const DEFAULT_LABEL_MAX_CHARS: usize = 200;

/// Knobs of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainsOptions {
    /// Chart labels longer than this are truncated and suffixed with `...`.
    pub label_max_chars: usize,
    /// Serve payloads through the result cache.
    pub use_cache: bool,
}

impl Default for GainsOptions {
    fn default() -> Self {
        Self {
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
            use_cache: true,
        }
    }
}

/// Learning-gains summary of one matched question group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainChart {
    pub question: String,
    pub pre_control: f64,
    pub post_control: f64,
    pub pre_intervention: f64,
    pub post_intervention: f64,
    pub beta0: f64,
    pub beta1: f64,
    pub r_squared: f64,
    pub p_value: f64,
    /// Plain-language verdict for the sample size and p-value.
    pub message: String,
}

impl GainChart {
    fn new(question: String, rows: &[StatsRow]) -> Self {
        let column = |f: fn(&StatsRow) -> f64| mean(&rows.iter().map(f).collect::<Vec<_>>());
        let stats = GainStatistics::from_rows(rows);

        GainChart {
            question,
            pre_control: column(|r| r.pre_control),
            post_control: column(|r| r.post_control),
            pre_intervention: column(|r| r.pre_intervention),
            post_intervention: column(|r| r.post_intervention),
            beta0: stats.beta0,
            beta1: stats.beta1,
            r_squared: stats.r_squared,
            p_value: stats.p_value,
            message: evaluate_experiment(stats.observations, stats.p_value).to_string(),
        }
    }
}

/// Strip markup and control characters from a question text and cap its
/// length.
pub fn sanitize_label(text: &str, max_chars: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t' | '*' | '_'))
        .collect();

    if cleaned.chars().count() > max_chars {
        let mut truncated: String = cleaned.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    } else {
        cleaned
    }
}

/// Computes learning-gains charts of experiments.
pub struct GainsEngine {
    store: Arc<dyn ExperimentStore>,
    cache: Arc<ResultCache>,
    options: GainsOptions,
}

impl GainsEngine {
    pub fn new(store: Arc<dyn ExperimentStore>, cache: Arc<ResultCache>) -> Self {
        Self {
            store,
            cache,
            options: GainsOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GainsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> GainsOptions {
        self.options
    }

    pub fn store(&self) -> &dyn ExperimentStore {
        self.store.as_ref()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn experiment(&self, experiment_id: &str) -> Result<Experiment> {
        self.store
            .find_experiment(experiment_id)
            .map_err(|e| ResultError::store(format!("find experiment {experiment_id}"), e))
    }

    pub fn dataset(&self, experiment_id: &str) -> Result<Dataset> {
        Dataset::load(self.store.as_ref(), experiment_id)
    }

    /// Comparison of every matched question group, in group order.
    pub fn comparisons(dataset: &Dataset) -> Result<Vec<(PairGroup, Comparison)>> {
        let (cohorts, groups) = dataset.comparison_pairs();
        groups
            .into_iter()
            .map(|group| {
                let comparison = Comparison::new(dataset, &group, &cohorts)?;
                Ok((group, comparison))
            })
            .collect()
    }

    /// Charts of a loaded experiment.
    pub fn dataset_charts(&self, dataset: &Dataset) -> Result<Vec<GainChart>> {
        if !dataset.is_ready() {
            tracing::info!(
                experiment = dataset.experiment_id(),
                "experiment has no results yet"
            );
            return Ok(Vec::new());
        }

        let mut charts = Vec::new();
        for (group, comparison) in Self::comparisons(dataset)? {
            let rows = comparison.to_stats_data()?;
            let first = &group[0];
            let question = dataset
                .question(&first.question_id)
                .ok_or_else(|| ResultError::QuestionNotFound(first.question_id.clone()))?;
            if rows.is_empty() {
                if question.kind.has_choices() {
                    tracing::warn!(
                        experiment = dataset.experiment_id(),
                        question = %first.question_id,
                        "no complete score rows, skipping pair"
                    );
                } else {
                    tracing::debug!(question = %first.question_id, "free-text pair has no scores");
                }
                continue;
            }

            charts.push(GainChart::new(
                sanitize_label(&question.text, self.options.label_max_chars),
                &rows,
            ));
        }

        tracing::debug!(
            experiment = dataset.experiment_id(),
            charts = charts.len(),
            "computed gains"
        );
        Ok(charts)
    }

    /// Load an experiment and compute its charts.
    pub fn charts(&self, experiment_id: &str) -> Result<Vec<GainChart>> {
        let dataset = self.dataset(experiment_id)?;
        self.dataset_charts(&dataset)
    }

    /// The chart list as JSON, from the cache while the experiment's
    /// participation count is unchanged.
    pub fn payload(&self, experiment_id: &str) -> Result<Arc<[u8]>> {
        let compute = || -> Result<Vec<u8>> {
            let charts = self.charts(experiment_id)?;
            serde_json::to_vec(&charts).map_err(ResultError::Serialize)
        };

        if !self.options.use_cache {
            return Ok(compute()?.into());
        }

        let participations = self.store.count_participations(experiment_id).map_err(|e| {
            ResultError::store(format!("count participations of experiment {experiment_id}"), e)
        })?;
        self.cache
            .get_or_compute(experiment_id, participations, compute)
    }

    /// The chart list of an already loaded experiment as JSON, cached under
    /// that snapshot's participation count.
    ///
    /// Use this when other output is derived from the same `Dataset`, so
    /// both describe one snapshot.
    pub fn dataset_payload(&self, dataset: &Dataset) -> Result<Arc<[u8]>> {
        let compute = || -> Result<Vec<u8>> {
            let charts = self.dataset_charts(dataset)?;
            serde_json::to_vec(&charts).map_err(ResultError::Serialize)
        };

        if !self.options.use_cache {
            return Ok(compute()?.into());
        }
        self.cache.get_or_compute(
            dataset.experiment_id(),
            dataset.participation_count(),
            compute,
        )
    }
}
