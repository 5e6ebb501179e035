//! Comparison CSV export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use edugain_core::engine::GainsEngine;
use edugain_core::loader::Dataset;

/// Write one `pair-<n>.csv` per matched question group into `dir`,
/// numbered from 1 in group order. Returns the written paths.
pub fn write_comparisons(dataset: &Dataset, dir: &Path) -> Result<Vec<PathBuf>> {
    let comparisons = GainsEngine::comparisons(dataset)
        .with_context(|| format!("failed to compare experiment {}", dataset.experiment_id()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(comparisons.len());
    for (n, (group, comparison)) in comparisons.iter().enumerate() {
        let path = dir.join(format!("pair-{}.csv", n + 1));
        std::fs::write(&path, comparison.to_csv())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            questions = group.len(),
            rows = comparison.rows(),
            "wrote comparison"
        );
        written.push(path);
    }

    Ok(written)
}
