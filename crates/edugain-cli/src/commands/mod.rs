pub mod breakdown;
pub mod export;
pub mod gains;
pub mod init;
pub mod stats;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use edugain_core::memory::MemoryStore;
use edugain_store::config::{load_config_from, EdugainConfig};
use edugain_store::dataset::load_dataset;

/// Load the config and the dataset it (or `--dataset`) points at.
pub(crate) fn open_dataset(
    dataset: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<(EdugainConfig, MemoryStore)> {
    let config = load_config_from(config_path)?;
    let path = dataset
        .or_else(|| config.dataset.clone())
        .context("no dataset given: pass --dataset or set `dataset` in edugain.toml")?;
    let store = load_dataset(&path)?;
    Ok((config, store))
}
