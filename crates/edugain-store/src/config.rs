//! edugain configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use edugain_core::engine::{GainsOptions, DEFAULT_LABEL_MAX_CHARS};

/// Top-level edugain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdugainConfig {
    /// Dataset file read when no `--dataset` is given.
    #[serde(default)]
    pub dataset: Option<PathBuf>,
    /// Maximum length of chart labels, in characters.
    #[serde(default = "default_label_max_chars")]
    pub label_max_chars: usize,
    /// Output directory for reports and exports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Reuse computed payloads while participation counts are unchanged.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

fn default_label_max_chars() -> usize {
    DEFAULT_LABEL_MAX_CHARS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./edugain-results")
}
fn default_true() -> bool {
    true
}

impl Default for EdugainConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            label_max_chars: default_label_max_chars(),
            output_dir: default_output_dir(),
            cache_enabled: true,
        }
    }
}

impl EdugainConfig {
    pub fn gains_options(&self) -> GainsOptions {
        GainsOptions {
            label_max_chars: self.label_max_chars,
            use_cache: self.cache_enabled,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `edugain.toml` in the current directory
/// 2. `~/.config/edugain/config.toml`
///
/// Environment variable override: `EDUGAIN_DATASET`.
pub fn load_config_from(path: Option<&Path>) -> Result<EdugainConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("edugain.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => EdugainConfig::default(),
    };

    if let Ok(dataset) = std::env::var("EDUGAIN_DATASET") {
        config.dataset = Some(PathBuf::from(dataset));
    }

    Ok(config)
}

/// Parse a config file's content and resolve `${VAR}` references.
pub fn parse_config_str(content: &str) -> Result<EdugainConfig> {
    let mut config: EdugainConfig = toml::from_str(content)?;
    config.dataset = config.dataset.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("edugain"))
}
