//! The `edugain stats` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use edugain_core::comparison::parse_stats_csv;
use edugain_core::evaluator::evaluate_experiment;
use edugain_core::statistics::GainStatistics;

pub fn execute(file: PathBuf, alpha: f64) -> Result<()> {
    anyhow::ensure!(
        alpha > 0.0 && alpha < 1.0,
        "alpha must be between 0 and 1"
    );

    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read stats file: {}", file.display()))?;
    let rows = parse_stats_csv(&content)
        .with_context(|| format!("failed to parse stats file: {}", file.display()))?;
    anyhow::ensure!(!rows.is_empty(), "no data rows in {}", file.display());

    let stats = GainStatistics::from_rows(&rows);

    println!("Rows: {}", rows.len());
    println!("Intercept (beta0): {:.4}", stats.beta0);
    println!("Effect (beta1): {:+.4}", stats.beta1);
    println!("R²: {:.4}", stats.r_squared);
    println!("p-value: {:.4}", stats.p_value);
    if stats.p_value < alpha {
        println!("The intervention effect is significant at alpha = {alpha}.");
    } else {
        println!("The intervention effect is not significant at alpha = {alpha}.");
    }
    println!("{}", evaluate_experiment(stats.observations, stats.p_value));

    Ok(())
}
