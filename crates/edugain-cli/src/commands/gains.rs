//! The `edugain gains` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use edugain_core::cache::ResultCache;
use edugain_core::engine::{GainChart, GainsEngine};
use edugain_core::report::GainsReport;
use edugain_report::markdown::generate_markdown;

pub async fn execute(
    experiments: Vec<String>,
    dataset: Option<PathBuf>,
    config_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "table" | "json" | "markdown"),
        "unknown format: '{format}' (expected table, json or markdown)"
    );

    let (config, store) = super::open_dataset(dataset, config_path.as_deref())?;
    let cache = Arc::new(ResultCache::new());
    let engine = Arc::new(
        GainsEngine::new(Arc::new(store), Arc::clone(&cache)).with_options(config.gains_options()),
    );

    // Experiments are independent; each one is computed on the blocking pool.
    let tasks = experiments.iter().map(|id| {
        let engine = Arc::clone(&engine);
        let id = id.clone();
        tokio::task::spawn_blocking(move || build_report(&engine, &id))
    });
    let joined = futures::future::join_all(tasks).await;

    let mut reports = Vec::with_capacity(joined.len());
    for (id, result) in experiments.iter().zip(joined) {
        let report = result.with_context(|| format!("gains task for experiment {id} failed"))??;
        reports.push(report);
    }
    tracing::debug!(hits = cache.hits(), misses = cache.misses(), "result cache");

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&reports)?),
        "markdown" => {
            for report in &reports {
                println!("{}", generate_markdown(report));
            }
        }
        _ => {
            for report in &reports {
                print_table(report);
            }
        }
    }

    if let Some(dir) = output {
        std::fs::create_dir_all(&dir)?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        for report in &reports {
            let path = dir.join(format!(
                "gains-{}-{timestamp}.json",
                report.experiment.id
            ));
            report.save_json(&path)?;
            eprintln!("Report saved to: {}", path.display());
        }
    }

    Ok(())
}

fn build_report(engine: &GainsEngine, experiment_id: &str) -> Result<GainsReport> {
    let experiment = engine.experiment(experiment_id)?;
    // Summary and charts come from one load.
    let dataset = engine.dataset(experiment_id)?;
    let payload = engine.dataset_payload(&dataset)?;
    let charts: Vec<GainChart> =
        serde_json::from_slice(&payload).context("failed to decode cached charts")?;
    Ok(GainsReport::new(&experiment, &dataset, charts))
}

fn print_table(report: &GainsReport) {
    use comfy_table::{Cell, Table};

    println!(
        "{} ({} participations, cohorts: {})",
        report.experiment.name,
        report.experiment.participations,
        report.experiment.cohorts.join(", ")
    );

    if report.charts.is_empty() {
        println!("No matched question pairs with results yet.\n");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Question",
        "Pre ctrl",
        "Post ctrl",
        "Pre int",
        "Post int",
        "Effect",
        "R²",
        "p",
    ]);

    for chart in &report.charts {
        table.add_row(vec![
            Cell::new(&chart.question),
            Cell::new(format!("{:.2}", chart.pre_control)),
            Cell::new(format!("{:.2}", chart.post_control)),
            Cell::new(format!("{:.2}", chart.pre_intervention)),
            Cell::new(format!("{:.2}", chart.post_intervention)),
            Cell::new(format!("{:+.3}", chart.beta1)),
            Cell::new(format!("{:.3}", chart.r_squared)),
            Cell::new(format!("{:.4}", chart.p_value)),
        ]);
    }

    println!("{table}");
    for chart in &report.charts {
        println!("  {}: {}", chart.question, chart.message);
    }
    println!();
}
