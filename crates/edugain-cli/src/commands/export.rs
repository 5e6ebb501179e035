//! The `edugain export` command.

use std::path::PathBuf;

use anyhow::Result;

use edugain_core::loader::Dataset;
use edugain_report::csv::write_comparisons;

pub fn execute(
    experiment: String,
    dataset: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = super::open_dataset(dataset, config_path.as_deref())?;
    let dataset = Dataset::load(&store, &experiment)?;
    let dir = output.unwrap_or(config.output_dir);

    let paths = write_comparisons(&dataset, &dir)?;
    if paths.is_empty() {
        println!("No matched question pairs in experiment {experiment}.");
        return Ok(());
    }
    for path in &paths {
        println!("Wrote {}", path.display());
    }
    println!("\n{} comparison(s) exported.", paths.len());

    Ok(())
}
