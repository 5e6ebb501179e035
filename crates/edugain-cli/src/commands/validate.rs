//! The `edugain validate` command.

use std::path::PathBuf;

use anyhow::Result;

use edugain_core::loader::Dataset;
use edugain_store::dataset::{parse_dataset, validate_dataset};

pub fn execute(dataset_path: PathBuf) -> Result<()> {
    let file = parse_dataset(&dataset_path)?;
    println!(
        "Dataset: {} ({} experiments, {} participants, {} participations)",
        dataset_path.display(),
        file.experiments.len(),
        file.participants.len(),
        file.participations.len()
    );

    let warnings = validate_dataset(&file);
    for w in &warnings {
        let prefix = w
            .record
            .as_ref()
            .map(|record| format!("  [{record}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
    let mut total_warnings = warnings.len();

    // Records can be individually well formed and still fail to load together.
    let experiment_ids: Vec<String> = file.experiments.iter().map(|e| e.id.clone()).collect();
    let store = file.into_store();
    for id in &experiment_ids {
        if let Err(e) = Dataset::load(&store, id) {
            println!("  [experiment {id}] WARNING: does not load: {e}");
            total_warnings += 1;
        }
    }

    if total_warnings == 0 {
        println!("Dataset valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
