//! The `edugain breakdown` command.

use std::path::PathBuf;

use anyhow::Result;

use edugain_core::loader::Dataset;

pub fn execute(
    experiment: String,
    kind: String,
    dataset: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, store) = super::open_dataset(dataset, config_path.as_deref())?;
    let dataset = Dataset::load(&store, &experiment)?;

    let json = match kind.as_str() {
        "choices" => serde_json::to_string_pretty(&dataset.choice_tally()?)?,
        "demographics" => serde_json::to_string_pretty(&dataset.demographics_breakdown(&store)?)?,
        other => anyhow::bail!("unknown breakdown kind: '{other}' (expected choices or demographics)"),
    };
    println!("{json}");

    Ok(())
}
