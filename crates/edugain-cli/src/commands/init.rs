//! The `edugain init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create edugain.toml
    if Path::new("edugain.toml").exists() {
        println!("edugain.toml already exists, skipping.");
    } else {
        std::fs::write("edugain.toml", SAMPLE_CONFIG)?;
        println!("Created edugain.toml");
    }

    // Create example dataset
    std::fs::create_dir_all("datasets")?;
    let example_path = Path::new("datasets/example.toml");
    if example_path.exists() {
        println!("datasets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DATASET)?;
        println!("Created datasets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Replace datasets/example.toml with your own experiment records");
    println!("  2. Run: edugain validate --dataset datasets/example.toml");
    println!("  3. Run: edugain gains --experiment 1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# edugain configuration

# Dataset read when no --dataset is given. ${VAR} references are expanded.
dataset = "datasets/example.toml"

label_max_chars = 200
output_dir = "./edugain-results"
cache_enabled = true
"#;

const EXAMPLE_DATASET: &str = r#"# A minimal experiment: one question asked before and after a lesson.

[[experiments]]
id = "1"
name = "Example experiment"
description = "Does the new lesson plan improve results?"

[[cohorts]]
id = "1"
experiment_id = "1"
name = "Control"

[[cohorts]]
id = "2"
experiment_id = "1"
name = "Intervention"

[[assessments]]
id = "1"
experiment_id = "1"
kind = "pre"

[[assessments]]
id = "2"
experiment_id = "1"
kind = "post"

[[questions]]
id = "1"
assessment_id = "1"
text = "What is 3 x 4?"
kind = "single"

[[questions]]
id = "2"
assessment_id = "2"
text = "What is 3 x 4?"
kind = "single"

[[choices]]
id = "1"
question_id = "1"
text = "12"
is_correct = true

[[choices]]
id = "2"
question_id = "1"
text = "7"

[[choices]]
id = "3"
question_id = "2"
text = "12"
is_correct = true

[[choices]]
id = "4"
question_id = "2"
text = "7"

[[participants]]
id = "1"
experiment_id = "1"
cohort_id = "1"

[[participants]]
id = "2"
experiment_id = "1"
cohort_id = "1"

[[participants]]
id = "3"
experiment_id = "1"
cohort_id = "2"

[[participants]]
id = "4"
experiment_id = "1"
cohort_id = "2"

[[participations]]
experiment_id = "1"
assessment_id = "1"
participant_id = "1"
answers = '{"1":["2"]}'

[[participations]]
experiment_id = "1"
assessment_id = "2"
participant_id = "1"
answers = '{"2":["3"]}'

[[participations]]
experiment_id = "1"
assessment_id = "1"
participant_id = "2"
answers = '{"1":["1"]}'

[[participations]]
experiment_id = "1"
assessment_id = "2"
participant_id = "2"
answers = '{"2":["3"]}'

[[participations]]
experiment_id = "1"
assessment_id = "1"
participant_id = "3"
answers = '{"1":["2"]}'

[[participations]]
experiment_id = "1"
assessment_id = "2"
participant_id = "3"
answers = '{"2":["3"]}'

[[participations]]
experiment_id = "1"
assessment_id = "1"
participant_id = "4"
answers = '{"1":["2"]}'

[[participations]]
experiment_id = "1"
assessment_id = "2"
participant_id = "4"
answers = '{"2":["3"]}'
"#;
