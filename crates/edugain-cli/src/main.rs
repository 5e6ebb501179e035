//! edugain CLI: learning-gains results for pre/post classroom experiments.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "edugain",
    version,
    about = "Learning-gains statistics for pre/post classroom experiments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute learning-gains charts for one or more experiments
    Gains {
        /// Experiment ID (repeat for several experiments)
        #[arg(long, required = true)]
        experiment: Vec<String>,

        /// Dataset TOML file (defaults to `dataset` from the config)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: table, json, markdown
        #[arg(long, default_value = "table")]
        format: String,

        /// Also save each report as JSON into this directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export the comparison CSV of every matched question pair
    Export {
        /// Experiment ID
        #[arg(long)]
        experiment: String,

        /// Dataset TOML file (defaults to `dataset` from the config)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (defaults to `output_dir` from the config)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run the regression on a four-column stats CSV
    Stats {
        /// CSV with pre control, pre intervention, post control, post intervention columns
        #[arg(long)]
        file: PathBuf,

        /// Significance level for the verdict line
        #[arg(long, default_value = "0.2")]
        alpha: f64,
    },

    /// Raw answer counts per cohort
    Breakdown {
        /// Experiment ID
        #[arg(long)]
        experiment: String,

        /// What to count: choices, demographics
        #[arg(long, default_value = "choices")]
        kind: String,

        /// Dataset TOML file (defaults to `dataset` from the config)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a dataset file
    Validate {
        /// Path to the dataset TOML file
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Create starter config and example dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("edugain=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Gains {
            experiment,
            dataset,
            config,
            format,
            output,
        } => commands::gains::execute(experiment, dataset, config, format, output).await,
        Commands::Export {
            experiment,
            dataset,
            config,
            output,
        } => commands::export::execute(experiment, dataset, config, output),
        Commands::Stats { file, alpha } => commands::stats::execute(file, alpha),
        Commands::Breakdown {
            experiment,
            kind,
            dataset,
            config,
        } => commands::breakdown::execute(experiment, kind, dataset, config),
        Commands::Validate { dataset } => commands::validate::execute(dataset),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
