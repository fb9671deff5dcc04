//! `csi-pose` - train, run and inspect the CSI pose classifier.
//!
//! # Commands
//!
//! - `csi-pose train --train train.csv --valid valid.csv` - Train and keep
//!   the best checkpoint
//! - `csi-pose predict --input rows.csv` - Predict presence and pose for
//!   every row
//! - `csi-pose predict --input rows.csv --report` - Pose report for the
//!   first row
//! - `csi-pose summary --data train.csv` - Class and presence statistics
//!
//! Results are printed to stdout; logs go to stderr. On failure a JSON
//! error body with a status code is printed and the process exits
//! non-zero.

mod failure;
mod predict;
mod summary;
mod train;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pose_training::TrainingConfig;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

/// CSI pose classification
#[derive(Parser, Debug)]
#[command(name = "csi-pose")]
#[command(about = "Wi-Fi CSI presence and pose classifier", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a classifier, saving a checkpoint whenever validation improves
    Train(train::TrainArgs),

    /// Predict presence and pose for every row of a feature table
    Predict(predict::PredictArgs),

    /// Summarize a labeled dataset
    Summary {
        /// Labeled CSV file
        #[arg(long, value_name = "FILE")]
        data: PathBuf,

        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by commands that need a model configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// JSON training configuration; its `model` section defines the
    /// architecture
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the feature vector length
    #[arg(long)]
    pub input_size: Option<usize>,
}

impl ModelArgs {
    /// Loads the configuration file (or defaults) and applies overrides.
    pub fn load(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!(path = %path.display(), "loading configuration");
                TrainingConfig::from_json(path)?
            }
            None => TrainingConfig::default(),
        };
        if let Some(input_size) = self.input_size {
            config.model.input_size = input_size;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let response = failure::response(&err);
            error!(
                kind = response.kind.name(),
                status = response.status,
                "{}",
                response.message
            );
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("{}", response.message),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Train(args) => train::run(&args),
        Commands::Predict(args) => predict::run(&args),
        Commands::Summary { data, json } => summary::run(&data, json),
    }
}
