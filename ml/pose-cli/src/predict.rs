//! `csi-pose predict`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pose_dataset::FeatureTable;
use pose_models::{InferenceBackend, Predictor, default_device};
use pose_training::DEFAULT_CHECKPOINT_PATH;
use tracing::info;

use crate::ModelArgs;

/// Arguments for the `predict` command.
#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// CSV with `csi_` feature columns (labels and joints optional)
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Checkpoint weights; the vocabulary sidecar is read from the same
    /// directory
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CHECKPOINT_PATH)]
    pub checkpoint: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Print the pose report for the first row instead of all predictions
    #[arg(long)]
    pub report: bool,
}

pub fn run(args: &PredictArgs) -> Result<()> {
    let config = args.model.load()?;
    let device = default_device::<InferenceBackend>();
    let predictor =
        Predictor::<InferenceBackend>::from_checkpoint(&args.checkpoint, config.model, device)?;
    let table = FeatureTable::load(&args.input)?;
    info!(rows = table.len(), width = table.feature_width(), "loaded input");

    let json = if args.report {
        serde_json::to_string_pretty(&predictor.report(&table)?)?
    } else {
        serde_json::to_string_pretty(&predictor.predict(table.rows())?)?
    };
    println!("{json}");
    Ok(())
}
