//! `csi-pose train`

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pose_dataset::FeatureDataset;
use pose_models::{ModelStore, TrainingBackend, default_device};
use pose_training::{Trainer, TrainingConfig};
use tracing::info;

use crate::ModelArgs;

/// Arguments for the `train` command.
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Labeled training CSV
    #[arg(long, value_name = "FILE")]
    pub train: PathBuf,

    /// Labeled validation CSV
    #[arg(long, value_name = "FILE")]
    pub valid: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Override the number of epochs
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Override the batch size
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Override the learning rate
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Seed for batch shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where to write the best checkpoint
    #[arg(long, value_name = "FILE")]
    pub checkpoint: Option<PathBuf>,

    /// Write per-epoch metrics as JSON
    #[arg(long, value_name = "FILE")]
    pub metrics: Option<PathBuf>,
}

impl TrainArgs {
    /// Builds the effective configuration: file or defaults, then flags.
    pub fn config(&self) -> Result<TrainingConfig> {
        let mut config = self.model.load()?;
        if let Some(epochs) = self.epochs {
            config.num_epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(path) = &self.checkpoint {
            config.checkpoint_path.clone_from(path);
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: &TrainArgs) -> Result<()> {
    let config = args.config()?;
    info!(
        epochs = config.num_epochs,
        batch_size = config.batch_size,
        learning_rate = config.learning_rate,
        input_size = config.model.input_size,
        checkpoint = %config.checkpoint_path.display(),
        "configuration validated"
    );

    let train = FeatureDataset::load(&args.train)?;
    let valid = FeatureDataset::load(&args.valid)?;

    let mut store = ModelStore::new(config.model.clone());
    let device = default_device::<TrainingBackend>();
    let mut trainer = Trainer::<TrainingBackend>::new(config, device)?;
    let metrics = trainer.train(&train, &valid, &mut store)?;

    if let Some(path) = &args.metrics {
        let json = serde_json::to_string_pretty(&metrics)?;
        fs::write(path, json).with_context(|| format!("writing metrics to {}", path.display()))?;
        info!(path = %path.display(), "wrote metrics");
    }
    print!("{}", metrics.summary());
    Ok(())
}
