//! Training configuration.

use std::path::{Path, PathBuf};

use pose_models::SequenceClassifierConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};

/// Default location of the best checkpoint.
pub const DEFAULT_CHECKPOINT_PATH: &str = "saved_models/best_model.bin";

/// Configuration for a training run.
///
/// Missing fields take their defaults when read from JSON.
///
/// # Example
///
/// ```
/// use pose_training::TrainingConfig;
///
/// let config = TrainingConfig::default();
/// assert_eq!(config.num_epochs, 50);
/// assert_eq!(config.batch_size, 32);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training epochs.
    pub num_epochs: usize,

    /// Batch size.
    pub batch_size: usize,

    /// Adam learning rate.
    pub learning_rate: f64,

    /// Random seed for batch shuffling; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Where the best checkpoint is written.
    pub checkpoint_path: PathBuf,

    /// Classifier architecture.
    pub model: SequenceClassifierConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_epochs: 50,
            batch_size: 32,
            learning_rate: 1e-3,
            seed: None,
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            model: SequenceClassifierConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Creates a default config with the given number of epochs.
    #[must_use]
    pub fn new(num_epochs: usize) -> Self {
        Self {
            num_epochs,
            ..Self::default()
        }
    }

    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub const fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the checkpoint path.
    #[must_use]
    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = path.into();
        self
    }

    /// Sets the classifier architecture.
    #[must_use]
    pub const fn with_model(mut self, model: SequenceClassifierConfig) -> Self {
        self.model = model;
        self
    }

    /// Reads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::ConfigFile`] if the file cannot be read or
    /// parsed.
    pub fn from_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TrainingError::config_file(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| TrainingError::config_file(format!("{}: {e}", path.display())))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.num_epochs == 0 {
            return Err(TrainingError::invalid_config("num_epochs must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::invalid_config("batch_size must be > 0"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainingError::invalid_config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.checkpoint_path.as_os_str().is_empty() {
            return Err(TrainingError::invalid_config("checkpoint_path is empty"));
        }
        self.model
            .validate()
            .map_err(|e| TrainingError::invalid_config(e.to_string()))
    }

    /// Returns `true` if [`TrainingConfig::validate`] passes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
