//! Per-epoch and per-run training metrics.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Metrics for a single training epoch.
///
/// # Example
///
/// ```
/// use pose_training::EpochMetrics;
///
/// let metrics = EpochMetrics::new(0, 0.9, 0.8).with_samples(100, 20);
/// assert_eq!(metrics.epoch, 0);
/// assert!((metrics.val_loss - 0.8).abs() < 1e-6);
/// assert!(!metrics.checkpointed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch number (0-indexed).
    pub epoch: usize,

    /// Mean joint loss over training batches.
    pub train_loss: f32,

    /// Mean joint loss over validation batches.
    pub val_loss: f32,

    /// Learning rate used.
    pub learning_rate: f64,

    /// Training time in seconds.
    pub train_time_secs: f32,

    /// Validation time in seconds.
    pub val_time_secs: f32,

    /// Number of training samples processed.
    pub train_samples: usize,

    /// Number of validation samples processed.
    pub val_samples: usize,

    /// Whether this epoch passed the gate and was persisted.
    pub checkpointed: bool,
}

impl EpochMetrics {
    /// Creates new epoch metrics.
    #[must_use]
    pub const fn new(epoch: usize, train_loss: f32, val_loss: f32) -> Self {
        Self {
            epoch,
            train_loss,
            val_loss,
            learning_rate: 0.0,
            train_time_secs: 0.0,
            val_time_secs: 0.0,
            train_samples: 0,
            val_samples: 0,
            checkpointed: false,
        }
    }

    /// Sets the learning rate.
    #[must_use]
    pub const fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the training and validation times.
    #[must_use]
    pub const fn with_times(mut self, train_secs: f32, val_secs: f32) -> Self {
        self.train_time_secs = train_secs;
        self.val_time_secs = val_secs;
        self
    }

    /// Sets sample counts.
    #[must_use]
    pub const fn with_samples(mut self, train: usize, val: usize) -> Self {
        self.train_samples = train;
        self.val_samples = val;
        self
    }

    /// Marks the epoch as checkpointed.
    #[must_use]
    pub const fn with_checkpoint(mut self, checkpointed: bool) -> Self {
        self.checkpointed = checkpointed;
        self
    }

    /// Returns total time (train + val) in seconds.
    #[must_use]
    pub fn total_time_secs(&self) -> f32 {
        self.train_time_secs + self.val_time_secs
    }
}

/// Aggregate metrics for a training run.
///
/// # Example
///
/// ```
/// use pose_training::{EpochMetrics, TrainingMetrics};
///
/// let mut metrics = TrainingMetrics::new();
/// metrics.add_epoch(EpochMetrics::new(0, 0.9, 0.8).with_checkpoint(true));
/// metrics.add_epoch(EpochMetrics::new(1, 0.7, 0.85));
///
/// assert_eq!(metrics.epochs_completed(), 2);
/// assert_eq!(metrics.best_epoch, Some(0));
/// assert_eq!(metrics.checkpoints_written, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Metrics for each epoch.
    pub epoch_metrics: Vec<EpochMetrics>,

    /// Best validation loss seen.
    pub best_val_loss: Option<f32>,

    /// Epoch with best validation loss.
    pub best_epoch: Option<usize>,

    /// Number of checkpoints persisted.
    pub checkpoints_written: usize,

    /// Path of the last checkpoint written.
    pub checkpoint_path: Option<PathBuf>,

    /// Number of pose classes in the fitted vocabulary.
    pub num_classes: usize,

    /// Total training time in seconds.
    pub total_time_secs: f32,
}

impl TrainingMetrics {
    /// Creates new empty training metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds metrics for an epoch.
    pub fn add_epoch(&mut self, metrics: EpochMetrics) {
        if self.best_val_loss.map_or(true, |best| metrics.val_loss < best) {
            self.best_val_loss = Some(metrics.val_loss);
            self.best_epoch = Some(metrics.epoch);
        }
        if metrics.checkpointed {
            self.checkpoints_written += 1;
        }

        self.total_time_secs += metrics.total_time_secs();
        self.epoch_metrics.push(metrics);
    }

    /// Returns the number of completed epochs.
    #[must_use]
    pub fn epochs_completed(&self) -> usize {
        self.epoch_metrics.len()
    }

    /// Returns the final training loss.
    #[must_use]
    pub fn final_loss(&self) -> f32 {
        self.epoch_metrics.last().map_or(f32::NAN, |m| m.train_loss)
    }

    /// Returns the final validation loss.
    #[must_use]
    pub fn final_val_loss(&self) -> f32 {
        self.epoch_metrics.last().map_or(f32::NAN, |m| m.val_loss)
    }

    /// Returns the initial training loss.
    #[must_use]
    pub fn initial_loss(&self) -> f32 {
        self.epoch_metrics
            .first()
            .map_or(f32::NAN, |m| m.train_loss)
    }

    /// Returns validation losses as a vector.
    #[must_use]
    pub fn val_losses(&self) -> Vec<f32> {
        self.epoch_metrics.iter().map(|m| m.val_loss).collect()
    }

    /// Returns the epochs that were persisted.
    #[must_use]
    pub fn checkpointed_epochs(&self) -> Vec<usize> {
        self.epoch_metrics
            .iter()
            .filter(|m| m.checkpointed)
            .map(|m| m.epoch)
            .collect()
    }

    /// Returns a human-readable summary.
    #[must_use]
    #[allow(clippy::let_underscore_must_use)] // String::write_fmt is infallible
    pub fn summary(&self) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        let _ = writeln!(s, "CSI pose training");
        let _ = writeln!(s, "-----------------");
        let _ = writeln!(s, "Epochs completed: {}", self.epochs_completed());
        let _ = writeln!(s, "Pose classes: {}", self.num_classes);
        let _ = writeln!(s, "Wall time: {:.1}s", self.total_time_secs);
        let _ = writeln!(
            s,
            "Train loss: {:.4} -> {:.4}",
            self.initial_loss(),
            self.final_loss()
        );

        if let (Some(best), Some(epoch)) = (self.best_val_loss, self.best_epoch) {
            let _ = writeln!(s, "Best val loss: {best:.4} (epoch {epoch})");
        }
        let _ = writeln!(s, "Checkpoints written: {}", self.checkpoints_written);
        if let Some(path) = &self.checkpoint_path {
            let _ = writeln!(s, "Checkpoint: {}", path.display());
        }

        s
    }
}
