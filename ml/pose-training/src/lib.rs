//! Training lifecycle for the CSI pose classifier.
//!
//! This crate trains a [`pose_models::SequenceClassifier`] on a
//! [`pose_dataset::FeatureDataset`] and persists only the checkpoints that
//! improve on validation loss.
//!
//! # Training Components
//!
//! - [`TrainingConfig`] - Epochs, batch size, learning rate, seed and
//!   checkpoint location, loadable from JSON
//! - [`Trainer`] - Adam optimization over shuffled batches, ordered
//!   validation, gated persistence
//! - [`TrainingMetrics`] / [`EpochMetrics`] - What each run produced
//!
//! # Checkpoint Gating
//!
//! - [`CheckpointGate`] - Passes a validation loss only if it is strictly
//!   below every earlier one
//! - [`CheckpointSink`] - Where passing checkpoints go; implemented for
//!   [`pose_models::ModelStore`]
//!
//! # Loss Functions
//!
//! - [`joint_loss`] - `presence_loss + pose_loss`
//! - [`presence_loss`] - Binary cross-entropy on presence probabilities
//! - [`pose_loss`] - Categorical cross-entropy on pose logits
//!
//! # Example
//!
//! ```
//! use pose_training::{CheckpointGate, TrainingConfig};
//!
//! let config = TrainingConfig::new(5).with_batch_size(16).with_seed(7);
//! assert!(config.validate().is_ok());
//!
//! let mut gate = CheckpointGate::new();
//! assert!(gate.observe(0.9));
//! assert!(!gate.observe(0.9));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod gate;
mod loss;
mod metrics;
mod trainer;

// Re-export configuration
pub use config::{DEFAULT_CHECKPOINT_PATH, TrainingConfig};

// Re-export loss functions
pub use loss::{joint_loss, pose_loss, presence_loss};

// Re-export gating
pub use gate::{CheckpointGate, CheckpointSink};

// Re-export metrics
pub use metrics::{EpochMetrics, TrainingMetrics};

// Re-export trainer
pub use trainer::Trainer;

// Re-export error types
pub use error::{Result, TrainingError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        CheckpointGate, CheckpointSink, EpochMetrics, Trainer, TrainingConfig, TrainingError,
        TrainingMetrics, joint_loss, pose_loss, presence_loss,
    };
}
