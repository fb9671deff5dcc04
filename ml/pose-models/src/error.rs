//! Error types for pose-models crate.

use pose_types::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// Errors that can occur in pose-models operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Input does not match the classifier's input contract.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    Shape {
        /// Expected shape.
        expected: String,
        /// Actual shape.
        actual: String,
    },

    /// Tensor values could not be read back.
    #[error("tensor data error: {0}")]
    TensorData(String),

    /// Invalid model configuration.
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    /// Checkpoint file not found.
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    /// Failed to load checkpoint.
    #[error("failed to load checkpoint from {path}: {reason}")]
    LoadCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to save checkpoint.
    #[error("failed to save checkpoint to {path}: {reason}")]
    SaveCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Checkpoint weights do not fit the configured architecture.
    #[error("checkpoint {path} is incompatible: expected {expected}, found {actual}")]
    IncompatibleCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// What the configured architecture needs.
        expected: String,
        /// What the weights file holds.
        actual: String,
    },
}

impl ModelError {
    /// Creates a shape mismatch error.
    #[must_use]
    pub fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Shape {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a tensor data error.
    #[must_use]
    pub fn tensor_data(reason: impl Into<String>) -> Self {
        Self::TensorData(reason.into())
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a checkpoint not found error.
    #[must_use]
    pub fn checkpoint_not_found(path: impl Into<String>) -> Self {
        Self::CheckpointNotFound(path.into())
    }

    /// Creates a load checkpoint error.
    #[must_use]
    pub fn load_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a save checkpoint error.
    #[must_use]
    pub fn save_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SaveCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors raised while reading or writing checkpoints.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::CheckpointNotFound(_)
                | Self::LoadCheckpoint { .. }
                | Self::SaveCheckpoint { .. }
                | Self::IncompatibleCheckpoint { .. }
        )
    }
}

impl ClassifiedError for ModelError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Shape { .. } | Self::TensorData(_) => ErrorKind::Shape,
            Self::InvalidConfig(_) => ErrorKind::Training,
            _ => ErrorKind::Persistence,
        }
    }
}

/// Result type for pose-models operations.
pub type Result<T> = std::result::Result<T, ModelError>;
