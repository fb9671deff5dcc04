//! Error types for pose-training crate.

use pose_dataset::DataError;
use pose_models::ModelError;
use pose_types::{ClassifiedError, DecodeError, ErrorKind};
use thiserror::Error;

/// Errors that can occur during training.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Invalid training configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The fitted vocabulary does not fit in the pose head.
    #[error("vocabulary has {classes} classes but the pose head has {num_classes} outputs")]
    VocabularyTooLarge {
        /// Classes observed in the training set.
        classes: usize,
        /// Configured pose head width.
        num_classes: usize,
    },

    /// A pose label is outside the fitted vocabulary.
    #[error("label outside fitted vocabulary: {0}")]
    Label(#[from] DecodeError),

    /// A loss became NaN or infinite.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Dataset error.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Model or checkpoint error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Configuration file error.
    #[error("config file error: {0}")]
    ConfigFile(String),
}

impl TrainingError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a numerical instability error.
    #[must_use]
    pub fn numerical_instability(reason: impl Into<String>) -> Self {
        Self::NumericalInstability(reason.into())
    }

    /// Creates a config file error.
    #[must_use]
    pub fn config_file(reason: impl Into<String>) -> Self {
        Self::ConfigFile(reason.into())
    }
}

impl ClassifiedError for TrainingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(err) => err.kind(),
            Self::Model(err) => err.kind(),
            Self::ConfigFile(_) => ErrorKind::Data,
            Self::InvalidConfig(_)
            | Self::VocabularyTooLarge { .. }
            | Self::Label(_)
            | Self::NumericalInstability(_) => ErrorKind::Training,
        }
    }
}

/// Result type for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = TrainingError::invalid_config("batch_size must be > 0");
        assert!(err.to_string().contains("invalid configuration"));
        assert!(err.to_string().contains("batch_size"));
        assert_eq!(err.kind(), ErrorKind::Training);
    }

    #[test]
    fn error_vocabulary_too_large() {
        let err = TrainingError::VocabularyTooLarge {
            classes: 7,
            num_classes: 5,
        };
        assert!(err.to_string().contains('7'));
        assert_eq!(err.kind().status_code(), 500);
    }

    #[test]
    fn decode_errors_are_fatal_training_errors() {
        let err: TrainingError = DecodeError::unknown_label("crawl").into();
        assert!(err.to_string().contains("crawl"));
        assert_eq!(err.kind(), ErrorKind::Training);
    }

    #[test]
    fn wrapped_errors_keep_their_kind() {
        let data: TrainingError = DataError::EmptyDataset.into();
        assert_eq!(data.kind(), ErrorKind::Data);
        assert_eq!(data.to_string(), "dataset is empty");

        let model: TrainingError = ModelError::shape("[n, 256]", "[2, 3]").into();
        assert_eq!(model.kind(), ErrorKind::Shape);

        let persistence: TrainingError = ModelError::save_checkpoint("m.bin", "disk full").into();
        assert_eq!(persistence.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn error_numerical_instability() {
        let err = TrainingError::numerical_instability("loss is NaN");
        assert!(err.to_string().contains("numerical instability"));
    }

    #[test]
    fn config_file_is_data_error() {
        let err = TrainingError::config_file("expected value at line 1");
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}
