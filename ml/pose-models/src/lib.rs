//! LSTM pose classifier, checkpoint persistence and inference.
//!
//! This crate provides the model side of CSI pose classification, built
//! with the Burn framework.
//!
//! # Model Architecture
//!
//! - [`SequenceClassifier`] - Stacked LSTM encoder, shared dense layer,
//!   presence head (sigmoid) and pose head (logits)
//! - [`SequenceClassifierConfig`] - Dimensions and dropout, validated
//! - [`ForwardMode`] - Explicit train/eval switch for each forward pass
//!
//! # Checkpoint Persistence
//!
//! - [`ModelStore`] - Saves and loads weights together with the
//!   `label_vocabulary.json` sidecar; falls back to the default pose
//!   vocabulary when the sidecar is missing
//! - [`CheckpointFormat`] - Binary (compact) or JSON (inspectable) weights
//!
//! # Inference
//!
//! - [`Predictor`] - Batched evaluation-mode prediction with `"unknown"`
//!   fallback for undecodable pose indices
//! - [`Predictions`] - Parallel presence/pose/probability outputs
//!
//! # Backend Support
//!
//! Models are generic over Burn backends. [`TrainingBackend`]
//! (`Autodiff<NdArray>`) is used for optimization, [`InferenceBackend`]
//! (`NdArray`) for validation and prediction.
//!
//! # Example
//!
//! ```
//! use burn::tensor::Tensor;
//! use pose_models::{ForwardMode, InferenceBackend, SequenceClassifierConfig};
//!
//! let config = SequenceClassifierConfig::new(16).with_hidden_size(8).with_dense_size(8);
//! let device = Default::default();
//! let model = config.init::<InferenceBackend>(&device).unwrap();
//!
//! let input = Tensor::<InferenceBackend, 2>::zeros([2, 16], &device);
//! let output = model.forward(input, ForwardMode::Eval).unwrap();
//! assert_eq!(output.presence.dims(), [2, 1]);
//! assert_eq!(output.pose_logits.dims(), [2, 5]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod backend;
mod checkpoint;
mod classifier;
mod error;
mod predictor;

// Re-export model types
pub use classifier::{ClassifierOutput, ForwardMode, SequenceClassifier, SequenceClassifierConfig};

// Re-export checkpoint utilities
pub use checkpoint::{Checkpoint, CheckpointFormat, ModelStore, VOCABULARY_FILE, vocabulary_path};

// Re-export inference types
pub use predictor::{Prediction, Predictions, Predictor};

// Re-export backend utilities
pub use backend::{InferenceBackend, TrainingBackend, default_device};

// Re-export error types
pub use error::{ModelError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        CheckpointFormat, ForwardMode, InferenceBackend, ModelError, ModelStore, Prediction,
        Predictions, Predictor, SequenceClassifier, SequenceClassifierConfig, TrainingBackend,
    };
}
