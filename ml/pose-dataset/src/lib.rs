//! Dataset lifecycle for CSI pose classification.
//!
//! This crate turns tabular CSI readings into training and inference input:
//!
//! # Loading
//!
//! - [`FeatureDataset`] - Labelled samples (features, presence, pose) with a fitted vocabulary
//! - [`FeatureTable`] - Unlabelled inference input with optional joint columns
//! - [`Sample`] - One owned labelled sample
//!
//! # Batching
//!
//! - [`BatchPlan`] - Shuffled (training) or sequential (validation) batch indices
//! - [`FeatureBatch`] - Row-major features and targets gathered for one batch
//!
//! # Statistics
//!
//! - [`DatasetSummary`] - Sample counts, presence ratio, class distribution
//!
//! # Table Format
//!
//! Every column whose name starts with [`FEATURE_PREFIX`] is a feature, in
//! table order. Labelled tables also carry [`PRESENCE_COLUMN`] and
//! [`POSE_COLUMN`].
//!
//! # Example
//!
//! ```
//! use pose_dataset::FeatureDataset;
//!
//! let csv = "csi_0,csi_1,human_presence,pose_class\n\
//!            0.1,0.2,1,sit\n\
//!            0.3,0.4,0,no_human\n";
//! let dataset = FeatureDataset::from_reader(csv.as_bytes()).unwrap();
//!
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.feature_width(), 2);
//!
//! let sample = dataset.get(0).unwrap();
//! assert_eq!(sample.features, &[0.1, 0.2]);
//! assert!((sample.presence - 1.0).abs() < 1e-6);
//! assert_eq!(dataset.vocabulary().decode(sample.pose).unwrap(), "sit");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod batches;
mod dataset;
mod error;
mod summary;
mod table;

// Re-export dataset types
pub use dataset::{EncodedSample, FeatureDataset, Sample};
pub use table::{FEATURE_PREFIX, FeatureTable, POSE_COLUMN, PRESENCE_COLUMN, joint_column};

// Re-export batching utilities
pub use batches::{BatchPlan, FeatureBatch};

// Re-export summary types
pub use summary::DatasetSummary;

// Re-export error types
pub use error::{DataError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        BatchPlan, DataError, DatasetSummary, FeatureBatch, FeatureDataset, FeatureTable,
        Sample,
    };
}
