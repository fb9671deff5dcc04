//! Error types for pose-dataset crate.

use pose_types::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// Errors raised while loading or indexing CSI feature tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// No column carries the feature prefix.
    #[error("no feature columns found (expected names starting with `{prefix}`)")]
    NoFeatureColumns {
        /// The feature-column prefix that was searched for.
        prefix: &'static str,
    },

    /// A required label column is absent.
    #[error("required column `{0}` is missing")]
    MissingColumn(String),

    /// The table has a header but no rows.
    #[error("dataset is empty")]
    EmptyDataset,

    /// A cell could not be interpreted.
    #[error("invalid value in row {row}, column `{column}`: {reason}")]
    InvalidCell {
        /// Zero-based data row.
        row: usize,
        /// Column name.
        column: String,
        /// What was wrong with the cell.
        reason: String,
    },

    /// A sample's feature count differs from the rest of the dataset.
    #[error("sample {index} has {actual} features, expected {expected}")]
    InconsistentWidth {
        /// Sample index.
        index: usize,
        /// Width of the first sample.
        expected: usize,
        /// Width of this sample.
        actual: usize,
    },

    /// Sample index out of range.
    #[error("index {index} out of bounds (dataset has {len} samples)")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of samples.
        len: usize,
    },

    /// The CSV reader rejected the input.
    #[error("CSV error: {0}")]
    Csv(String),

    /// The file could not be opened or read.
    #[error("IO error reading {path}: {reason}")]
    Io {
        /// Path being read.
        path: String,
        /// Underlying error.
        reason: String,
    },
}

impl DataError {
    /// Creates a missing column error.
    #[must_use]
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn(column.into())
    }

    /// Creates an invalid cell error.
    #[must_use]
    pub fn invalid_cell(row: usize, column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCell {
            row,
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Creates an index out of bounds error.
    #[must_use]
    pub const fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl ClassifiedError for DataError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Data
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type for pose-dataset operations.
pub type Result<T> = std::result::Result<T, DataError>;
