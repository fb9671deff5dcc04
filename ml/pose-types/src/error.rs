//! Error types for pose-types crate, plus the workspace-wide error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from pose-name ↔ class-index lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Class index has no name in the vocabulary.
    #[error("class index {index} is outside the vocabulary ({len} classes)")]
    UnknownIndex {
        /// The requested index.
        index: usize,
        /// Number of classes in the vocabulary.
        len: usize,
    },

    /// Pose name was never seen when the vocabulary was fit.
    #[error("pose label `{0}` is not in the vocabulary")]
    UnknownLabel(String),

    /// A serialized vocabulary is malformed.
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),
}

impl DecodeError {
    /// Creates an unknown index error.
    #[must_use]
    pub const fn unknown_index(index: usize, len: usize) -> Self {
        Self::UnknownIndex { index, len }
    }

    /// Creates an unknown label error.
    #[must_use]
    pub fn unknown_label(label: impl Into<String>) -> Self {
        Self::UnknownLabel(label.into())
    }

    /// Creates an invalid vocabulary error.
    #[must_use]
    pub fn invalid_vocabulary(reason: impl Into<String>) -> Self {
        Self::InvalidVocabulary(reason.into())
    }
}

/// Result type for pose-types operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Coarse error taxonomy shared by every crate in the workspace.
///
/// Each crate's error type reports one of these through
/// [`ClassifiedError::kind`], which is what a front end uses to pick a
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or incomplete input table.
    Data,
    /// Feature vector length does not match the configured input size.
    Shape,
    /// Training could not proceed (inconsistent labels, bad configuration).
    Training,
    /// Checkpoint missing, unreadable, incompatible, or unwritable.
    Persistence,
    /// Pose index ↔ name lookup failure.
    Decode,
}

impl ErrorKind {
    /// Returns the status code a request-handling layer should answer with.
    ///
    /// Caller mistakes map to 4xx, server-side state to 5xx.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Data => 400,
            Self::Shape => 422,
            Self::Training | Self::Decode => 500,
            Self::Persistence => 503,
        }
    }

    /// Returns the kind name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Shape => "shape",
            Self::Training => "training",
            Self::Persistence => "persistence",
            Self::Decode => "decode",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An error that knows which [`ErrorKind`] it belongs to.
pub trait ClassifiedError: std::error::Error {
    /// Returns the taxonomy bucket of this error.
    fn kind(&self) -> ErrorKind;
}

impl ClassifiedError for DecodeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Decode
    }
}

/// Structured failure body produced at the serving boundary.
///
/// # Example
///
/// ```
/// use pose_types::{DecodeError, ErrorResponse};
///
/// let response = ErrorResponse::from_error(&DecodeError::unknown_index(9, 5));
/// assert_eq!(response.status, 500);
/// assert!(response.message.contains("9"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Taxonomy bucket.
    pub kind: ErrorKind,
    /// Status code derived from `kind`.
    pub status: u16,
    /// Human-readable description with diagnostic context.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a response for the given kind and message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: kind.status_code(),
            message: message.into(),
        }
    }

    /// Creates a response from any classified error.
    #[must_use]
    pub fn from_error<E: ClassifiedError + ?Sized>(err: &E) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}
