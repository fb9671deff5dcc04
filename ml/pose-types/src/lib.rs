//! Shared types for CSI pose classification.
//!
//! This crate provides the vocabulary and boundary types that every other
//! crate in the workspace agrees on:
//!
//! # Label Types
//!
//! - [`LabelVocabulary`] - Bidirectional pose-name ↔ class-index mapping
//! - [`DEFAULT_POSE_CLASSES`] - Fallback pose set used when no fitted vocabulary is available
//!
//! # Boundary Types
//!
//! - [`JointCoordinate`] - A single `{x, y}` joint position
//! - [`Skeleton`] - Exactly [`NUM_JOINTS`] joints in COCO order
//! - [`PoseReport`] - What the core hands back to a caller for one request
//!
//! # Errors
//!
//! - [`DecodeError`] - Index ↔ name lookup failures
//! - [`ErrorKind`] - Coarse error taxonomy shared by all crates
//! - [`ErrorResponse`] - Structured failure body with a deterministic status code
//!
//! # Layer 0 Crate
//!
//! This crate has no ML framework dependency. It can be used in:
//! - Training pipelines
//! - Inference front ends
//! - Dataset tools
//!
//! # Example
//!
//! ```
//! use pose_types::LabelVocabulary;
//!
//! let vocab = LabelVocabulary::fit(["stand", "sit", "stand", "kneel"]);
//! assert_eq!(vocab.len(), 3);
//! assert_eq!(vocab.encode("sit").ok(), Some(1));
//! assert_eq!(vocab.decode(0).ok(), Some("kneel"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod joints;
mod report;
mod vocabulary;

// Re-export label types
pub use vocabulary::{DEFAULT_POSE_CLASSES, LabelVocabulary, UNKNOWN_POSE};

// Re-export boundary types
pub use joints::{JointCoordinate, JointCountError, NUM_JOINTS, Skeleton};
pub use report::{NO_POSE, PRESENCE_THRESHOLD, PoseReport, presence_confidence};

// Re-export error types
pub use error::{ClassifiedError, DecodeError, ErrorKind, ErrorResponse, Result};
