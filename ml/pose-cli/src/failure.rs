//! Maps command failures onto the structured error body.

use pose_dataset::DataError;
use pose_models::ModelError;
use pose_training::TrainingError;
use pose_types::{ClassifiedError, DecodeError, ErrorKind, ErrorResponse};

/// Classifies `err` by the first library error in its chain.
///
/// Anything unclassified (bad JSON output path, I/O on metrics) is
/// reported as a data error.
pub fn response(err: &anyhow::Error) -> ErrorResponse {
    let kind = err
        .chain()
        .find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<TrainingError>() {
                Some(e.kind())
            } else if let Some(e) = cause.downcast_ref::<ModelError>() {
                Some(e.kind())
            } else if let Some(e) = cause.downcast_ref::<DataError>() {
                Some(e.kind())
            } else {
                cause.downcast_ref::<DecodeError>().map(ClassifiedError::kind)
            }
        })
        .unwrap_or(ErrorKind::Data);
    ErrorResponse::new(kind, format!("{err:#}"))
}
