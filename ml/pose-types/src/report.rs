//! Per-request pose report.

use serde::{Deserialize, Serialize};

use crate::joints::{JointCoordinate, Skeleton};

/// Presence probabilities above this value count as "human present".
pub const PRESENCE_THRESHOLD: f32 = 0.5;

/// Pose reported when no human is present.
pub const NO_POSE: &str = "None";

/// Certainty of a presence decision, derived from its probability.
///
/// Maps the distance between `probability` and [`PRESENCE_THRESHOLD`] onto
/// `[0, 1]`: a probability at the threshold gives 0, a probability of 0 or 1
/// gives 1. This is a decision margin, not a calibrated probability, and it
/// says nothing about how certain the pose label is.
///
/// # Example
///
/// ```
/// use pose_types::presence_confidence;
///
/// assert!((presence_confidence(0.5) - 0.0).abs() < 1e-6);
/// assert!((presence_confidence(0.9) - 0.8).abs() < 1e-6);
/// assert!((presence_confidence(0.1) - 0.8).abs() < 1e-6);
/// ```
#[must_use]
pub fn presence_confidence(probability: f32) -> f32 {
    if probability.is_nan() {
        return 0.0;
    }
    ((probability - PRESENCE_THRESHOLD).abs() * 2.0).clamp(0.0, 1.0)
}

/// What the core returns to a caller for one request.
///
/// Serialized with camelCase keys.
///
/// # Example
///
/// ```
/// use pose_types::{PoseReport, Skeleton, NO_POSE};
///
/// let report = PoseReport::new(0.2, "sit", Skeleton::zeroed());
/// assert!(!report.human_presence);
/// assert_eq!(report.pose, NO_POSE);
/// assert_eq!(report.joint_coordinates.len(), 17);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseReport {
    /// Whether a human was detected.
    pub human_presence: bool,

    /// Decoded pose label, `"unknown"` if decoding failed, or [`NO_POSE`].
    pub pose: String,

    /// Presence decision margin, see [`presence_confidence`].
    pub confidence: f32,

    /// Exactly 17 joints, zeroed when the input carried none.
    pub joint_coordinates: Vec<JointCoordinate>,
}

impl PoseReport {
    /// Builds a report from a presence probability and decoded pose label.
    ///
    /// The pose is replaced by [`NO_POSE`] when presence falls at or below
    /// [`PRESENCE_THRESHOLD`].
    #[must_use]
    pub fn new(presence_probability: f32, pose: &str, skeleton: Skeleton) -> Self {
        let human_presence = presence_probability > PRESENCE_THRESHOLD;
        Self {
            human_presence,
            pose: if human_presence { pose } else { NO_POSE }.to_string(),
            confidence: presence_confidence(presence_probability),
            joint_coordinates: skeleton.into_joints(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn confidence_bounds() {
        for p in [0.0, 0.1, 0.3, 0.5, 0.7, 0.99, 1.0] {
            let c = presence_confidence(p);
            assert!((0.0..=1.0).contains(&c), "confidence {c} for p={p}");
        }
        assert_relative_eq!(presence_confidence(0.0), 1.0);
        assert_relative_eq!(presence_confidence(1.0), 1.0);
    }

    #[test]
    fn confidence_nan_is_zero() {
        assert_relative_eq!(presence_confidence(f32::NAN), 0.0);
    }

    #[test]
    fn present_report_keeps_pose() {
        let report = PoseReport::new(0.95, "kneel", Skeleton::zeroed());
        assert!(report.human_presence);
        assert_eq!(report.pose, "kneel");
        assert_relative_eq!(report.confidence, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn threshold_is_exclusive() {
        let report = PoseReport::new(PRESENCE_THRESHOLD, "stand", Skeleton::zeroed());
        assert!(!report.human_presence);
        assert_eq!(report.pose, NO_POSE);
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = PoseReport::new(0.8, "sit", Skeleton::zeroed());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"humanPresence\":true"));
        assert!(json.contains("\"jointCoordinates\":["));
        assert!(json.contains("\"pose\":\"sit\""));
    }
}
