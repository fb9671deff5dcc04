//! Joint coordinates for the 17-joint body skeleton.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of joints in a [`Skeleton`] (COCO layout).
pub const NUM_JOINTS: usize = 17;

/// A single joint position.
///
/// # Example
///
/// ```
/// use pose_types::JointCoordinate;
///
/// let wrist = JointCoordinate::new(0.4, 0.7);
/// assert!((wrist.x - 0.4).abs() < 1e-6);
/// assert_eq!(JointCoordinate::default(), JointCoordinate::origin());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointCoordinate {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl JointCoordinate {
    /// Creates a new joint coordinate.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The `{0, 0}` placeholder used when a joint is not available.
    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl Default for JointCoordinate {
    fn default() -> Self {
        Self::origin()
    }
}

/// A joint list of the wrong length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a skeleton needs {NUM_JOINTS} joints, got {0}")]
pub struct JointCountError(pub usize);

/// A full body skeleton of exactly [`NUM_JOINTS`] joints.
///
/// The joint list can only be built (or deserialized) with the right
/// length, so a report always carries 17 entries.
///
/// # Example
///
/// ```
/// use pose_types::{JointCoordinate, Skeleton, NUM_JOINTS};
///
/// let zeroed = Skeleton::zeroed();
/// assert_eq!(zeroed.joints().len(), NUM_JOINTS);
///
/// assert!(Skeleton::from_joints(vec![JointCoordinate::origin(); 3]).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<JointCoordinate>", into = "Vec<JointCoordinate>")]
pub struct Skeleton {
    joints: Vec<JointCoordinate>,
}

impl Skeleton {
    /// Creates a skeleton with every joint at the origin.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            joints: vec![JointCoordinate::origin(); NUM_JOINTS],
        }
    }

    /// Creates a skeleton from exactly [`NUM_JOINTS`] joints.
    ///
    /// Returns `None` for any other length.
    #[must_use]
    pub fn from_joints(joints: Vec<JointCoordinate>) -> Option<Self> {
        Self::try_from(joints).ok()
    }

    /// Returns the joints in COCO order.
    #[must_use]
    pub fn joints(&self) -> &[JointCoordinate] {
        &self.joints
    }

    /// Returns `true` if every joint is at the origin.
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.joints.iter().all(|j| *j == JointCoordinate::origin())
    }

    /// Consumes the skeleton, returning the joint list.
    #[must_use]
    pub fn into_joints(self) -> Vec<JointCoordinate> {
        self.joints
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl TryFrom<Vec<JointCoordinate>> for Skeleton {
    type Error = JointCountError;

    fn try_from(joints: Vec<JointCoordinate>) -> Result<Self, Self::Error> {
        if joints.len() == NUM_JOINTS {
            Ok(Self { joints })
        } else {
            Err(JointCountError(joints.len()))
        }
    }
}

impl From<Skeleton> for Vec<JointCoordinate> {
    fn from(skeleton: Skeleton) -> Self {
        skeleton.joints
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_skeleton() {
        let skeleton = Skeleton::zeroed();
        assert_eq!(skeleton.joints().len(), NUM_JOINTS);
        assert!(skeleton.is_zeroed());
    }

    #[test]
    fn from_joints_requires_exact_length() {
        assert!(Skeleton::from_joints(Vec::new()).is_none());
        assert!(Skeleton::from_joints(vec![JointCoordinate::origin(); 16]).is_none());
        assert!(Skeleton::from_joints(vec![JointCoordinate::origin(); 18]).is_none());
        assert!(Skeleton::from_joints(vec![JointCoordinate::origin(); 17]).is_some());
    }

    #[test]
    fn joints_keep_their_order() {
        let mut joints = vec![JointCoordinate::origin(); NUM_JOINTS];
        joints[9] = JointCoordinate::new(0.25, 0.75);
        let skeleton = Skeleton::from_joints(joints).unwrap();

        assert_eq!(skeleton.joints()[9].x, 0.25);
        assert_eq!(skeleton.joints()[9].y, 0.75);
        assert!(!skeleton.is_zeroed());
    }

    #[test]
    fn skeleton_serializes_as_list() {
        let json = serde_json::to_string(&Skeleton::zeroed()).unwrap();
        assert!(json.starts_with("[{\"x\":0.0,\"y\":0.0}"));
        assert_eq!(json.matches("\"x\"").count(), NUM_JOINTS);

        let parsed: Skeleton = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Skeleton::zeroed());
    }

    #[test]
    fn deserialize_rejects_wrong_joint_count() {
        let err = serde_json::from_str::<Skeleton>(r#"[{"x":1.0,"y":2.0}]"#).unwrap_err();
        assert!(err.to_string().contains("needs 17 joints, got 1"));
        assert!(serde_json::from_str::<Skeleton>("[]").is_err());
    }
}
