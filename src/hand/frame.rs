//! Per-frame hand input snapshot and its input contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::joints::{JointPose, Pose, JOINT_COUNT};

/// One frame of raw hand data, owned by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandFrame {
    /// Joint poses; index `i` maps to `JointId` `i + 1`.
    pub joints: Vec<JointPose>,
    /// Whether the device currently sees the hand.
    pub hand_available: bool,
    /// Device-reported 6-DoF pose, present when directly tracked.
    pub controller_pose: Option<Pose>,
    /// Whether `controller_pose` and `selected` come from the device.
    pub direct_tracking_available: bool,
    /// Device-native select state, only meaningful under direct tracking.
    pub selected: bool,
    /// Seconds since the previous frame, if the host knows it.
    pub delta_seconds: Option<f32>,
}

/// Input-contract violations.  A malformed frame is rejected whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("expected {expected} hand joints, got {actual}")]
    JointCount { expected: usize, actual: usize },
    #[error("direct tracking reported without a controller pose")]
    MissingControllerPose,
}

impl HandFrame {
    /// Check the frame against the input contract without touching any state.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.joints.len() != JOINT_COUNT {
            return Err(FrameError::JointCount {
                expected: JOINT_COUNT,
                actual: self.joints.len(),
            });
        }
        if self.direct_tracking_available && self.controller_pose.is_none() {
            return Err(FrameError::MissingControllerPose);
        }
        Ok(())
    }

    /// The controller pose, when direct tracking supplies one.
    pub fn direct_pose(&self) -> Option<Pose> {
        if self.direct_tracking_available {
            self.controller_pose
        } else {
            None
        }
    }
}

/// Joints-only frame built from a joint sequence.
#[cfg(test)]
pub(crate) fn test_frame(joints: Vec<JointPose>) -> HandFrame {
    HandFrame {
        joints,
        hand_available: true,
        ..Default::default()
    }
}
