//! Select (pinch) classification from hand joints.
//!
//! Directly tracked hands report their own select state; joints-only
//! hands select when the thumb and index fingertips are close together.

use tracing::trace;

use super::frame::HandFrame;
use super::joints::{JointId, JointPoseTable};

/// Thumb-to-index fingertip distance (meters) below which a hand is pinching.
///
/// Fixed, and compared with strict less-than.
pub const PINCH_THRESHOLD_M: f32 = 0.04;

/// Derives the per-frame select signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier;

impl GestureClassifier {
    /// Whether the hand is selecting this frame.
    ///
    /// `table` must already hold this frame's joints.
    pub fn classify(&self, table: &JointPoseTable, frame: &HandFrame) -> bool {
        if frame.direct_tracking_available {
            return frame.selected;
        }

        match table.distance(JointId::ThumbTip, JointId::IndexTip) {
            Some(distance) => {
                trace!("pinch distance {:.4} m", distance);
                is_pinching(distance)
            }
            None => false,
        }
    }
}

/// Pinch law on a fingertip distance in meters.
pub fn is_pinching(distance: f32) -> bool {
    distance < PINCH_THRESHOLD_M
}
