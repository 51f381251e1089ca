//! Hand joint identities, poses and the per-hand joint cache.
//!
//! Models the 25 joints per hand reported by WebXR-style articulated
//! hand tracking.  The cache is overwritten wholesale every frame.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::frame::HandFrame;

// ── Joint definitions ──────────────────────────────────────

/// The 25 tracked hand joints, numbered 1..=25 in device order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum JointId {
    Wrist = 1,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    MiddleTip,
    RingMetacarpal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    RingTip,
    LittleMetacarpal,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
    LittleTip,
}

/// Total number of joints per hand.
pub const JOINT_COUNT: usize = 25;

impl JointId {
    /// Every joint in identity order.
    pub const ALL: [JointId; JOINT_COUNT] = [
        Self::Wrist,
        Self::ThumbMetacarpal,
        Self::ThumbProximal,
        Self::ThumbDistal,
        Self::ThumbTip,
        Self::IndexMetacarpal,
        Self::IndexProximal,
        Self::IndexIntermediate,
        Self::IndexDistal,
        Self::IndexTip,
        Self::MiddleMetacarpal,
        Self::MiddleProximal,
        Self::MiddleIntermediate,
        Self::MiddleDistal,
        Self::MiddleTip,
        Self::RingMetacarpal,
        Self::RingProximal,
        Self::RingIntermediate,
        Self::RingDistal,
        Self::RingTip,
        Self::LittleMetacarpal,
        Self::LittleProximal,
        Self::LittleIntermediate,
        Self::LittleDistal,
        Self::LittleTip,
    ];

    /// Numeric identity (1-25).
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Position of this joint in a frame's joint sequence (0-24).
    pub fn index(&self) -> usize {
        self.id() as usize - 1
    }

    /// String representation for status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbMetacarpal => "thumb-metacarpal",
            Self::ThumbProximal => "thumb-proximal",
            Self::ThumbDistal => "thumb-distal",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMetacarpal => "index-metacarpal",
            Self::IndexProximal => "index-proximal",
            Self::IndexIntermediate => "index-intermediate",
            Self::IndexDistal => "index-distal",
            Self::IndexTip => "index-tip",
            Self::MiddleMetacarpal => "middle-metacarpal",
            Self::MiddleProximal => "middle-proximal",
            Self::MiddleIntermediate => "middle-intermediate",
            Self::MiddleDistal => "middle-distal",
            Self::MiddleTip => "middle-tip",
            Self::RingMetacarpal => "ring-metacarpal",
            Self::RingProximal => "ring-proximal",
            Self::RingIntermediate => "ring-intermediate",
            Self::RingDistal => "ring-distal",
            Self::RingTip => "ring-tip",
            Self::LittleMetacarpal => "little-metacarpal",
            Self::LittleProximal => "little-proximal",
            Self::LittleIntermediate => "little-intermediate",
            Self::LittleDistal => "little-distal",
            Self::LittleTip => "little-tip",
        }
    }
}

// ── Handedness ─────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Sign applied to lateral (x) offsets so left-hand geometry mirrors the right.
    pub fn lateral_sign(&self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

// ── Pose ───────────────────────────────────────────────────

/// Position and orientation of a joint, controller or pointer.
///
/// Equality is structural: two poses are equal when every component is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in meters.
    pub position: Vec3,
    /// Orientation quaternion.
    pub rotation: Quat,
}

/// Joints share the generic pose representation.
pub type JointPose = Pose;

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── Joint cache ────────────────────────────────────────────

/// Latest joint poses for one hand, keyed by [`JointId`].
///
/// Empty until the first update; afterwards always holds all 25 joints.
#[derive(Debug, Clone, Default)]
pub struct JointPoseTable {
    joints: Vec<JointPose>,
}

impl JointPoseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every cached joint with the frame's poses.
    ///
    /// The frame must already have passed [`HandFrame::validate`].
    pub(crate) fn update(&mut self, frame: &HandFrame) {
        debug_assert_eq!(frame.joints.len(), JOINT_COUNT, "joint sequence must be complete");
        self.joints.clear();
        self.joints.extend_from_slice(&frame.joints[..JOINT_COUNT]);
    }

    /// Cached pose for `joint`, or `None` before the first update.
    pub fn get(&self, joint: JointId) -> Option<JointPose> {
        self.joints.get(joint.index()).copied()
    }

    /// Cached joints in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (JointId, JointPose)> + '_ {
        JointId::ALL.iter().copied().zip(self.joints.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Euclidean distance between two cached joints, in meters.
    pub fn distance(&self, a: JointId, b: JointId) -> Option<f32> {
        Some(self.get(a)?.position.distance(self.get(b)?.position))
    }
}

/// Create a test joint at a given position with identity rotation.
#[cfg(test)]
pub(crate) fn test_joint(x: f32, y: f32, z: f32) -> JointPose {
    Pose::new(Vec3::new(x, y, z), Quat::IDENTITY)
}

/// Create a full set of 25 joints spaced along the x axis.
#[cfg(test)]
pub(crate) fn test_joints() -> Vec<JointPose> {
    (0..JOINT_COUNT)
        .map(|i| test_joint((i + 1) as f32 * 0.01, 0.0, 0.0))
        .collect()
}

// ── Tests ──────────────────────────────────────────────────
