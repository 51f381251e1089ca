//! hand-input: per-frame articulated hand input.
//!
//! Turns a tracked hand's joints (and, when the device has one, its 6-DoF
//! controller pose) into a joint table, a pointer pose, a select gesture
//! and edge-triggered interaction events.

pub mod hand;

pub use hand::{
    EventSink, FrameError, FrameServices, HandConfig, HandEvent, HandFrame, Handedness,
    JointId, JointPose, JointPoseTable, NoVelocity, NullSink, Pose, RecordingSink,
    ReferenceTransformProvider, SimpleHand, TrackingState, VelocityHook, JOINT_COUNT,
};
