//! Articulated hand input: joint cache, select gesture, pointer synthesis
//! and interaction events.
//!
//! Provides:
//! - `joints`: joint identities, poses and the per-hand joint table
//! - `frame`: the per-frame input snapshot and its contract
//! - `gesture`: pinch/select classification
//! - `hand_ray`: stabilized aiming ray for hands without a 6-DoF pose
//! - `pointer`: pointer, grip and index-finger poses
//! - `interaction`: typed interaction slots with change detection
//! - `events`: event sink contract and stock sinks
//! - `controller`: `SimpleHand`, the per-frame pipeline

pub mod controller;
pub mod events;
pub mod frame;
pub mod gesture;
pub mod hand_ray;
pub mod interaction;
pub mod joints;
pub mod pointer;

pub use controller::{
    FrameServices, HandConfig, NoVelocity, ReferenceTransformProvider, SimpleHand,
    TrackingState, VelocityHook,
};
pub use events::{EventSink, HandEvent, NullSink, RecordingSink};
pub use frame::{FrameError, HandFrame};
pub use joints::{Handedness, JointId, JointPose, JointPoseTable, Pose, JOINT_COUNT};
