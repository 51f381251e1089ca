//! Event sink contract for hand input, plus no-op and recording sinks.

use super::interaction::{DeviceInputType, InputAction};
use super::joints::{Handedness, JointPoseTable, Pose};

/// Receives the events a hand raises while updating.
///
/// Within one frame the order is: `source_pose_changed`, `joints_updated`,
/// then one call per changed slot in slot order.
pub trait EventSink {
    /// The hand's pointer pose this frame.  Raised every enabled frame.
    fn source_pose_changed(&mut self, hand: Handedness, pose: &Pose);

    /// The full joint table.  Raised every enabled frame.
    fn joints_updated(&mut self, hand: Handedness, joints: &JointPoseTable);

    /// A pose slot changed value.
    fn pose_input_changed(
        &mut self,
        hand: Handedness,
        input: DeviceInputType,
        action: InputAction,
        pose: &Pose,
    );

    /// A bool slot went from false to true.
    fn input_down(&mut self, hand: Handedness, input: DeviceInputType, action: InputAction);

    /// A bool slot went from true to false.
    fn input_up(&mut self, hand: Handedness, input: DeviceInputType, action: InputAction);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn source_pose_changed(&mut self, _hand: Handedness, _pose: &Pose) {}

    fn joints_updated(&mut self, _hand: Handedness, _joints: &JointPoseTable) {}

    fn pose_input_changed(
        &mut self,
        _hand: Handedness,
        _input: DeviceInputType,
        _action: InputAction,
        _pose: &Pose,
    ) {
    }

    fn input_down(&mut self, _hand: Handedness, _input: DeviceInputType, _action: InputAction) {}

    fn input_up(&mut self, _hand: Handedness, _input: DeviceInputType, _action: InputAction) {}
}

// ── Recorded events ────────────────────────────────────────

/// An event as captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum HandEvent {
    SourcePoseChanged {
        hand: Handedness,
        pose: Pose,
    },
    JointsUpdated {
        hand: Handedness,
        joint_count: usize,
    },
    PoseInputChanged {
        hand: Handedness,
        input: DeviceInputType,
        action: InputAction,
        pose: Pose,
    },
    InputDown {
        hand: Handedness,
        input: DeviceInputType,
        action: InputAction,
    },
    InputUp {
        hand: Handedness,
        input: DeviceInputType,
        action: InputAction,
    },
}

impl HandEvent {
    /// Event name for status output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourcePoseChanged { .. } => "source-pose-changed",
            Self::JointsUpdated { .. } => "joints-updated",
            Self::PoseInputChanged { .. } => "pose-input-changed",
            Self::InputDown { .. } => "input-down",
            Self::InputUp { .. } => "input-up",
        }
    }

    pub fn hand(&self) -> Handedness {
        match self {
            Self::SourcePoseChanged { hand, .. }
            | Self::JointsUpdated { hand, .. }
            | Self::PoseInputChanged { hand, .. }
            | Self::InputDown { hand, .. }
            | Self::InputUp { hand, .. } => *hand,
        }
    }

    /// Format as an s-expression event line.
    pub fn to_sexp(&self) -> String {
        let hand = self.hand().as_str().to_string();
        let mut fields: Vec<(&str, String)> = vec![("hand", hand)];
        match self {
            Self::SourcePoseChanged { pose, .. } => {
                fields.push(("pose", pose_sexp(pose)));
            }
            Self::JointsUpdated { joint_count, .. } => {
                fields.push(("joints", joint_count.to_string()));
            }
            Self::PoseInputChanged {
                input, action, pose, ..
            } => {
                fields.push(("input", input.as_str().to_string()));
                fields.push(("action", format!("{:?}", action.description)));
                fields.push(("pose", pose_sexp(pose)));
            }
            Self::InputDown { input, action, .. } | Self::InputUp { input, action, .. } => {
                fields.push(("input", input.as_str().to_string()));
                fields.push(("action", format!("{:?}", action.description)));
            }
        }
        format_event(self.kind(), &fields)
    }
}

/// Build an `(:type :event ...)` line from key/value pairs.
pub fn format_event(event_type: &str, fields: &[(&str, String)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

fn pose_sexp(pose: &Pose) -> String {
    let p = pose.position;
    let q = pose.rotation;
    format!(
        "(:position ({:.4} {:.4} {:.4}) :rotation ({:.4} {:.4} {:.4} {:.4}))",
        p.x, p.y, p.z, q.x, q.y, q.z, q.w
    )
}

/// Sink that keeps every event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<HandEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded events, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<HandEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn source_pose_changed(&mut self, hand: Handedness, pose: &Pose) {
        self.events.push(HandEvent::SourcePoseChanged { hand, pose: *pose });
    }

    fn joints_updated(&mut self, hand: Handedness, joints: &JointPoseTable) {
        self.events.push(HandEvent::JointsUpdated {
            hand,
            joint_count: joints.len(),
        });
    }

    fn pose_input_changed(
        &mut self,
        hand: Handedness,
        input: DeviceInputType,
        action: InputAction,
        pose: &Pose,
    ) {
        self.events.push(HandEvent::PoseInputChanged {
            hand,
            input,
            action,
            pose: *pose,
        });
    }

    fn input_down(&mut self, hand: Handedness, input: DeviceInputType, action: InputAction) {
        self.events.push(HandEvent::InputDown {
            hand,
            input,
            action,
        });
    }

    fn input_up(&mut self, hand: Handedness, input: DeviceInputType, action: InputAction) {
        self.events.push(HandEvent::InputUp {
            hand,
            input,
            action,
        });
    }
}
