//! Articulated hand controller: runs the per-frame input pipeline.
//!
//! Each enabled frame the hand caches joints, classifies select, derives
//! pointer/grip/index poses, raises pose and joint events, pokes the
//! velocity hook, and raises one event per interaction slot that changed.
//! A disabled hand ignores frames and keeps its last state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::events::EventSink;
use super::frame::{FrameError, HandFrame};
use super::gesture::GestureClassifier;
use super::hand_ray::{HandRay, HandRayConfig};
use super::interaction::{DeviceInputType, InteractionMappingTable, SlotValue};
use super::joints::{Handedness, JointId, JointPose, JointPoseTable, Pose};
use super::pointer::{PointerState, PointerSynthesizer};

// ── Collaborators ──────────────────────────────────────────

/// Supplies the head (or camera) pose the hand ray is anchored to.
pub trait ReferenceTransformProvider {
    fn reference_pose(&self) -> Pose;
}

/// A fixed reference pose.
impl ReferenceTransformProvider for Pose {
    fn reference_pose(&self) -> Pose {
        *self
    }
}

/// Called once per enabled frame, after the pose events.
pub trait VelocityHook {
    fn update_velocity(&mut self, hand: Handedness, pointer_pose: &Pose);
}

/// Velocity hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVelocity;

impl VelocityHook for NoVelocity {
    fn update_velocity(&mut self, _hand: Handedness, _pointer_pose: &Pose) {}
}

/// Host collaborators borrowed for one update.
pub struct FrameServices<'a> {
    pub reference: &'a dyn ReferenceTransformProvider,
    pub velocity: &'a mut dyn VelocityHook,
    pub events: &'a mut dyn EventSink,
}

impl<'a> FrameServices<'a> {
    pub fn new(
        reference: &'a dyn ReferenceTransformProvider,
        velocity: &'a mut dyn VelocityHook,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            reference,
            velocity,
            events,
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for one hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// Initial enabled state.
    pub enabled: bool,
    /// Frame interval (seconds) assumed when a frame carries no delta.
    pub nominal_frame_interval_s: f32,
    /// Hand ray tuning.
    pub ray: HandRayConfig,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            nominal_frame_interval_s: 1.0 / 60.0,
            ray: HandRayConfig::default(),
        }
    }
}

/// Tracking state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    NotTracked,
    Tracked,
}

// ── Hand ───────────────────────────────────────────────────

/// One articulated hand, created when the hand appears and dropped when it
/// goes away.
#[derive(Debug)]
pub struct SimpleHand {
    handedness: Handedness,
    enabled: bool,
    position_available: bool,
    rotation_available: bool,
    joints: JointPoseTable,
    interactions: InteractionMappingTable,
    classifier: GestureClassifier,
    pointer: PointerSynthesizer,
    state: Option<PointerState>,
}

impl SimpleHand {
    pub fn new(handedness: Handedness, config: HandConfig) -> Self {
        info!(
            "hand created: {} (enabled: {})",
            handedness.as_str(),
            config.enabled
        );
        let pointer = PointerSynthesizer::new(
            handedness,
            HandRay::new(config.ray),
            config.nominal_frame_interval_s,
        );
        Self {
            handedness,
            enabled: config.enabled,
            position_available: false,
            rotation_available: false,
            joints: JointPoseTable::new(),
            interactions: InteractionMappingTable::default(),
            classifier: GestureClassifier,
            pointer,
            state: None,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("hand {}: enabled {}", self.handedness.as_str(), enabled);
        }
        self.enabled = enabled;
    }

    pub fn is_position_available(&self) -> bool {
        self.position_available
    }

    pub fn is_rotation_available(&self) -> bool {
        self.rotation_available
    }

    pub fn tracking_state(&self) -> TrackingState {
        if self.position_available {
            TrackingState::Tracked
        } else {
            TrackingState::NotTracked
        }
    }

    /// Articulated hands always aim.
    pub fn is_in_pointing_pose(&self) -> bool {
        true
    }

    /// Latest pose of `joint`, or `None` before the first enabled update.
    pub fn get(&self, joint: JointId) -> Option<JointPose> {
        self.joints.get(joint)
    }

    pub fn joints(&self) -> &JointPoseTable {
        &self.joints
    }

    pub fn interactions(&self) -> &InteractionMappingTable {
        &self.interactions
    }

    /// Poses and select state from the last enabled frame.
    pub fn pointer_state(&self) -> Option<&PointerState> {
        self.state.as_ref()
    }

    /// Run the pipeline for one frame.
    ///
    /// A malformed frame is rejected before any state changes.  A disabled
    /// hand returns `Ok(())` without looking at the frame.
    pub fn update(
        &mut self,
        frame: &HandFrame,
        services: &mut FrameServices<'_>,
    ) -> Result<(), FrameError> {
        if !self.enabled {
            trace!("hand {}: disabled, frame ignored", self.handedness.as_str());
            return Ok(());
        }

        if let Err(e) = frame.validate() {
            debug!("hand {}: rejected frame: {}", self.handedness.as_str(), e);
            return Err(e);
        }

        if self.position_available != frame.hand_available {
            debug!(
                "hand {}: available {}",
                self.handedness.as_str(),
                frame.hand_available
            );
        }
        self.position_available = frame.hand_available;
        self.rotation_available = frame.hand_available;

        self.joints.update(frame);

        let is_selecting = self.classifier.classify(&self.joints, frame);
        let head = services.reference.reference_pose();
        let state = PointerState {
            is_selecting,
            ..self.pointer.synthesize(&self.joints, frame, &head)
        };

        services
            .events
            .source_pose_changed(self.handedness, &state.pointer_pose);
        services.events.joints_updated(self.handedness, &self.joints);
        services
            .velocity
            .update_velocity(self.handedness, &state.pointer_pose);

        for update in self.interactions.apply(&state) {
            if !update.changed {
                continue;
            }
            let input = update.mapping.input_type;
            let action = update.mapping.action;
            match update.current {
                SlotValue::Pose(pose) => {
                    services
                        .events
                        .pose_input_changed(self.handedness, input, action, &pose);
                }
                SlotValue::Bool(true) => {
                    services.events.input_down(self.handedness, input, action);
                }
                SlotValue::Bool(false) => {
                    services.events.input_up(self.handedness, input, action);
                }
            }
        }

        trace!(
            "hand {}: selecting {} direct {}",
            self.handedness.as_str(),
            is_selecting,
            frame.direct_tracking_available
        );
        self.state = Some(state);
        Ok(())
    }

    /// Generate s-expression for status output.
    pub fn status_sexp(&self) -> String {
        let flag = |b: bool| if b { "t" } else { "nil" };
        let selecting = self
            .interactions
            .slot(DeviceInputType::Select)
            .and_then(|s| s.value().as_bool())
            .unwrap_or(false);
        format!(
            "(:hand {} :enabled {} :position-available {} :rotation-available {} :selecting {} :joints {})",
            self.handedness.as_str(),
            flag(self.enabled),
            flag(self.position_available),
            flag(self.rotation_available),
            flag(selecting),
            self.joints.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::events::{HandEvent, NullSink, RecordingSink};
    use crate::hand::frame::test_frame;
    use crate::hand::joints::{test_joint, test_joints, JOINT_COUNT};
    use glam::{Quat, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn head() -> Pose {
        Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::IDENTITY)
    }

    fn pinch_frame(index_z: f32) -> HandFrame {
        let mut joints = test_joints();
        joints[JointId::ThumbTip.index()] = test_joint(0.0, 0.0, 0.0);
        joints[JointId::IndexTip.index()] = test_joint(0.0, 0.0, index_z);
        test_frame(joints)
    }

    fn direct_frame(pose: Pose, selected: bool) -> HandFrame {
        let mut frame = test_frame(test_joints());
        frame.direct_tracking_available = true;
        frame.controller_pose = Some(pose);
        frame.selected = selected;
        frame
    }

    fn run(hand: &mut SimpleHand, frame: &HandFrame) -> Result<Vec<HandEvent>, FrameError> {
        let reference = head();
        let mut velocity = NoVelocity;
        let mut sink = RecordingSink::new();
        let mut services = FrameServices::new(&reference, &mut velocity, &mut sink);
        hand.update(frame, &mut services)?;
        Ok(sink.events)
    }

    fn bool_events(events: &[HandEvent]) -> Vec<(&'static str, DeviceInputType)> {
        events
            .iter()
            .filter_map(|e| match e {
                HandEvent::InputDown { input, .. } => Some(("down", *input)),
                HandEvent::InputUp { input, .. } => Some(("up", *input)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_hand() {
        let hand = SimpleHand::new(Handedness::Left, HandConfig::default());
        assert!(hand.is_enabled());
        assert!(!hand.is_position_available());
        assert_eq!(hand.tracking_state(), TrackingState::NotTracked);
        assert!(hand.is_in_pointing_pose());
        assert!(hand.pointer_state().is_none());
        assert!(hand.get(JointId::Wrist).is_none());
    }

    #[test]
    fn test_direct_tracking_scenario() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        let p = Pose::new(Vec3::new(0.2, 1.3, 0.4), Quat::from_rotation_y(0.3));
        let events = run(&mut hand, &direct_frame(p, true)).unwrap();

        let state = hand.pointer_state().unwrap();
        assert_eq!(state.pointer_pose, p);
        assert_eq!(state.grip_pose, p);
        assert!(state.is_selecting);
        assert_eq!(
            bool_events(&events),
            vec![
                ("down", DeviceInputType::Select),
                ("down", DeviceInputType::TriggerPress)
            ]
        );
        assert_eq!(events[0], HandEvent::SourcePoseChanged { hand: Handedness::Right, pose: p });
    }

    #[test]
    fn test_pinch_scenarios() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        run(&mut hand, &pinch_frame(0.03)).unwrap();
        assert!(hand.pointer_state().unwrap().is_selecting);

        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        run(&mut hand, &pinch_frame(0.05)).unwrap();
        assert!(!hand.pointer_state().unwrap().is_selecting);
    }

    #[test]
    fn test_disabled_hand_is_frozen() {
        let mut hand = SimpleHand::new(Handedness::Left, HandConfig::default());
        run(&mut hand, &pinch_frame(0.03)).unwrap();
        let before: Vec<_> = JointId::ALL.iter().map(|j| hand.get(*j)).collect();

        hand.set_enabled(false);
        let mut moved = pinch_frame(0.5);
        moved.joints = (0..JOINT_COUNT).map(|_| test_joint(9.0, 9.0, 9.0)).collect();
        let events = run(&mut hand, &moved).unwrap();

        assert!(events.is_empty());
        let after: Vec<_> = JointId::ALL.iter().map(|j| hand.get(*j)).collect();
        assert_eq!(before, after);
        assert!(hand.pointer_state().unwrap().is_selecting);
    }

    #[test]
    fn test_disabled_ignores_malformed_frames() {
        let mut config = HandConfig::default();
        config.enabled = false;
        let mut hand = SimpleHand::new(Handedness::Left, config);
        assert!(run(&mut hand, &test_frame(vec![])).unwrap().is_empty());
        assert!(hand.get(JointId::Wrist).is_none());
    }

    #[test]
    fn test_every_joint_present_after_update() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        let frame = test_frame(test_joints());
        run(&mut hand, &frame).unwrap();
        for joint in JointId::ALL {
            assert_eq!(hand.get(joint), Some(frame.joints[joint.index()]));
        }
        assert_eq!(hand.get(JointId::IndexTip), hand.get(JointId::IndexTip));
    }

    #[test]
    fn test_event_order() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        let events = run(&mut hand, &pinch_frame(0.03)).unwrap();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "source-pose-changed",
                "joints-updated",
                "pose-input-changed",
                "pose-input-changed",
                "input-down",
                "input-down",
                "pose-input-changed",
            ]
        );
        match &events[6] {
            HandEvent::PoseInputChanged { input, .. } => {
                assert_eq!(*input, DeviceInputType::IndexFinger)
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_pose_events_fire_every_frame_slot_events_only_on_change() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        let p = Pose::new(Vec3::new(0.2, 1.3, 0.4), Quat::IDENTITY);
        run(&mut hand, &direct_frame(p, false)).unwrap();
        let events = run(&mut hand, &direct_frame(p, false)).unwrap();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["source-pose-changed", "joints-updated"]);
    }

    #[test]
    fn test_select_edges() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        let p = Pose::IDENTITY;

        let events = run(&mut hand, &direct_frame(p, false)).unwrap();
        assert!(bool_events(&events).is_empty());

        let events = run(&mut hand, &direct_frame(p, true)).unwrap();
        assert_eq!(
            bool_events(&events),
            vec![
                ("down", DeviceInputType::Select),
                ("down", DeviceInputType::TriggerPress)
            ]
        );

        let events = run(&mut hand, &direct_frame(p, true)).unwrap();
        assert!(bool_events(&events).is_empty());

        let events = run(&mut hand, &direct_frame(p, false)).unwrap();
        assert_eq!(
            bool_events(&events),
            vec![
                ("up", DeviceInputType::Select),
                ("up", DeviceInputType::TriggerPress)
            ]
        );
    }

    #[test]
    fn test_rejects_short_frame_without_changes() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        run(&mut hand, &pinch_frame(0.03)).unwrap();
        let before = hand.get(JointId::Wrist);

        let mut short = pinch_frame(0.5);
        short.joints.truncate(24);
        short.hand_available = false;
        let err = run(&mut hand, &short).unwrap_err();
        assert_eq!(
            err,
            FrameError::JointCount {
                expected: 25,
                actual: 24
            }
        );
        assert_eq!(hand.get(JointId::Wrist), before);
        assert!(hand.is_position_available());
        assert!(hand.pointer_state().unwrap().is_selecting);
    }

    #[test]
    fn test_rejects_direct_tracking_without_pose() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        let mut frame = test_frame(test_joints());
        frame.direct_tracking_available = true;
        assert_eq!(
            run(&mut hand, &frame).unwrap_err(),
            FrameError::MissingControllerPose
        );
        assert!(hand.get(JointId::Wrist).is_none());
    }

    #[test]
    fn test_unavailable_hand_still_processes() {
        let mut hand = SimpleHand::new(Handedness::Right, HandConfig::default());
        let mut frame = pinch_frame(0.03);
        frame.hand_available = false;
        let events = run(&mut hand, &frame).unwrap();
        assert!(!hand.is_position_available());
        assert!(!hand.is_rotation_available());
        assert_eq!(hand.tracking_state(), TrackingState::NotTracked);
        assert_eq!(hand.joints().len(), JOINT_COUNT);
        assert!(!events.is_empty());

        frame.hand_available = true;
        run(&mut hand, &frame).unwrap();
        assert_eq!(hand.tracking_state(), TrackingState::Tracked);
    }

    #[derive(Clone)]
    struct Log(Rc<RefCell<Vec<&'static str>>>);

    impl VelocityHook for Log {
        fn update_velocity(&mut self, _hand: Handedness, _pointer_pose: &Pose) {
            self.0.borrow_mut().push("velocity");
        }
    }

    impl EventSink for Log {
        fn source_pose_changed(&mut self, _hand: Handedness, _pose: &Pose) {
            self.0.borrow_mut().push("source");
        }
        fn joints_updated(&mut self, _hand: Handedness, _joints: &JointPoseTable) {
            self.0.borrow_mut().push("joints");
        }
        fn pose_input_changed(
            &mut self,
            _hand: Handedness,
            _input: DeviceInputType,
            _action: crate::hand::interaction::InputAction,
            _pose: &Pose,
        ) {
            self.0.borrow_mut().push("pose");
        }
        fn input_down(
            &mut self,
            _hand: Handedness,
            _input: DeviceInputType,
            _action: crate::hand::interaction::InputAction,
        ) {
            self.0.borrow_mut().push("down");
        }
        fn input_up(
            &mut self,
            _hand: Handedness,
            _input: DeviceInputType,
            _action: crate::hand::interaction::InputAction,
        ) {
            self.0.borrow_mut().push("up");
        }
    }

    #[test]
    fn test_velocity_hook_runs_once_after_pose_events() {
        let log = Log(Rc::new(RefCell::new(Vec::new())));
        let mut velocity = log.clone();
        let mut sink = log.clone();
        let reference = head();
        let mut hand = SimpleHand::new(Handedness::Left, HandConfig::default());
        {
            let mut services = FrameServices::new(&reference, &mut velocity, &mut sink);
            hand.update(&pinch_frame(0.5), &mut services).unwrap();
        }
        let entries = log.0.borrow().clone();
        assert_eq!(&entries[..3], &["source", "joints", "velocity"]);
        assert_eq!(entries.iter().filter(|e| **e == "velocity").count(), 1);
    }

    #[test]
    fn test_null_collaborators() {
        let reference = Pose::IDENTITY;
        let mut velocity = NoVelocity;
        let mut sink = NullSink;
        let mut services = FrameServices::new(&reference, &mut velocity, &mut sink);
        let mut hand = SimpleHand::new(Handedness::Left, HandConfig::default());
        assert!(hand.update(&pinch_frame(0.01), &mut services).is_ok());
        assert!(hand.pointer_state().unwrap().is_selecting);
    }

    #[test]
    fn test_status_sexp() {
        let mut hand = SimpleHand::new(Handedness::Left, HandConfig::default());
        let sexp = hand.status_sexp();
        assert!(sexp.contains(":hand left"));
        assert!(sexp.contains(":enabled t"));
        assert!(sexp.contains(":position-available nil"));
        assert!(sexp.contains(":joints 0"));

        run(&mut hand, &pinch_frame(0.03)).unwrap();
        let sexp = hand.status_sexp();
        assert!(sexp.contains(":position-available t"));
        assert!(sexp.contains(":selecting t"));
        assert!(sexp.contains(":joints 25"));
    }

    #[test]
    fn test_config_from_json() {
        let config: HandConfig =
            serde_json::from_str(r#"{"enabled": false, "ray": {"aim_bias_weight": 0.5}}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.ray.aim_bias_weight, 0.5);
        assert_eq!(config.ray.aim_offset, Vec3::new(0.3, -0.4, 0.9));
        assert!((config.nominal_frame_interval_s - 1.0 / 60.0).abs() < 1.0e-6);
    }
}
