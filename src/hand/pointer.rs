//! Pointer, grip and index-finger poses for one hand.
//!
//! Directly tracked hands use the device pose for both pointer and grip.
//! Joints-only hands grip at the wrist and aim with a [`HandRay`] from
//! the pinch point.

use super::frame::HandFrame;
use super::hand_ray::HandRay;
use super::joints::{Handedness, JointId, JointPoseTable, Pose};

/// Everything the interaction mappings consume for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Aiming pose.
    pub pointer_pose: Pose,
    /// Grab/hold pose.
    pub grip_pose: Pose,
    /// Index fingertip, copied from the joint table.
    pub index_tip_pose: Pose,
    pub is_selecting: bool,
}

/// Produces the poses of a [`PointerState`] for one hand, frame after frame.
#[derive(Debug, Clone)]
pub struct PointerSynthesizer {
    handedness: Handedness,
    hand_ray: HandRay,
    nominal_frame_interval_s: f32,
}

impl PointerSynthesizer {
    pub fn new(handedness: Handedness, hand_ray: HandRay, nominal_frame_interval_s: f32) -> Self {
        Self {
            handedness,
            hand_ray,
            nominal_frame_interval_s,
        }
    }

    pub fn hand_ray(&self) -> &HandRay {
        &self.hand_ray
    }

    /// Derive this frame's poses.  `table` must already hold the frame's
    /// joints; `is_selecting` is left `false` for the caller to fill in.
    pub fn synthesize(
        &mut self,
        table: &JointPoseTable,
        frame: &HandFrame,
        head: &Pose,
    ) -> PointerState {
        let index_tip = table.get(JointId::IndexTip).unwrap_or_default();

        if let Some(controller) = frame.direct_pose() {
            // Next joints-only frame starts unsmoothed.
            self.hand_ray.reset();
            return PointerState {
                pointer_pose: controller,
                grip_pose: controller,
                index_tip_pose: index_tip,
                is_selecting: false,
            };
        }

        let grip = table.get(JointId::Wrist).unwrap_or_default();
        let thumb_tip = table.get(JointId::ThumbTip).unwrap_or_default();
        let origin = (thumb_tip.position + index_tip.position) * 0.5;
        let dt = frame
            .delta_seconds
            .filter(|dt| *dt > 0.0)
            .unwrap_or(self.nominal_frame_interval_s);

        let ray = self.hand_ray.update(origin, head, self.handedness, dt);
        PointerState {
            pointer_pose: ray.to_pose(),
            grip_pose: grip,
            index_tip_pose: index_tip,
            is_selecting: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::frame::test_frame;
    use crate::hand::joints::{test_joint, test_joints};
    use glam::{Quat, Vec3};

    fn synthesizer() -> PointerSynthesizer {
        PointerSynthesizer::new(Handedness::Right, HandRay::default(), 1.0 / 60.0)
    }

    fn head() -> Pose {
        Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::IDENTITY)
    }

    fn joints_frame() -> HandFrame {
        let mut joints = test_joints();
        joints[JointId::Wrist.index()] = test_joint(0.2, 1.1, 0.3);
        joints[JointId::ThumbTip.index()] = test_joint(0.24, 1.2, 0.4);
        joints[JointId::IndexTip.index()] = test_joint(0.26, 1.2, 0.42);
        test_frame(joints)
    }

    fn run(synth: &mut PointerSynthesizer, frame: &HandFrame) -> PointerState {
        let mut table = JointPoseTable::new();
        table.update(frame);
        synth.synthesize(&table, frame, &head())
    }

    #[test]
    fn test_direct_tracking_copies_controller_pose() {
        let controller = Pose::new(Vec3::new(0.1, 1.3, 0.5), Quat::from_rotation_y(0.7));
        let mut frame = joints_frame();
        frame.direct_tracking_available = true;
        frame.controller_pose = Some(controller);

        let poses = run(&mut synthesizer(), &frame);
        assert_eq!(poses.pointer_pose, controller);
        assert_eq!(poses.grip_pose, controller);
    }

    #[test]
    fn test_joints_only_grip_is_wrist() {
        let frame = joints_frame();
        let poses = run(&mut synthesizer(), &frame);
        assert_eq!(poses.grip_pose, frame.joints[JointId::Wrist.index()]);
    }

    #[test]
    fn test_joints_only_pointer_starts_at_pinch_midpoint() {
        let poses = run(&mut synthesizer(), &joints_frame());
        assert!((poses.pointer_pose.position - Vec3::new(0.25, 1.2, 0.41)).length() < 1.0e-5);
        // Aims forward, away from the body.
        assert!((poses.pointer_pose.rotation * Vec3::Z).z > 0.0);
    }

    #[test]
    fn test_index_tip_is_verbatim() {
        let frame = joints_frame();
        let expected = frame.joints[JointId::IndexTip.index()];
        assert_eq!(run(&mut synthesizer(), &frame).index_tip_pose, expected);

        let mut direct = joints_frame();
        direct.direct_tracking_available = true;
        direct.controller_pose = Some(Pose::IDENTITY);
        assert_eq!(run(&mut synthesizer(), &direct).index_tip_pose, expected);
    }

    #[test]
    fn test_direct_tracking_resets_hand_ray() {
        let mut synth = synthesizer();
        run(&mut synth, &joints_frame());
        assert!(synth.hand_ray().ray().is_some());

        let mut direct = joints_frame();
        direct.direct_tracking_available = true;
        direct.controller_pose = Some(Pose::IDENTITY);
        run(&mut synth, &direct);
        assert!(synth.hand_ray().ray().is_none());
    }

    #[test]
    fn test_controller_pose_ignored_without_direct_tracking() {
        let mut frame = joints_frame();
        frame.controller_pose = Some(Pose::new(Vec3::splat(9.0), Quat::IDENTITY));
        let poses = run(&mut synthesizer(), &frame);
        assert_ne!(poses.grip_pose.position, Vec3::splat(9.0));
        assert_ne!(poses.pointer_pose.position, Vec3::splat(9.0));
    }

    #[test]
    fn test_synthesize_leaves_selection_to_caller() {
        let mut frame = joints_frame();
        frame.direct_tracking_available = true;
        frame.controller_pose = Some(Pose::IDENTITY);
        frame.selected = true;
        assert!(!run(&mut synthesizer(), &frame).is_selecting);
    }
}
