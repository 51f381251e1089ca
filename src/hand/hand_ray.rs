//! Hand ray: a stabilized aiming ray for hands without a 6-DoF pose.
//!
//! The ray starts at the pinch point and points away from an estimated
//! shoulder, biased toward a fixed head-relative aim direction.  Origin
//! and direction are smoothed with exponential half-life filters so the
//! pointer does not jitter with noisy joints.
//!
//! Conventions: +Y is up and +Z is forward in the head's local frame.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::joints::{Handedness, Pose};

/// Squared length under which a direction is treated as undefined.
const MIN_DIRECTION_LENGTH_SQ: f32 = 1.0e-8;

// ── Config ─────────────────────────────────────────────────

/// Tuning for the hand ray.  Lateral (x) offsets are given for the right
/// hand and mirrored for the left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandRayConfig {
    /// Head-relative aim bias (right, down, forward).
    pub aim_offset: Vec3,
    /// Neck position relative to the head, in the head's yaw frame (meters).
    pub neck_offset: Vec3,
    /// Lateral distance from neck to shoulder (meters).
    pub shoulder_half_width: f32,
    /// Blend from the shoulder-to-hand direction (0.0) to the aim bias (1.0).
    pub aim_bias_weight: f32,
    /// Half-life (seconds) of the origin filter; 0 disables smoothing.
    pub position_half_life_s: f32,
    /// Half-life (seconds) of the direction filter; 0 disables smoothing.
    pub direction_half_life_s: f32,
}

impl Default for HandRayConfig {
    fn default() -> Self {
        Self {
            aim_offset: Vec3::new(0.3, -0.4, 0.9),
            neck_offset: Vec3::new(0.0, -0.2, -0.05),
            shoulder_half_width: 0.15,
            aim_bias_weight: 0.25,
            position_half_life_s: 0.01,
            direction_half_life_s: 0.05,
        }
    }
}

// ── Ray ────────────────────────────────────────────────────

/// A ray with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Pose at the ray origin looking down the ray.
    pub fn to_pose(&self) -> Pose {
        Pose::new(self.origin, look_rotation(self.direction))
    }
}

/// Rotation whose +Z axis points along `direction` with +Y kept as close to
/// world up as possible.  A vertical direction falls back to world forward
/// as the up reference.
pub fn look_rotation(direction: Vec3) -> Quat {
    let forward = match direction.try_normalize() {
        Some(f) => f,
        None => return Quat::IDENTITY,
    };
    let mut right = Vec3::Y.cross(forward);
    if right.length_squared() < MIN_DIRECTION_LENGTH_SQ {
        right = Vec3::Z.cross(forward);
    }
    let right = right.normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Move `source` toward `goal` so that half the gap closes every `half_life`.
fn smooth_factor(dt: f32, half_life: f32) -> f32 {
    if half_life <= 0.0 {
        return 1.0;
    }
    1.0 - 0.5_f32.powf(dt.max(0.0) / half_life)
}

// ── Stabilizer ─────────────────────────────────────────────

/// Exponentially smoothed ray.  The first sample is taken verbatim.
#[derive(Debug, Clone, Default)]
pub struct StabilizedRay {
    position_half_life: f32,
    direction_half_life: f32,
    current: Option<Ray>,
}

impl StabilizedRay {
    pub fn new(position_half_life: f32, direction_half_life: f32) -> Self {
        Self {
            position_half_life,
            direction_half_life,
            current: None,
        }
    }

    /// Fold in a measured ray taken `dt` seconds after the previous one.
    pub fn add_sample(&mut self, sample: Ray, dt: f32) -> Ray {
        let next = match self.current {
            None => sample,
            Some(prev) => {
                let pos_t = smooth_factor(dt, self.position_half_life);
                let dir_t = smooth_factor(dt, self.direction_half_life);
                let direction = prev
                    .direction
                    .lerp(sample.direction, dir_t)
                    .try_normalize()
                    .unwrap_or(sample.direction);
                Ray {
                    origin: prev.origin.lerp(sample.origin, pos_t),
                    direction,
                }
            }
        };
        self.current = Some(next);
        next
    }

    pub fn current(&self) -> Option<Ray> {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

// ── Hand ray ───────────────────────────────────────────────

/// Synthesizes an aiming ray from a hand position and the head pose.
#[derive(Debug, Clone)]
pub struct HandRay {
    config: HandRayConfig,
    stabilizer: StabilizedRay,
}

impl HandRay {
    pub fn new(config: HandRayConfig) -> Self {
        let stabilizer =
            StabilizedRay::new(config.position_half_life_s, config.direction_half_life_s);
        Self { config, stabilizer }
    }

    /// Latest stabilized ray, if any sample has been taken since the last reset.
    pub fn ray(&self) -> Option<Ray> {
        self.stabilizer.current()
    }

    /// Forget smoothing history so the next sample is taken verbatim.
    pub fn reset(&mut self) {
        self.stabilizer.reset();
    }

    /// Estimated shoulder position for `hand`, following head yaw only.
    pub fn shoulder_position(&self, head: &Pose, hand: Handedness) -> Vec3 {
        let yaw = yaw_rotation(head.rotation);
        let neck = head.position + yaw * self.config.neck_offset;
        neck + yaw * Vec3::new(hand.lateral_sign() * self.config.shoulder_half_width, 0.0, 0.0)
    }

    /// World-space aim bias for `hand`.
    pub fn aim_bias(&self, head: &Pose, hand: Handedness) -> Vec3 {
        let offset = self.config.aim_offset;
        let local = Vec3::new(hand.lateral_sign() * offset.x, offset.y, offset.z);
        (head.rotation * local).normalize_or_zero()
    }

    /// Take a new measurement at `hand_position` and return the stabilized ray.
    pub fn update(&mut self, hand_position: Vec3, head: &Pose, hand: Handedness, dt: f32) -> Ray {
        let measured = (hand_position - self.shoulder_position(head, hand)).normalize_or_zero();
        let bias = self.aim_bias(head, hand);
        let candidate = measured.lerp(bias, self.config.aim_bias_weight.clamp(0.0, 1.0));

        let direction = if candidate.length_squared() < MIN_DIRECTION_LENGTH_SQ {
            // Hand on the shoulder pivot, or measurement and bias cancel out.
            self.ray()
                .map(|r| r.direction)
                .or_else(|| bias.try_normalize())
                .unwrap_or(head.rotation * Vec3::Z)
        } else {
            candidate.normalize()
        };

        let sample = Ray {
            origin: hand_position,
            direction,
        };
        if !sample.origin.is_finite() || !sample.direction.is_finite() {
            // A non-finite sample would stick in the filter; hold the last ray.
            trace!("hand ray {:?}: dropped non-finite sample", hand);
            return self.ray().unwrap_or(Ray {
                origin: head.position,
                direction: head.rotation * Vec3::Z,
            });
        }

        let ray = self.stabilizer.add_sample(sample, dt);
        trace!(
            "hand ray {:?}: origin {:?} direction {:?}",
            hand,
            ray.origin,
            ray.direction
        );
        ray
    }
}

impl Default for HandRay {
    fn default() -> Self {
        Self::new(HandRayConfig::default())
    }
}

/// Heading-only part of `rotation` (rotation about world up).
fn yaw_rotation(rotation: Quat) -> Quat {
    let forward = rotation * Vec3::Z;
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    if flat.length_squared() < MIN_DIRECTION_LENGTH_SQ {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y(flat.x.atan2(flat.z))
}
