//! Euler rotations and constant-rate interpolation
//!
//! Every blend in the rig is rate-limited and linear: a rate of `R` per
//! second moves a value by at most `R * dt` toward its target and never
//! overshoots. A `dt` of zero returns the current value untouched.

use std::ops::{Add, Mul, Sub};

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Euler rotation in degrees: pitch about X, yaw about Y, roll about Z.
///
/// Degrees are kept at the API surface so axis-selective edits (inherit
/// pitch/yaw/roll, pitch clamping) stay trivial; conversion to `Quat`
/// happens at the point a full 3D rotation is needed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Rotator = Rotator {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Convert to a quaternion (yaw, then pitch, then roll)
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }

    /// Recover Euler angles from a quaternion
    pub fn from_quat(quat: Quat) -> Self {
        let (yaw, pitch, roll) = quat.to_euler(EulerRot::YXZ);
        Self {
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
            roll: roll.to_degrees(),
        }
    }

    /// Direction this rotation is facing
    pub fn forward(self) -> Vec3 {
        self.to_quat() * -Vec3::Z
    }

    /// Map every component into (-180, 180]
    pub fn normalized(self) -> Self {
        Self {
            pitch: normalize_degrees(self.pitch),
            yaw: normalize_degrees(self.yaw),
            roll: normalize_degrees(self.roll),
        }
    }
}

impl Add for Rotator {
    type Output = Rotator;

    fn add(self, rhs: Rotator) -> Rotator {
        Rotator::new(self.pitch + rhs.pitch, self.yaw + rhs.yaw, self.roll + rhs.roll)
    }
}

impl Sub for Rotator {
    type Output = Rotator;

    fn sub(self, rhs: Rotator) -> Rotator {
        Rotator::new(self.pitch - rhs.pitch, self.yaw - rhs.yaw, self.roll - rhs.roll)
    }
}

impl Mul<f32> for Rotator {
    type Output = Rotator;

    fn mul(self, rhs: f32) -> Rotator {
        Rotator::new(self.pitch * rhs, self.yaw * rhs, self.roll * rhs)
    }
}

/// Wrap an angle in degrees into (-180, 180]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Relative slack on the final step of a constant-rate blend. Repeated
/// `rate * dt` steps accumulate f32 rounding error, so at the boundary tick
/// the remaining delta can sit an ulp or two past the step; without the
/// slack the snap-to-target branch is missed and a residue survives.
const SNAP_TOLERANCE: f32 = 1e-4;

/// Move `current` toward `target` by at most `rate * dt`.
///
/// A non-positive rate snaps straight to the target so a zero-configured
/// speed can never freeze a value permanently.
pub fn finterp_constant_to(current: f32, target: f32, dt: f32, rate: f32) -> f32 {
    if dt <= 0.0 || current == target {
        return current;
    }
    if rate <= 0.0 {
        return target;
    }
    let step = rate * dt;
    let delta = target - current;
    if delta.abs() <= step * (1.0 + SNAP_TOLERANCE) {
        target
    } else {
        current + step * delta.signum()
    }
}

/// Move `current` toward `target` along the straight line by at most `rate * dt`
pub fn vinterp_constant_to(current: Vec3, target: Vec3, dt: f32, rate: f32) -> Vec3 {
    if dt <= 0.0 || current == target {
        return current;
    }
    if rate <= 0.0 {
        return target;
    }
    let step = rate * dt;
    let delta = target - current;
    let distance = delta.length();
    if distance <= step * (1.0 + SNAP_TOLERANCE) {
        target
    } else {
        current + delta * (step / distance)
    }
}

/// Move each component of `current` toward `target` by at most `rate * dt`
/// degrees, taking the short way around on every axis.
pub fn rinterp_constant_to(current: Rotator, target: Rotator, dt: f32, rate: f32) -> Rotator {
    if dt <= 0.0 || current == target {
        return current;
    }
    if rate <= 0.0 {
        return target;
    }
    let step = rate * dt;
    let delta = (target - current).normalized();
    let widest = delta.pitch.abs().max(delta.yaw.abs()).max(delta.roll.abs());
    if widest <= step * (1.0 + SNAP_TOLERANCE) {
        return target.normalized();
    }
    Rotator {
        pitch: current.pitch + clamp_abs(delta.pitch, step),
        yaw: current.yaw + clamp_abs(delta.yaw, step),
        roll: current.roll + clamp_abs(delta.roll, step),
    }
    .normalized()
}

/// Rotate `current` toward `target` by at most `rate_degrees * dt` degrees of
/// arc, along the shortest spherical path.
pub fn qinterp_constant_to(current: Quat, target: Quat, dt: f32, rate_degrees: f32) -> Quat {
    if dt <= 0.0 || current == target {
        return current;
    }
    if rate_degrees <= 0.0 {
        return target;
    }
    let max_angle = (rate_degrees * dt).to_radians();
    let angle = current.angle_between(target);
    if angle <= max_angle * (1.0 + SNAP_TOLERANCE) || angle < 1e-6 {
        target
    } else {
        // glam's slerp already takes the short way when dot < 0
        current.slerp(target, max_angle / angle)
    }
}

fn clamp_abs(value: f32, max_abs: f32) -> f32 {
    value.clamp(-max_abs, max_abs)
}
