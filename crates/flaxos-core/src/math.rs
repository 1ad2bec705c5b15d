//! Vector and angle helpers shared by the integrator, autopilot and sensors.
//!
//! # Axis Conventions
//!
//! Ship-local axes: +Z is forward (the main engine axis), +Y is up, +X is
//! starboard. Orientation is expressed as yaw/pitch/roll in degrees and maps to
//! the rotation `Ry(yaw) * Rx(-pitch) * Rz(roll)`:
//!
//! - positive yaw swings the nose from +Z toward +X
//! - positive pitch raises the nose toward +Y
//! - roll spins about the forward axis and never moves the nose
//!
//! A zero orientation faces world +Z.

use glam::{DQuat, DVec3};

/// Directions shorter than this are treated as "no direction".
pub const DIRECTION_EPSILON: f64 = 1e-12;

/// Wraps an angle in degrees into `[-180, 180)`.
///
/// # Example
///
/// ```
/// use flaxos_core::math::wrap_deg;
///
/// assert_eq!(wrap_deg(190.0), -170.0);
/// assert_eq!(wrap_deg(-180.0), -180.0);
/// assert_eq!(wrap_deg(180.0), -180.0);
/// ```
#[must_use]
pub fn wrap_deg(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Builds the ship-to-world rotation for a yaw/pitch/roll triple in degrees.
#[must_use]
pub fn rotation_from_euler_deg(yaw: f64, pitch: f64, roll: f64) -> DQuat {
    DQuat::from_rotation_y(yaw.to_radians())
        * DQuat::from_rotation_x(-pitch.to_radians())
        * DQuat::from_rotation_z(roll.to_radians())
}

/// Returns the (yaw, pitch) in degrees that points the forward axis along
/// `direction`, or `None` for a degenerate direction.
///
/// Roll is not determined by a direction and is left to the caller.
#[must_use]
pub fn yaw_pitch_towards(direction: DVec3) -> Option<(f64, f64)> {
    if !direction.is_finite() || direction.length_squared() <= DIRECTION_EPSILON {
        return None;
    }
    let yaw = direction.x.atan2(direction.z).to_degrees();
    let horizontal = direction.x.hypot(direction.z);
    let pitch = direction.y.atan2(horizontal).to_degrees();
    Some((yaw, pitch))
}

/// Angle in degrees between two vectors, in `[0, 180]`.
///
/// Uses `atan2(|a x b|, a . b)`, which stays accurate for nearly parallel
/// vectors where `acos` loses precision. Degenerate inputs give 0.
#[must_use]
pub fn angle_between_deg(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b)).to_degrees()
}

/// Clamps a control component into `[-1, 1]`; non-finite input becomes 0.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Clamps `value` into `[-cap, cap]`; non-finite input becomes 0.
///
/// A negative or non-finite cap is treated as zero authority.
#[must_use]
pub fn clamp_symmetric(value: f64, cap: f64) -> f64 {
    let cap = if cap.is_finite() { cap.abs() } else { 0.0 };
    if value.is_finite() {
        value.clamp(-cap, cap)
    } else {
        0.0
    }
}

/// Clamps each component of a thrust command into `[-1, 1]`.
#[must_use]
pub fn clamp_thrust(thrust: DVec3) -> DVec3 {
    DVec3::new(clamp_unit(thrust.x), clamp_unit(thrust.y), clamp_unit(thrust.z))
}
