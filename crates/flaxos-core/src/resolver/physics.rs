//! Physics integrator for ship kinematics.
//!
//! The `PhysicsIntegrator` advances one ship by one tick:
//! - thrust: applied controls rotated into world axes by the pre-tick orientation
//! - gravity: Newtonian pull summed over every gravity body in reach
//! - velocity then position, semi-implicit Euler
//! - orientation: per-axis rates clamped to RCS caps, angles wrapped
//!
//! # Variable Timestep
//!
//! The tick length is supplied by the caller on every call. A non-positive or
//! non-finite `dt_s` leaves the ship untouched.

use glam::DVec3;
use tracing::trace;

use crate::config::PhysicsTuning;
use crate::entity::{Euler, GravityBody, Ship};
use crate::error::SimError;
use crate::math;

/// Gravitational constant in km^3 kg^-1 s^-2.
pub const G_KM: f64 = 6.674_30e-20;

/// Integrates thrust, gravity and rotation into a ship's kinematics.
///
/// Reads only the ship it advances and the shared gravity bodies, so ships can
/// be advanced in parallel.
///
/// # Example
///
/// ```
/// use flaxos_core::entity::Ship;
/// use flaxos_core::resolver::PhysicsIntegrator;
/// use glam::DVec3;
///
/// let integrator = PhysicsIntegrator::default();
/// let mut ship = Ship::new("alpha", 1.0e6).unwrap();
/// ship.controls.thrust_vector = DVec3::Z;
///
/// integrator.advance(&mut ship, 1.0, &[]).unwrap();
/// assert_eq!(ship.kinematics.velocity, DVec3::new(0.0, 0.0, 1.0));
/// assert_eq!(ship.kinematics.position, DVec3::new(0.0, 0.0, 1.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicsIntegrator {
    tuning: PhysicsTuning,
}

impl PhysicsIntegrator {
    /// Creates an integrator with the given guards.
    #[must_use]
    pub const fn new(tuning: PhysicsTuning) -> Self {
        Self { tuning }
    }

    /// Returns the integrator's guards.
    #[must_use]
    pub const fn tuning(&self) -> &PhysicsTuning {
        &self.tuning
    }

    /// Advances `ship` by `dt_s` seconds using its applied controls.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if the ship fails validation; the
    /// ship is left untouched.
    pub fn advance(
        &self,
        ship: &mut Ship,
        dt_s: f64,
        gravity_bodies: &[GravityBody],
    ) -> Result<(), SimError> {
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Ok(());
        }
        ship.validate()?;

        let accel = Self::thrust_acceleration(ship)
            + self.gravity_acceleration(ship.kinematics.position, gravity_bodies);

        let kinematics = &mut ship.kinematics;
        kinematics.velocity += accel * dt_s;
        kinematics.position += kinematics.velocity * dt_s;

        let rates = ship
            .controls
            .rotation_rate_deg_s
            .clamped_to(ship.limits.rcs_caps());
        let o = kinematics.orientation;
        kinematics.orientation = Euler::new(
            o.yaw + rates.yaw * dt_s,
            o.pitch + rates.pitch * dt_s,
            o.roll + rates.roll * dt_s,
        )
        .wrapped();

        trace!(
            ship = %ship.id(),
            speed = ship.kinematics.speed(),
            "ship advanced"
        );
        Ok(())
    }

    /// World-space thrust acceleration from the ship's applied controls and
    /// current orientation.
    #[must_use]
    pub fn thrust_acceleration(ship: &Ship) -> DVec3 {
        let local = math::clamp_thrust(ship.controls.thrust_vector);
        if local == DVec3::ZERO {
            return DVec3::ZERO;
        }
        ship.kinematics.orientation.rotation() * local * ship.max_thrust_acceleration()
    }

    /// Summed gravitational acceleration at `position`.
    ///
    /// Bodies that are disabled, out of reach, inside the singularity guard, or
    /// have a non-positive or non-finite mass contribute nothing.
    #[must_use]
    pub fn gravity_acceleration(&self, position: DVec3, bodies: &[GravityBody]) -> DVec3 {
        bodies
            .iter()
            .filter(|body| body.mass_kg.is_finite() && body.mass_kg > 0.0)
            .filter_map(|body| {
                let offset = body.position - position;
                let distance = offset.length();
                if !distance.is_finite()
                    || distance < self.tuning.gravity_singularity_km
                    || !body.reaches(distance)
                {
                    return None;
                }
                Some(offset / distance * (G_KM * body.mass_kg / (distance * distance)))
            })
            .fold(DVec3::ZERO, |acc, a| acc + a)
    }
}

// =============================================================================
// Tests
// =============================================================================
