//! Ship entities and the gravity bodies they move among.
//!
//! This module provides:
//! - [`ShipId`]: unique string identifier of a ship
//! - [`Ship`]: the mutable per-ship state owned by the world
//! - [`GravityBody`]: immutable point-mass gravity source
//! - component structs in [`components`]
//!
//! # Architecture
//!
//! A ship is a flat bag of components. Mass and identity are fixed at
//! construction; everything else is public and mutated by the integrator,
//! the autopilot and the command operations. Commands never fail on numeric
//! range: thrust and rotation inputs are clamped on the way in.
//!
//! # Example
//!
//! ```
//! use flaxos_core::entity::{Ship, ShipId};
//! use flaxos_core::entity::components::Euler;
//! use glam::DVec3;
//!
//! let mut ship = Ship::new("alpha", 1.0e6).unwrap();
//! ship.set_helm_input(DVec3::new(0.0, 0.0, 3.0), Euler::new(25.0, 0.0, 0.0), None);
//!
//! assert_eq!(ship.id(), &ShipId::from("alpha"));
//! assert_eq!(ship.helm.thrust_vector.z, 1.0);
//! assert_eq!(ship.helm.rotation_rate_deg_s.yaw, 10.0);
//! ```

pub mod components;
mod gravity;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::AutopilotTuning;
use crate::error::{require_positive, SimError};
use crate::math;
use crate::plugins::autopilot::{AutopilotMode, AutopilotParams, AutopilotState};

pub use components::{
    Controls, Euler, Kinematics, PhysicsLimits, SensorProfile, SensorSuite, Signature,
};
pub use gravity::GravityBody;

// =============================================================================
// ShipId
// =============================================================================

/// Unique identifier for a ship.
///
/// Ids order lexicographically, which fixes the iteration order of every
/// per-tick pass over the world.
///
/// # Example
///
/// ```
/// use flaxos_core::entity::ShipId;
///
/// let a = ShipId::from("alpha");
/// let b = ShipId::from("bravo");
///
/// assert!(a < b);
/// assert_eq!(a.as_str(), "alpha");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(String);

impl ShipId {
    /// Creates a new `ShipId`.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier text
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShipId({})", self.0)
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShipId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ShipId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ShipId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Ship
// =============================================================================

/// A ship in the simulation.
///
/// `helm` holds the last manual input set by a command; `controls` holds what
/// the integrator actually applied on the most recent tick (helm input or
/// autopilot output).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ship {
    id: ShipId,
    /// Team or faction label
    pub team: String,
    mass_kg: f64,
    /// Position, velocity and orientation
    pub kinematics: Kinematics,
    /// Manual helm input
    pub helm: Controls,
    /// Controls applied on the last tick
    pub controls: Controls,
    /// Propulsion and attitude caps
    pub limits: PhysicsLimits,
    /// Sensor capability
    pub sensors: SensorSuite,
    /// Visibility to other ships' sensors
    pub signature: Signature,
    /// Autopilot configuration
    pub autopilot: AutopilotState,
}

impl Ship {
    /// Creates a ship at rest at the origin with default capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if `mass_kg` is not finite and
    /// positive.
    pub fn new(id: impl Into<ShipId>, mass_kg: f64) -> Result<Self, SimError> {
        let id = id.into();
        require_positive(&format!("ship '{id}'"), "mass_kg", mass_kg)?;
        Ok(Self {
            id,
            team: String::new(),
            mass_kg,
            kinematics: Kinematics::default(),
            helm: Controls::default(),
            controls: Controls::default(),
            limits: PhysicsLimits::default(),
            sensors: SensorSuite::default(),
            signature: Signature::default(),
            autopilot: AutopilotState::default(),
        })
    }

    /// Sets the team label.
    #[must_use]
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    /// Sets the position (km).
    #[must_use]
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.kinematics.position = position;
        self
    }

    /// Sets the velocity (km/s).
    #[must_use]
    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.kinematics.velocity = velocity;
        self
    }

    /// Sets the orientation (deg).
    #[must_use]
    pub fn with_orientation(mut self, orientation: Euler) -> Self {
        self.kinematics.orientation = orientation;
        self
    }

    /// Replaces the propulsion caps.
    #[must_use]
    pub fn with_limits(mut self, limits: PhysicsLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the sensor suite.
    #[must_use]
    pub fn with_sensors(mut self, sensors: SensorSuite) -> Self {
        self.sensors = sensors;
        self
    }

    /// Replaces the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Returns the ship's id.
    #[must_use]
    pub fn id(&self) -> &ShipId {
        &self.id
    }

    /// Returns the ship's mass (kg). Mass never changes after construction.
    #[must_use]
    pub fn mass_kg(&self) -> f64 {
        self.mass_kg
    }

    /// Speed magnitude (km/s).
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.kinematics.speed()
    }

    /// Acceleration produced by full main-engine thrust.
    #[must_use]
    pub fn max_thrust_acceleration(&self) -> f64 {
        self.limits.max_main_thrust_newton / self.mass_kg
    }

    /// Re-checks everything the integrator relies on.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] for non-finite kinematics or any
    /// invalid capability value.
    pub fn validate(&self) -> Result<(), SimError> {
        let subject = format!("ship '{}'", self.id);
        require_positive(&subject, "mass_kg", self.mass_kg)?;
        self.limits.validate(&subject)?;
        self.sensors.validate(&subject)?;
        self.signature.validate(&subject)?;
        let k = &self.kinematics;
        if !k.position.is_finite() || !k.velocity.is_finite() || !k.orientation.is_finite() {
            return Err(SimError::configuration(subject, "kinematics must be finite"));
        }
        Ok(())
    }

    /// Stores manual helm input.
    ///
    /// Thrust is clamped per component into `[-1, 1]` (non-finite becomes 0)
    /// and each rotation rate is clamped to its cap. Always succeeds.
    ///
    /// # Arguments
    ///
    /// * `thrust` - Ship-local thrust command
    /// * `rates` - Desired rotation rates (deg/s)
    /// * `mode_hint` - Free-form tag stored alongside the input
    pub fn set_helm_input(&mut self, thrust: DVec3, rates: Euler, mode_hint: Option<String>) -> &Controls {
        self.helm = Controls {
            thrust_vector: math::clamp_thrust(thrust),
            rotation_rate_deg_s: rates.clamped_to(self.limits.rcs_caps()),
            mode: mode_hint,
        };
        &self.helm
    }

    /// Selects an autopilot mode by name.
    ///
    /// `params` is only consulted for `chase_target` (`desired_range_m`,
    /// `min_range_m`). On error the previous autopilot state is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMode`] if `mode` is not one of the four
    /// allowed names.
    pub fn set_autopilot_mode(
        &mut self,
        enabled: bool,
        mode: &str,
        params: &AutopilotParams,
        tuning: &AutopilotTuning,
    ) -> Result<AutopilotState, SimError> {
        let mode = AutopilotMode::parse(mode, params, tuning)?;
        Ok(self.set_autopilot(enabled, mode).clone())
    }

    /// Selects an already-typed autopilot mode.
    pub fn set_autopilot(&mut self, enabled: bool, mode: AutopilotMode) -> &AutopilotState {
        debug!(ship = %self.id, enabled, mode = mode.name(), "autopilot mode set");
        self.autopilot.enabled = enabled;
        self.autopilot.mode = mode;
        &self.autopilot
    }

    /// Stores the autopilot target id without checking it exists.
    pub fn set_target(&mut self, target: Option<ShipId>) {
        self.autopilot.current_target_id = target;
    }
}

// =============================================================================
// Tests
// =============================================================================
