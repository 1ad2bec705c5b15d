//! Declarative scenario descriptions.
//!
//! A [`Scenario`] is plain serde data: tuning, gravity bodies and ship specs.
//! [`Scenario::build_world`] turns it into a validated [`World`]; reading the
//! description from disk is left to the caller.
//!
//! # Example
//!
//! ```
//! use flaxos_core::scenario::{Scenario, ShipSpec};
//!
//! let scenario = Scenario {
//!     ships: vec![ShipSpec::new("alpha", 1.0e6), ShipSpec::new("bravo", 2.0e6)],
//!     ..Scenario::default()
//! };
//! let sim = scenario.build_simulation().unwrap();
//! assert_eq!(sim.world().ship_count(), 2);
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::config::{AutopilotTuning, SimConfig};
use crate::entity::{
    Controls, Euler, GravityBody, PhysicsLimits, SensorSuite, Ship, ShipId, Signature,
};
use crate::error::SimError;
use crate::plugins::autopilot::AutopilotParams;
use crate::simulation::Simulation;
use crate::world::World;

fn default_true() -> bool {
    true
}

/// Initial autopilot configuration of a ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutopilotSpec {
    /// Whether the autopilot starts engaged
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Mode name, one of the allowed autopilot modes
    pub mode: String,
    /// Mode parameters (`desired_range_m`, `min_range_m`)
    #[serde(default)]
    pub params: AutopilotParams,
    /// Initial target id
    #[serde(default)]
    pub target: Option<ShipId>,
}

/// Initial state of one ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSpec {
    /// Ship id
    pub id: ShipId,
    /// Team label
    #[serde(default)]
    pub team: String,
    /// Mass (kg)
    pub mass_kg: f64,
    /// Position (km)
    #[serde(default)]
    pub position: DVec3,
    /// Velocity (km/s)
    #[serde(default)]
    pub velocity: DVec3,
    /// Orientation (deg)
    #[serde(default)]
    pub orientation: Euler,
    /// Propulsion caps
    #[serde(default)]
    pub limits: PhysicsLimits,
    /// Sensor suite
    #[serde(default)]
    pub sensors: SensorSuite,
    /// Signature
    #[serde(default)]
    pub signature: Signature,
    /// Initial helm input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm: Option<Controls>,
    /// Initial autopilot configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autopilot: Option<AutopilotSpec>,
}

impl ShipSpec {
    /// A ship at rest at the origin with default capabilities.
    #[must_use]
    pub fn new(id: impl Into<ShipId>, mass_kg: f64) -> Self {
        Self {
            id: id.into(),
            team: String::new(),
            mass_kg,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            orientation: Euler::ZERO,
            limits: PhysicsLimits::default(),
            sensors: SensorSuite::default(),
            signature: Signature::default(),
            helm: None,
            autopilot: None,
        }
    }

    /// Builds a validated ship.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] for invalid mass, caps or
    /// kinematics, or [`SimError::InvalidMode`] for an unknown autopilot mode.
    pub fn build(&self, tuning: &AutopilotTuning) -> Result<Ship, SimError> {
        let mut ship = Ship::new(self.id.clone(), self.mass_kg)?
            .with_team(self.team.clone())
            .with_position(self.position)
            .with_velocity(self.velocity)
            .with_orientation(self.orientation)
            .with_limits(self.limits)
            .with_sensors(self.sensors)
            .with_signature(self.signature);
        ship.validate()?;

        if let Some(helm) = &self.helm {
            ship.set_helm_input(helm.thrust_vector, helm.rotation_rate_deg_s, helm.mode.clone());
        }
        if let Some(autopilot) = &self.autopilot {
            ship.set_autopilot_mode(autopilot.enabled, &autopilot.mode, &autopilot.params, tuning)?;
            ship.set_target(autopilot.target.clone());
        }
        Ok(ship)
    }
}

/// A complete starting setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// World tuning
    pub config: SimConfig,
    /// Gravity sources
    pub gravity_bodies: Vec<GravityBody>,
    /// Ships
    pub ships: Vec<ShipSpec>,
}

impl Scenario {
    /// Builds a validated world at time zero.
    ///
    /// # Errors
    ///
    /// Returns the first error from config, gravity body or ship validation,
    /// or [`SimError::DuplicateShip`] for a repeated id.
    pub fn build_world(&self) -> Result<World, SimError> {
        let mut world = World::new(self.config)?;
        for body in &self.gravity_bodies {
            world.add_gravity_body(body.clone())?;
        }
        for spec in &self.ships {
            world.add_ship(spec.build(&self.config.autopilot)?)?;
        }
        Ok(world)
    }

    /// Builds a simulation over [`Scenario::build_world`].
    ///
    /// # Errors
    ///
    /// See [`Scenario::build_world`].
    pub fn build_simulation(&self) -> Result<Simulation, SimError> {
        self.build_world().map(Simulation::from_world)
    }
}
