//! # Flaxos Core
//!
//! Multi-ship 3D space simulation core.
//!
//! This crate advances the kinematic and control state of independently
//! controlled ships in a shared space, one externally timed tick at a time,
//! and produces a sensor contact picture plus an event log for clients.
//!
//! ## Architecture
//!
//! - **Entities**: ships and gravity bodies ([`entity`])
//! - **Plugins**: per-ship systems, the autopilot and the sensors ([`plugins`])
//! - **Resolvers**: the physics integrator and the event log ([`resolver`])
//! - **World**: registry, clock and command operations ([`world`])
//! - **Simulation**: the tick orchestrator ([`simulation`])
//!
//! A tick runs autopilot then physics for every ship in parallel, then each
//! ship's passive sensor sweep sequentially in id order.
//!
//! ## Usage
//!
//! ```
//! use flaxos_core::prelude::*;
//! use glam::DVec3;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//! let world = sim.world_mut();
//! world.add_ship(Ship::new("alpha", 1.0e6).unwrap()).unwrap();
//! world
//!     .add_ship(Ship::new("bravo", 1.0e6).unwrap().with_position(DVec3::new(0.0, 0.0, 20.0)))
//!     .unwrap();
//!
//! let alpha = ShipId::from("alpha");
//! world.set_autopilot_mode(&alpha, true, "chase_target", &AutopilotParams::new()).unwrap();
//! world.set_target(&alpha, Some(ShipId::from("bravo"))).unwrap();
//!
//! let report = sim.step(1.0);
//! assert!(report.is_clean());
//! assert_eq!(sim.world().drain_events(0.0).len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod entity;
pub mod error;
pub mod math;
pub mod output;
pub mod plugins;
pub mod resolver;
pub mod scenario;
pub mod simulation;
pub mod world;
pub mod world_view;

#[cfg(test)]
mod tests;

pub use config::SimConfig;
pub use entity::{GravityBody, Ship, ShipId};
pub use error::SimError;
pub use output::{Event, EventKind};
pub use simulation::{advance_ship, Simulation, TickReport};
pub use world::World;

/// Common imports for driving a simulation.
pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::entity::components::{Controls, Euler};
    pub use crate::entity::{GravityBody, Ship, ShipId};
    pub use crate::error::SimError;
    pub use crate::output::{Event, EventKind};
    pub use crate::plugins::autopilot::{AutopilotMode, AutopilotParams};
    pub use crate::plugins::sensor::{Contact, SensorMode};
    pub use crate::scenario::Scenario;
    pub use crate::simulation::{Simulation, TickReport};
    pub use crate::world::World;
}
