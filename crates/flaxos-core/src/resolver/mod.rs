//! State-advancing machinery owned by the world.
//!
//! - [`PhysicsIntegrator`]: turns applied controls and gravity into new
//!   kinematics
//! - [`EventLog`]: the append-only record of everything the sensors reported
//!
//! # Invariants
//!
//! - The integrator never reads or writes any ship but the one it advances
//! - The integrator never changes a ship's mass
//! - Event ids strictly increase in append order

mod event;
mod physics;

pub use event::EventLog;
pub use physics::{PhysicsIntegrator, G_KM};
