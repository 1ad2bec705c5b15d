//! Per-ship control and sensing systems.
//!
//! - [`autopilot`]: the mode state machine that synthesizes control inputs in
//!   place of manual helm input
//! - [`sensor`]: range/field-of-view detection, contact memory and contact
//!   events
//!
//! # Architecture
//!
//! Both systems read the ship they serve plus a read-only
//! [`WorldView`](crate::world_view::WorldView) of everything else. The
//! autopilot runs inside the parallel per-ship phase of a tick and touches
//! only its own ship. The sensor engine runs afterwards, sequentially in ship
//! id order, because it appends to the shared event log.

pub mod autopilot;
pub mod sensor;

pub use autopilot::{AutopilotMode, AutopilotOutput, AutopilotParams, AutopilotState, ChaseParams};
pub use sensor::{Contact, SensorEngine, SensorMode};
