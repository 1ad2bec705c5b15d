//! The world: ship registry, clock, sensor memory and event log.
//!
//! `World` owns every piece of mutable simulation state and hosts the command
//! operations a transport layer invokes between ticks. Ships are stored in a
//! `BTreeMap` keyed by [`ShipId`], so every pass over them runs in a stable
//! order.
//!
//! # Example
//!
//! ```
//! use flaxos_core::config::SimConfig;
//! use flaxos_core::entity::{Ship, ShipId};
//! use flaxos_core::world::World;
//!
//! let mut world = World::new(SimConfig::default()).unwrap();
//! world.add_ship(Ship::new("alpha", 1.0e6).unwrap()).unwrap();
//!
//! let id = ShipId::from("alpha");
//! assert!(world.ship(&id).is_some());
//! assert!(world.set_target(&ShipId::from("ghost"), None).is_err());
//! ```

use glam::DVec3;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::SimConfig;
use crate::entity::{Controls, Euler, GravityBody, Kinematics, Ship, ShipId};
use crate::error::SimError;
use crate::output::Event;
use crate::plugins::autopilot::{AutopilotParams, AutopilotState};
use crate::plugins::sensor::{Contact, SensorEngine, SensorMode};
use crate::resolver::EventLog;
use crate::world_view::WorldView;

// =============================================================================
// Snapshots
// =============================================================================

/// Serializable view of one ship for polling clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipSnapshot {
    /// Ship id
    pub id: ShipId,
    /// Team label
    pub team: String,
    /// Mass (kg)
    pub mass_kg: f64,
    /// Position, velocity, orientation
    pub kinematics: Kinematics,
    /// Controls applied on the last tick
    pub controls: Controls,
    /// Autopilot configuration
    pub autopilot: AutopilotState,
    /// Remembered contacts
    pub contacts: Vec<Contact>,
}

// =============================================================================
// World
// =============================================================================

/// All mutable simulation state.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) gravity_bodies: Vec<GravityBody>,
    pub(crate) ships: BTreeMap<ShipId, Ship>,
    pub(crate) sensors: SensorEngine,
    pub(crate) events: EventLog,
    pub(crate) time_s: f64,
    pub(crate) tick: u64,
}

impl World {
    /// Creates an empty world at time zero.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if `config` fails validation.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            gravity_bodies: Vec::new(),
            ships: BTreeMap::new(),
            sensors: SensorEngine::new(config.sensors),
            events: EventLog::new(),
            time_s: 0.0,
            tick: 0,
        })
    }

    /// Returns the world's tuning.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulation time (s).
    #[must_use]
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // -------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------

    /// Adds a gravity body.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if the body fails validation.
    pub fn add_gravity_body(&mut self, body: GravityBody) -> Result<(), SimError> {
        body.validate()?;
        self.gravity_bodies.push(body);
        Ok(())
    }

    /// The gravity bodies every ship is attracted to.
    #[must_use]
    pub fn gravity_bodies(&self) -> &[GravityBody] {
        &self.gravity_bodies
    }

    /// Registers a ship.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DuplicateShip`] if the id is taken, or
    /// [`SimError::Configuration`] if the ship fails validation.
    pub fn add_ship(&mut self, ship: Ship) -> Result<(), SimError> {
        if self.ships.contains_key(ship.id()) {
            return Err(SimError::DuplicateShip(ship.id().clone()));
        }
        ship.validate()?;
        self.ships.insert(ship.id().clone(), ship);
        Ok(())
    }

    /// Removes a ship and forgets its contacts. Other observers report it lost
    /// on their next passive scan.
    pub fn remove_ship(&mut self, id: &ShipId) -> Option<Ship> {
        self.sensors.forget(id);
        self.ships.remove(id)
    }

    /// Looks up a ship.
    #[must_use]
    pub fn ship(&self, id: &ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    /// Looks up a ship for direct mutation.
    pub fn ship_mut(&mut self, id: &ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(id)
    }

    /// Every ship, in id order.
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    /// Number of registered ships.
    #[must_use]
    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    fn require_ship_mut(&mut self, id: &ShipId) -> Result<&mut Ship, SimError> {
        self.ships
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownShip(id.clone()))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Sets a ship's manual helm input, clamped to its caps.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownShip`] if no such ship exists.
    pub fn set_helm_input(
        &mut self,
        id: &ShipId,
        thrust: DVec3,
        rates: Euler,
        mode_hint: Option<String>,
    ) -> Result<Controls, SimError> {
        let ship = self.require_ship_mut(id)?;
        Ok(ship.set_helm_input(thrust, rates, mode_hint).clone())
    }

    /// Selects a ship's autopilot mode by name.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownShip`] if no such ship exists, or
    /// [`SimError::InvalidMode`] for an unknown mode name.
    pub fn set_autopilot_mode(
        &mut self,
        id: &ShipId,
        enabled: bool,
        mode: &str,
        params: &AutopilotParams,
    ) -> Result<AutopilotState, SimError> {
        let tuning = self.config.autopilot;
        let ship = self.require_ship_mut(id)?;
        ship.set_autopilot_mode(enabled, mode, params, &tuning)
    }

    /// Sets a ship's autopilot target. The target id is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownShip`] if the commanded ship does not exist.
    pub fn set_target(&mut self, id: &ShipId, target: Option<ShipId>) -> Result<(), SimError> {
        self.require_ship_mut(id)?.set_target(target);
        Ok(())
    }

    /// Runs an on-demand scan; `mode` is `"active"` or `"passive"`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidSensorMode`] for any other mode string, or
    /// [`SimError::UnknownShip`] if no such ship exists.
    pub fn scan(&mut self, id: &ShipId, mode: &str) -> Result<Vec<Contact>, SimError> {
        let mode: SensorMode = mode.parse()?;
        self.scan_with(id, mode)
    }

    /// Runs an on-demand scan with a typed mode.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownShip`] if no such ship exists.
    pub fn scan_with(&mut self, id: &ShipId, mode: SensorMode) -> Result<Vec<Contact>, SimError> {
        let observer = self
            .ships
            .get(id)
            .ok_or_else(|| SimError::UnknownShip(id.clone()))?;
        let view = WorldView::capture(self.ships.values());
        Ok(self
            .sensors
            .scan(observer, &view, mode, self.time_s, &mut self.events))
    }

    /// A ship's remembered contacts.
    #[must_use]
    pub fn contacts(&self, id: &ShipId) -> Vec<Contact> {
        self.sensors.contacts_for(id)
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Events with `time > since_time`, ordered by time then id. Nothing is
    /// removed.
    #[must_use]
    pub fn drain_events(&self, since_time: f64) -> Vec<Event> {
        self.events.since(since_time)
    }

    /// The event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Clears the event log. Event ids keep increasing.
    pub fn reset_events(&mut self) {
        self.events.clear();
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    /// Serializable state of one ship.
    #[must_use]
    pub fn snapshot(&self, id: &ShipId) -> Option<ShipSnapshot> {
        self.ships.get(id).map(|ship| self.snapshot_of(ship))
    }

    /// Serializable state of every ship, in id order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ShipSnapshot> {
        self.ships.values().map(|ship| self.snapshot_of(ship)).collect()
    }

    fn snapshot_of(&self, ship: &Ship) -> ShipSnapshot {
        ShipSnapshot {
            id: ship.id().clone(),
            team: ship.team.clone(),
            mass_kg: ship.mass_kg(),
            kinematics: ship.kinematics,
            controls: ship.controls.clone(),
            autopilot: ship.autopilot.clone(),
            contacts: self.sensors.contacts_for(ship.id()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::EventKind;

    fn world() -> World {
        let mut world = World::new(SimConfig::default()).unwrap();
        world.add_ship(Ship::new("alpha", 1.0e6).unwrap()).unwrap();
        world
            .add_ship(
                Ship::new("bravo", 1.0e6)
                    .unwrap()
                    .with_position(DVec3::new(0.0, 0.0, 10.0)),
            )
            .unwrap();
        world
    }

    fn alpha() -> ShipId {
        ShipId::from("alpha")
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn rejects_invalid_config() {
            let mut config = SimConfig::default();
            config.autopilot.stop_speed_km_s = -1.0;
            assert!(World::new(config).is_err());
        }

        #[test]
        fn rejects_duplicate_ship() {
            let mut world = world();
            let err = world.add_ship(Ship::new("alpha", 5.0).unwrap()).unwrap_err();
            assert_eq!(err, SimError::DuplicateShip(alpha()));
            assert_eq!(world.ship(&alpha()).unwrap().mass_kg(), 1.0e6);
        }

        #[test]
        fn rejects_invalid_ship() {
            let mut world = world();
            let mut ship = Ship::new("charlie", 5.0).unwrap();
            ship.sensors.passive.range_m = f64::NAN;
            assert!(world.add_ship(ship).unwrap_err().is_configuration());
            assert_eq!(world.ship_count(), 2);
        }

        #[test]
        fn ships_iterate_in_id_order() {
            let mut world = world();
            world.add_ship(Ship::new("aardvark", 1.0).unwrap()).unwrap();
            let ids: Vec<&str> = world.ships().map(|s| s.id().as_str()).collect();
            assert_eq!(ids, ["aardvark", "alpha", "bravo"]);
        }

        #[test]
        fn remove_ship_forgets_contacts() {
            let mut world = world();
            world.scan(&alpha(), "passive").unwrap();
            assert_eq!(world.contacts(&alpha()).len(), 1);
            assert!(world.remove_ship(&alpha()).is_some());
            assert!(world.contacts(&alpha()).is_empty());
            assert!(world.remove_ship(&alpha()).is_none());
        }

        #[test]
        fn rejects_invalid_gravity_body() {
            let mut world = world();
            let mut body = GravityBody::new("p", 1.0, DVec3::ZERO).unwrap();
            body.mass_kg = 0.0;
            assert!(world.add_gravity_body(body).is_err());
            assert!(world.gravity_bodies().is_empty());
        }
    }

    mod command_tests {
        use super::*;

        #[test]
        fn unknown_ship_is_reported() {
            let mut world = world();
            let ghost = ShipId::from("ghost");
            assert_eq!(
                world
                    .set_helm_input(&ghost, DVec3::Z, Euler::ZERO, None)
                    .unwrap_err(),
                SimError::UnknownShip(ghost.clone())
            );
            assert!(world
                .set_autopilot_mode(&ghost, true, "coast", &AutopilotParams::new())
                .is_err());
            assert!(world.scan(&ghost, "active").is_err());
        }

        #[test]
        fn helm_input_is_clamped() {
            let mut world = world();
            let controls = world
                .set_helm_input(&alpha(), DVec3::new(0.0, 0.0, 2.0), Euler::new(0.0, -40.0, 0.0), None)
                .unwrap();
            assert_eq!(controls.thrust_vector.z, 1.0);
            assert_eq!(controls.rotation_rate_deg_s.pitch, -10.0);
        }

        #[test]
        fn invalid_autopilot_mode_preserves_state() {
            let mut world = world();
            world
                .set_autopilot_mode(&alpha(), true, "kill_vel", &AutopilotParams::new())
                .unwrap();
            let err = world
                .set_autopilot_mode(&alpha(), true, "orbit", &AutopilotParams::new())
                .unwrap_err();
            assert!(err.to_string().contains("manual, coast, kill_vel, chase_target"));
            assert_eq!(
                world.ship(&alpha()).unwrap().autopilot.mode.name(),
                "kill_vel"
            );
        }

        #[test]
        fn invalid_scan_mode() {
            let mut world = world();
            assert_eq!(
                world.scan(&alpha(), "lidar").unwrap_err(),
                SimError::InvalidSensorMode("lidar".into())
            );
        }

        #[test]
        fn active_scan_records_ping() {
            let mut world = world();
            let contacts = world.scan(&alpha(), "active").unwrap();
            assert_eq!(contacts.len(), 1);
            let types: Vec<_> = world.events().iter().map(Event::event_type).collect();
            assert_eq!(types, ["sensor_ping", "sensor_contact_new"]);
        }
    }

    mod event_tests {
        use super::*;

        #[test]
        fn drain_does_not_remove() {
            let mut world = world();
            world.scan(&alpha(), "passive").unwrap();
            // Scans between ticks are stamped with the current time, 0.0
            assert!(world.drain_events(0.0).is_empty());
            assert_eq!(world.drain_events(-1.0).len(), 1);
            assert_eq!(world.drain_events(-1.0).len(), 1);
        }

        #[test]
        fn reset_keeps_id_sequence() {
            let mut world = world();
            world.scan(&alpha(), "active").unwrap();
            world.reset_events();
            assert!(world.events().is_empty());
            world.remove_ship(&alpha());
            world.add_ship(Ship::new("alpha", 1.0e6).unwrap()).unwrap();
            world.scan(&alpha(), "active").unwrap();
            let first = world.events().iter().next().unwrap();
            assert_eq!(first.id.as_u64(), 3);
            assert!(matches!(first.kind, EventKind::SensorPing { performed: true, .. }));
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn snapshot_carries_contacts() {
            let mut world = world();
            world.scan(&alpha(), "passive").unwrap();
            let snap = world.snapshot(&alpha()).unwrap();
            assert_eq!(snap.contacts.len(), 1);
            assert_eq!(snap.contacts[0].target_entity_id, ShipId::from("bravo"));
            assert!(world.snapshot(&ShipId::from("ghost")).is_none());
            assert_eq!(world.snapshots().len(), 2);
        }

        #[test]
        fn snapshot_serializes() {
            let world = world();
            let value = serde_json::to_value(world.snapshot(&alpha()).unwrap()).unwrap();
            assert_eq!(value["id"], "alpha");
            assert_eq!(value["autopilot"]["mode"]["mode"], "manual");
            assert_eq!(value["kinematics"]["position"], serde_json::json!([0.0, 0.0, 0.0]));
        }
    }
}
