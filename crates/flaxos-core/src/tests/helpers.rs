//! Test helper functions for setting up simulations and ships.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::DVec3;

use crate::config::SimConfig;
use crate::entity::{Euler, Ship, ShipId};
use crate::plugins::autopilot::{AutopilotMode, ChaseParams};
use crate::simulation::{Simulation, TickReport};

// =============================================================================
// Ship Factory Functions
// =============================================================================

/// A 1e6 kg ship with default 1e6 N main engine (1 km/s^2 at full thrust).
pub fn test_ship(id: &str) -> Ship {
    Ship::new(id, 1.0e6).expect("valid test ship")
}

/// A test ship at `position` (km).
pub fn ship_at(id: &str, position: DVec3) -> Ship {
    test_ship(id).with_position(position)
}

/// A test ship `range_km` from the origin at relative bearing `bearing_deg`
/// (seen from a ship at the origin facing +Z).
pub fn ship_at_bearing(id: &str, bearing_deg: f64, range_km: f64) -> Ship {
    ship_at(id, Euler::new(bearing_deg, 0.0, 0.0).forward() * range_km)
}

/// A test ship with a narrow passive cone: 90 degree field of view, 20 km.
pub fn narrow_observer(id: &str) -> Ship {
    let mut ship = test_ship(id);
    ship.sensors.passive.fov_deg = 90.0;
    ship.sensors.passive.range_m = 20_000.0;
    ship
}

// =============================================================================
// Simulation Setup
// =============================================================================

/// A simulation with default tuning and the given ships registered.
pub fn sim_with(ships: Vec<Ship>) -> Simulation {
    let mut sim = Simulation::new(SimConfig::default()).expect("default config is valid");
    for ship in ships {
        sim.world_mut().add_ship(ship).expect("unique test ship ids");
    }
    sim
}

/// A mixed fleet exercising every autopilot mode, with mutual sensor contact.
///
/// Ships are placed on a ring so passive contacts appear and disappear as
/// they move.
pub fn mixed_fleet(count: usize) -> Simulation {
    let mut ships = Vec::with_capacity(count);
    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let angle = (i as f64) * 360.0 / (count as f64);
        let position = Euler::new(angle, 0.0, 0.0).forward() * 30.0;
        #[allow(clippy::cast_precision_loss)]
        let drift = DVec3::new(0.01 * i as f64, -0.02, 0.015);
        let mut ship = ship_at(&format!("ship-{i:03}"), position).with_velocity(drift);
        ship.sensors.passive.range_m = 40_000.0;
        ship.sensors.passive.fov_deg = 120.0;

        match i % 4 {
            0 => {
                ship.set_helm_input(DVec3::new(0.0, 0.0, 0.3), Euler::new(2.0, 1.0, 0.0), None);
            }
            1 => {
                ship.set_autopilot(true, AutopilotMode::Coast);
            }
            2 => {
                ship.set_autopilot(true, AutopilotMode::KillVel);
            }
            _ => {
                ship.set_autopilot(true, AutopilotMode::ChaseTarget(ChaseParams::default()));
                ship.set_target(Some(ShipId::new(format!("ship-{:03}", (i + 1) % count))));
            }
        }
        ships.push(ship);
    }
    sim_with(ships)
}

/// Runs `ticks` steps of `dt_s`, returning every report.
pub fn run(sim: &mut Simulation, ticks: usize, dt_s: f64) -> Vec<TickReport> {
    (0..ticks).map(|_| sim.step(dt_s)).collect()
}

// =============================================================================
// Inspection
// =============================================================================

/// Looks up a ship that must exist.
pub fn ship<'a>(sim: &'a Simulation, id: &str) -> &'a Ship {
    sim.world()
        .ship(&ShipId::from(id))
        .expect("ship registered in test")
}

/// Event type names in log order.
pub fn event_types(sim: &Simulation) -> Vec<&'static str> {
    sim.world().events().iter().map(crate::output::Event::event_type).collect()
}

/// Asserts two vectors agree within `eps`.
pub fn assert_vec_close(actual: DVec3, expected: DVec3, eps: f64) {
    assert!(
        (actual - expected).length() < eps,
        "expected {expected:?}, got {actual:?}"
    );
}
