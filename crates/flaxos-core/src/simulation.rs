//! Simulation tick orchestration.
//!
//! The `Simulation` struct advances a [`World`] through a fixed sequence of
//! phases on every [`Simulation::step`]:
//!
//! 1. **CLOCK**: advance simulation time by `dt_s`
//! 2. **SNAPSHOT**: capture every ship's observable state
//! 3. **ADVANCE**: run autopilot then physics for every ship in parallel, each
//!    worker owning one ship and reading only the snapshot
//! 4. **SENSE**: run every ship's passive scan sequentially in id order,
//!    appending contact events to the world's log
//!
//! # Determinism
//!
//! The outcome of a tick does not depend on thread scheduling:
//! - Workers never read a ship another worker is writing (the snapshot is
//!   taken before any ship moves)
//! - Ships are iterated in id order (via `BTreeMap`)
//! - Events are only appended in the sequential sensor phase
//!
//! # Example
//!
//! ```
//! use flaxos_core::config::SimConfig;
//! use flaxos_core::entity::Ship;
//! use flaxos_core::simulation::Simulation;
//! use glam::DVec3;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//! let mut ship = Ship::new("alpha", 1.0e6).unwrap();
//! ship.set_helm_input(DVec3::Z, Default::default(), None);
//! sim.world_mut().add_ship(ship).unwrap();
//!
//! for _ in 0..10 {
//!     sim.step(1.0);
//! }
//!
//! assert_eq!(sim.world().tick(), 10);
//! let alpha = sim.world().ships().next().unwrap();
//! assert!((alpha.kinematics.velocity.z - 10.0).abs() < 1e-9);
//! ```

use rayon::prelude::*;
use std::fmt;
use tracing::{debug, warn};

use crate::config::SimConfig;
use crate::entity::{GravityBody, Ship, ShipId};
use crate::error::SimError;
use crate::plugins::autopilot;
use crate::resolver::PhysicsIntegrator;
use crate::world::World;
use crate::world_view::WorldView;

// =============================================================================
// Per-ship advance
// =============================================================================

/// Advances one ship by `dt_s`: autopilot, then physics.
///
/// The autopilot target is resolved against `targets`; a target id that is not
/// in the snapshot counts as no target. A non-positive or non-finite `dt_s`
/// leaves the ship untouched.
///
/// # Errors
///
/// Returns [`SimError::Configuration`] if the ship fails validation; the ship
/// is left untouched.
pub fn advance_ship(
    ship: &mut Ship,
    dt_s: f64,
    gravity_bodies: &[GravityBody],
    targets: &WorldView,
    config: &SimConfig,
) -> Result<(), SimError> {
    if !(dt_s.is_finite() && dt_s > 0.0) {
        return Ok(());
    }
    ship.validate()?;

    let target = ship
        .autopilot
        .current_target_id
        .as_ref()
        .and_then(|id| targets.position_of(id));
    autopilot::run(ship, target, dt_s, &config.autopilot);

    PhysicsIntegrator::new(config.physics).advance(ship, dt_s, gravity_bodies)
}

// =============================================================================
// Tick report
// =============================================================================

/// A ship whose tick was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct TickFailure {
    /// The skipped ship
    pub ship_id: ShipId,
    /// Why it was skipped
    pub error: SimError,
}

/// Summary of one [`Simulation::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Tick number after the step
    pub tick: u64,
    /// Simulation time after the step (s)
    pub time_s: f64,
    /// Ships advanced successfully
    pub advanced: usize,
    /// Ships skipped, in id order
    pub failures: Vec<TickFailure>,
    /// Events appended during the step
    pub events_emitted: usize,
}

impl TickReport {
    /// Returns `true` if every ship advanced.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// The tick orchestrator.
pub struct Simulation {
    world: World,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.world.tick)
            .field("time_s", &self.world.time_s)
            .field("ship_count", &self.world.ships.len())
            .field("event_count", &self.world.events.len())
            .finish()
    }
}

impl Simulation {
    /// Creates a simulation over an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if `config` fails validation.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        Ok(Self::from_world(World::new(config)?))
    }

    /// Wraps an existing world.
    #[must_use]
    pub fn from_world(world: World) -> Self {
        Self { world }
    }

    /// Executes one tick of `dt_s` seconds.
    ///
    /// A non-positive or non-finite `dt_s` does nothing. A ship that fails
    /// validation is skipped for both physics and sensing and reported in the
    /// returned [`TickReport`]; every other ship still advances.
    pub fn step(&mut self, dt_s: f64) -> TickReport {
        let world = &mut self.world;
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return TickReport {
                tick: world.tick,
                time_s: world.time_s,
                advanced: 0,
                failures: Vec::new(),
                events_emitted: 0,
            };
        }

        // PHASE 1: CLOCK
        world.time_s += dt_s;
        world.tick += 1;
        let events_before = world.events.len();

        // PHASE 2: SNAPSHOT
        let before = WorldView::capture(world.ships.values());

        // PHASE 3: ADVANCE - ships in parallel, each worker owns one ship
        let config = world.config;
        let bodies = &world.gravity_bodies;
        let mut failures: Vec<TickFailure> = world
            .ships
            .par_iter_mut()
            .filter_map(|(id, ship)| {
                advance_ship(ship, dt_s, bodies, &before, &config)
                    .err()
                    .map(|error| TickFailure {
                        ship_id: id.clone(),
                        error,
                    })
            })
            .collect();
        failures.sort_by(|a, b| a.ship_id.cmp(&b.ship_id));
        for failure in &failures {
            warn!(ship = %failure.ship_id, error = %failure.error, "ship skipped this tick");
        }

        // PHASE 4: SENSE - sequential, id order
        let after = WorldView::capture(world.ships.values());
        for (id, ship) in &world.ships {
            if failures.iter().any(|f| &f.ship_id == id) {
                continue;
            }
            world
                .sensors
                .passive_scan(ship, &after, world.time_s, &mut world.events);
        }

        let report = TickReport {
            tick: world.tick,
            time_s: world.time_s,
            advanced: world.ships.len() - failures.len(),
            failures,
            events_emitted: world.events.len() - events_before,
        };
        debug!(
            tick = report.tick,
            time_s = report.time_s,
            advanced = report.advanced,
            failed = report.failures.len(),
            events = report.events_emitted,
            "tick complete"
        );
        report
    }

    /// Returns the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world for commands between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Consumes the simulation, returning its world.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }
}

// =============================================================================
// Tests
// =============================================================================
