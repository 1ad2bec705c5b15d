//! Autopilot state machine.
//!
//! The autopilot replaces manual helm input with synthesized controls. It has
//! four modes:
//!
//! - `manual`: helm input passes through
//! - `coast`: zero thrust and zero rotation every tick
//! - `kill_vel`: turn retrograde, burn until stopped, then hand back to manual
//! - `chase_target`: turn toward the target and close to a stand-off range
//!
//! # Architecture
//!
//! [`evaluate`] is a pure function of the ship, the resolved target position
//! and the tuning. It returns the controls for this tick and whether the
//! autopilot disengages, the only transition the machine makes on its own.
//! [`run`] applies that output to the ship.
//!
//! Steering is deadbeat: each axis is commanded the rate that would close its
//! angular error in one tick, clamped to the ship's cap for that axis. Thrust
//! is only applied once the forward axis is within the alignment tolerance.
//!
//! # Example
//!
//! ```
//! use flaxos_core::config::AutopilotTuning;
//! use flaxos_core::entity::Ship;
//! use flaxos_core::plugins::autopilot::{evaluate, AutopilotMode};
//! use glam::DVec3;
//!
//! let mut ship = Ship::new("alpha", 1.0e6).unwrap();
//! ship.set_autopilot(true, AutopilotMode::Coast);
//! ship.set_helm_input(DVec3::Z, Default::default(), None);
//!
//! let output = evaluate(&ship, None, 1.0, &AutopilotTuning::default());
//! assert!(output.controls.is_idle());
//! assert!(!output.disengage);
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::AutopilotTuning;
use crate::entity::{Controls, Euler, Ship, ShipId};
use crate::error::SimError;
use crate::math;

/// The autopilot mode names accepted by [`AutopilotMode::parse`].
pub const ALLOWED_MODES: &[&str] = &["manual", "coast", "kill_vel", "chase_target"];

/// Loose numeric parameters supplied alongside a mode name.
pub type AutopilotParams = BTreeMap<String, f64>;

// =============================================================================
// Mode
// =============================================================================

/// Parameters of the `chase_target` mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseParams {
    /// Full thrust beyond this range (m)
    pub desired_range_m: f64,
    /// No thrust at or inside this range (m)
    pub min_range_m: f64,
}

impl Default for ChaseParams {
    fn default() -> Self {
        let tuning = AutopilotTuning::default();
        Self {
            desired_range_m: tuning.default_desired_range_m,
            min_range_m: tuning.default_min_range_m,
        }
    }
}

impl ChaseParams {
    /// Reads `desired_range_m` and `min_range_m` from `params`.
    ///
    /// Missing, negative or non-finite values fall back to the tuning
    /// defaults.
    #[must_use]
    pub fn from_params(params: &AutopilotParams, tuning: &AutopilotTuning) -> Self {
        let pick = |key: &str, fallback: f64| {
            params
                .get(key)
                .copied()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(fallback)
        };
        Self {
            desired_range_m: pick("desired_range_m", tuning.default_desired_range_m),
            min_range_m: pick("min_range_m", tuning.default_min_range_m),
        }
    }

    /// Throttle for a target at `range_m`: zero at or inside the minimum,
    /// full at or beyond the desired range, linear in between.
    #[must_use]
    pub fn throttle(&self, range_m: f64) -> f64 {
        if range_m <= self.min_range_m {
            0.0
        } else if range_m >= self.desired_range_m {
            1.0
        } else {
            (range_m - self.min_range_m) / (self.desired_range_m - self.min_range_m)
        }
    }
}

/// Autopilot mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AutopilotMode {
    /// Helm input passes through
    #[default]
    Manual,
    /// Zero thrust and rotation
    Coast,
    /// Null velocity, then disengage
    KillVel,
    /// Close on the current target
    ChaseTarget(ChaseParams),
}

impl AutopilotMode {
    /// Parses a mode name, taking `chase_target` parameters from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMode`] listing [`ALLOWED_MODES`] if `name`
    /// is not one of them.
    pub fn parse(
        name: &str,
        params: &AutopilotParams,
        tuning: &AutopilotTuning,
    ) -> Result<Self, SimError> {
        match name {
            "manual" => Ok(Self::Manual),
            "coast" => Ok(Self::Coast),
            "kill_vel" => Ok(Self::KillVel),
            "chase_target" => Ok(Self::ChaseTarget(ChaseParams::from_params(params, tuning))),
            other => Err(SimError::invalid_mode(other)),
        }
    }

    /// The mode's wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Coast => "coast",
            Self::KillVel => "kill_vel",
            Self::ChaseTarget(_) => "chase_target",
        }
    }
}

/// Per-ship autopilot configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotState {
    /// When false the helm input is used regardless of `mode`
    pub enabled: bool,
    /// Selected mode
    pub mode: AutopilotMode,
    /// Target for `chase_target`, looked up by id each tick
    pub current_target_id: Option<ShipId>,
}

impl AutopilotState {
    /// Returns `true` if autopilot output replaces helm input.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.mode != AutopilotMode::Manual
    }

    /// Hands control back to the helm. The target id is kept.
    pub fn disengage(&mut self) {
        self.enabled = false;
        self.mode = AutopilotMode::Manual;
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Result of one autopilot evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AutopilotOutput {
    /// Controls the integrator should apply this tick
    pub controls: Controls,
    /// The autopilot finished and hands control back to manual
    pub disengage: bool,
}

impl AutopilotOutput {
    fn hold(controls: Controls) -> Self {
        Self {
            controls,
            disengage: false,
        }
    }
}

/// Computes this tick's controls for `ship`.
///
/// # Arguments
///
/// * `ship` - The ship being flown
/// * `target` - Position (km) of the resolved `chase_target` target, if any
/// * `dt_s` - Tick length (s)
/// * `tuning` - Stop threshold, alignment tolerance, chase defaults
#[must_use]
pub fn evaluate(
    ship: &Ship,
    target: Option<DVec3>,
    dt_s: f64,
    tuning: &AutopilotTuning,
) -> AutopilotOutput {
    if !ship.autopilot.enabled {
        return AutopilotOutput::hold(helm_controls(ship));
    }
    match ship.autopilot.mode {
        AutopilotMode::Manual => AutopilotOutput::hold(helm_controls(ship)),
        AutopilotMode::Coast => AutopilotOutput::hold(Controls::idle("coast")),
        AutopilotMode::KillVel => kill_velocity(ship, dt_s, tuning),
        AutopilotMode::ChaseTarget(params) => match target {
            Some(position) => chase(ship, position, &params, dt_s, tuning),
            None => AutopilotOutput::hold(Controls::idle("chase_target")),
        },
    }
}

/// Evaluates the autopilot and applies the result to `ship`.
///
/// Stores the controls in `ship.controls`. On disengage the autopilot returns
/// to manual and the helm input is zeroed so the ship does not resume an old
/// burn.
pub fn run(ship: &mut Ship, target: Option<DVec3>, dt_s: f64, tuning: &AutopilotTuning) {
    let output = evaluate(ship, target, dt_s, tuning);
    ship.controls = output.controls;
    if output.disengage {
        debug!(ship = %ship.id(), "kill_vel complete, autopilot disengaged");
        ship.autopilot.disengage();
        ship.helm.thrust_vector = DVec3::ZERO;
        ship.helm.rotation_rate_deg_s = Euler::ZERO;
    }
}

fn helm_controls(ship: &Ship) -> Controls {
    Controls {
        thrust_vector: math::clamp_thrust(ship.helm.thrust_vector),
        rotation_rate_deg_s: ship.helm.rotation_rate_deg_s.clamped_to(ship.limits.rcs_caps()),
        mode: ship.helm.mode.clone(),
    }
}

fn kill_velocity(ship: &Ship, dt_s: f64, tuning: &AutopilotTuning) -> AutopilotOutput {
    let speed = ship.speed();
    if speed < tuning.stop_speed_km_s {
        return AutopilotOutput {
            controls: Controls::idle("kill_vel"),
            disengage: true,
        };
    }

    let retrograde = -ship.kinematics.velocity;
    let rates = steer(ship, retrograde, dt_s);
    let throttle = if is_aligned(ship, retrograde, tuning) {
        let one_tick = ship.max_thrust_acceleration() * dt_s;
        if one_tick > 0.0 {
            (speed / one_tick).min(1.0)
        } else {
            1.0
        }
    } else {
        0.0
    };

    AutopilotOutput::hold(Controls {
        thrust_vector: DVec3::new(0.0, 0.0, throttle),
        rotation_rate_deg_s: rates,
        mode: Some("kill_vel".to_string()),
    })
}

fn chase(
    ship: &Ship,
    target: DVec3,
    params: &ChaseParams,
    dt_s: f64,
    tuning: &AutopilotTuning,
) -> AutopilotOutput {
    let offset = target - ship.kinematics.position;
    let range_m = offset.length() * 1000.0;
    let rates = steer(ship, offset, dt_s);
    let throttle = if is_aligned(ship, offset, tuning) {
        params.throttle(range_m)
    } else {
        0.0
    };

    AutopilotOutput::hold(Controls {
        thrust_vector: DVec3::new(0.0, 0.0, throttle),
        rotation_rate_deg_s: rates,
        mode: Some("chase_target".to_string()),
    })
}

/// Deadbeat rate commands turning the nose toward `direction` and levelling
/// roll. A degenerate direction holds yaw and pitch.
fn steer(ship: &Ship, direction: DVec3, dt_s: f64) -> Euler {
    let current = ship.kinematics.orientation;
    let caps = ship.limits.rcs_caps();
    let (yaw_error, pitch_error) = math::yaw_pitch_towards(direction)
        .map_or((0.0, 0.0), |(yaw, pitch)| {
            (math::wrap_deg(yaw - current.yaw), math::wrap_deg(pitch - current.pitch))
        });
    let roll_error = math::wrap_deg(-current.roll);

    Euler::new(
        deadbeat_rate(yaw_error, dt_s, caps.yaw),
        deadbeat_rate(pitch_error, dt_s, caps.pitch),
        deadbeat_rate(roll_error, dt_s, caps.roll),
    )
}

fn deadbeat_rate(error_deg: f64, dt_s: f64, cap: f64) -> f64 {
    if dt_s > 0.0 && dt_s.is_finite() {
        math::clamp_symmetric(error_deg / dt_s, cap)
    } else {
        0.0
    }
}

fn is_aligned(ship: &Ship, direction: DVec3, tuning: &AutopilotTuning) -> bool {
    direction.length_squared() > math::DIRECTION_EPSILON
        && math::angle_between_deg(ship.kinematics.orientation.forward(), direction)
            <= tuning.align_tolerance_deg
}

// =============================================================================
// Tests
// =============================================================================
