//! Simulation tuning.
//!
//! [`SimConfig`] groups the fixed thresholds the core needs but that callers
//! may want to tune per mission. Every field has a documented default, and the
//! whole struct deserializes with missing fields filled from those defaults.
//!
//! # Example
//!
//! ```
//! use flaxos_core::config::SimConfig;
//!
//! let config = SimConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.autopilot.default_desired_range_m, 5000.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, SimError};

/// Tuning for the autopilot state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotTuning {
    /// Speed (km/s) under which `kill_vel` considers the ship stopped and
    /// hands control back to manual.
    pub stop_speed_km_s: f64,
    /// Off-axis error (degrees) within which the ship counts as aligned and
    /// thrust is allowed.
    pub align_tolerance_deg: f64,
    /// `chase_target` stand-off range used when `desired_range_m` is not given.
    pub default_desired_range_m: f64,
    /// `chase_target` closure floor used when `min_range_m` is not given.
    pub default_min_range_m: f64,
}

impl Default for AutopilotTuning {
    fn default() -> Self {
        Self {
            stop_speed_km_s: 1.0e-3,
            align_tolerance_deg: 1.0,
            default_desired_range_m: 5000.0,
            default_min_range_m: 1000.0,
        }
    }
}

impl AutopilotTuning {
    fn validate(&self) -> Result<(), SimError> {
        const SUBJECT: &str = "autopilot tuning";
        require_positive(SUBJECT, "stop_speed_km_s", self.stop_speed_km_s)?;
        require_non_negative(SUBJECT, "align_tolerance_deg", self.align_tolerance_deg)?;
        require_non_negative(SUBJECT, "default_desired_range_m", self.default_desired_range_m)?;
        require_non_negative(SUBJECT, "default_min_range_m", self.default_min_range_m)
    }
}

/// Tuning for the sensor/contact engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorTuning {
    /// Detections weaker than this are discarded. Zero keeps the plain
    /// range-and-field-of-view policy.
    pub min_detection_strength: f64,
}

impl Default for SensorTuning {
    fn default() -> Self {
        Self {
            min_detection_strength: 0.0,
        }
    }
}

/// Tuning for the physics integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Gravity bodies closer than this (km) to a ship are ignored to avoid
    /// the singularity at the body's centre.
    pub gravity_singularity_km: f64,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity_singularity_km: 1.0e-6,
        }
    }
}

/// Top-level tuning for a simulation world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Autopilot thresholds and defaults
    pub autopilot: AutopilotTuning,
    /// Sensor thresholds
    pub sensors: SensorTuning,
    /// Integrator guards
    pub physics: PhysicsTuning,
}

impl SimConfig {
    /// Checks every tuning value for finiteness and sign.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SimError> {
        self.autopilot.validate()?;
        require_non_negative(
            "sensor tuning",
            "min_detection_strength",
            self.sensors.min_detection_strength,
        )?;
        require_non_negative(
            "physics tuning",
            "gravity_singularity_km",
            self.physics.gravity_singularity_km,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.autopilot.stop_speed_km_s - 1.0e-3).abs() < f64::EPSILON);
        assert!((config.autopilot.default_min_range_m - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_positive_stop_speed() {
        let mut config = SimConfig::default();
        config.autopilot.stop_speed_km_s = 0.0;
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut config = SimConfig::default();
        config.sensors.min_detection_strength = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.physics.gravity_singularity_km = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "autopilot": { "align_tolerance_deg": 2.5 } }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert!((config.autopilot.align_tolerance_deg - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.sensors, SensorTuning::default());
        assert!((config.autopilot.default_desired_range_m - 5000.0).abs() < f64::EPSILON);
    }
}
