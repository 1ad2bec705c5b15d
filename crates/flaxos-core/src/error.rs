//! Error types for the simulation core.
//!
//! Only structurally invalid configuration and mode selection surface as
//! errors. Out-of-range numeric control inputs are clamped silently, and an
//! unresolvable autopilot target is treated as "no target" rather than failing.

use thiserror::Error;

use crate::entity::ShipId;
use crate::plugins::autopilot::ALLOWED_MODES;

/// Errors returned by the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A ship, gravity body or tuning value is structurally invalid
    /// (non-positive mass, non-finite capability cap, ...).
    ///
    /// Fatal for the affected ship's tick only.
    #[error("configuration error in {subject}: {reason}")]
    Configuration {
        /// What was being validated (e.g. `ship 'alpha'`)
        subject: String,
        /// Human-readable reason
        reason: String,
    },

    /// An autopilot mode name was not recognised. The previous autopilot state
    /// is left untouched.
    #[error("invalid autopilot mode '{mode}' (allowed: {})", .allowed.join(", "))]
    InvalidMode {
        /// The rejected mode string
        mode: String,
        /// The fixed set of accepted mode names
        allowed: &'static [&'static str],
    },

    /// A sensor scan mode string was neither `active` nor `passive`.
    #[error("invalid sensor mode '{0}' (allowed: active, passive)")]
    InvalidSensorMode(String),

    /// No ship with this id is registered in the world.
    #[error("unknown ship '{0}'")]
    UnknownShip(ShipId),

    /// A ship with this id is already registered in the world.
    #[error("ship '{0}' already exists")]
    DuplicateShip(ShipId),
}

impl SimError {
    /// Builds a [`SimError::Configuration`].
    pub fn configuration(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Builds a [`SimError::InvalidMode`] listing the allowed autopilot modes.
    pub fn invalid_mode(mode: impl Into<String>) -> Self {
        Self::InvalidMode {
            mode: mode.into(),
            allowed: ALLOWED_MODES,
        }
    }

    /// Returns `true` for errors that make a ship's tick unrunnable.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Checks that `value` is finite and `>= 0`.
pub(crate) fn require_non_negative(subject: &str, field: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::configuration(
            subject,
            format!("{field} must be finite and non-negative, got {value}"),
        ))
    }
}

/// Checks that `value` is finite and `> 0`.
pub(crate) fn require_positive(subject: &str, field: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::configuration(
            subject,
            format!("{field} must be finite and positive, got {value}"),
        ))
    }
}
