//! Point-mass gravity sources.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, SimError};

fn default_enabled() -> bool {
    true
}

/// A body that attracts every ship toward its position.
///
/// Bodies are immutable for the lifetime of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravityBody {
    /// Body identifier, used only for diagnostics
    pub id: String,
    /// Free-form classification (`planet`, `moon`, `station`, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Mass (kg)
    pub mass_kg: f64,
    /// World position (km)
    pub position: DVec3,
    /// Physical radius (km), informational
    #[serde(default)]
    pub radius_km: f64,
    /// Disabled bodies exert no pull
    #[serde(default = "default_enabled")]
    pub gravity_enabled: bool,
    /// Ships farther than this (km) feel no pull. `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_radius_km: Option<f64>,
}

impl GravityBody {
    /// Creates an enabled body with unlimited reach.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if `mass_kg` is not finite and
    /// positive or `position` is not finite.
    pub fn new(id: impl Into<String>, mass_kg: f64, position: DVec3) -> Result<Self, SimError> {
        let body = Self {
            id: id.into(),
            kind: String::new(),
            mass_kg,
            position,
            radius_km: 0.0,
            gravity_enabled: true,
            cutoff_radius_km: None,
        };
        body.validate()?;
        Ok(body)
    }

    /// Sets the classification.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the physical radius (km).
    #[must_use]
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Limits the body's reach (km).
    #[must_use]
    pub fn with_cutoff_km(mut self, cutoff_km: f64) -> Self {
        self.cutoff_radius_km = Some(cutoff_km);
        self
    }

    /// Enables or disables the body's pull.
    #[must_use]
    pub fn with_gravity_enabled(mut self, enabled: bool) -> Self {
        self.gravity_enabled = enabled;
        self
    }

    /// Returns `true` if a ship at `distance_km` from the body feels its pull,
    /// ignoring the singularity guard.
    #[must_use]
    pub fn reaches(&self, distance_km: f64) -> bool {
        self.gravity_enabled && self.cutoff_radius_km.map_or(true, |cutoff| distance_km <= cutoff)
    }

    /// Checks mass, position and optional radii.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SimError> {
        let subject = format!("gravity body '{}'", self.id);
        require_positive(&subject, "mass_kg", self.mass_kg)?;
        if !self.position.is_finite() {
            return Err(SimError::configuration(subject, "position must be finite"));
        }
        require_non_negative(&subject, "radius_km", self.radius_km)?;
        if let Some(cutoff) = self.cutoff_radius_km {
            require_non_negative(&subject, "cutoff_radius_km", cutoff)?;
        }
        Ok(())
    }
}
