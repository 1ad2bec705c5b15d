//! Component structs that make up a [`Ship`](super::Ship).
//!
//! Each struct holds one concern of ship state: kinematics, control input,
//! capability caps, sensor capability and signature. Capability structs carry
//! the defaults the original fleet files assumed when a field was absent, and
//! a `validate()` used at construction time and again before each tick.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, SimError};
use crate::math;

// =============================================================================
// Orientation / Rates
// =============================================================================

/// A yaw/pitch/roll triple in degrees (orientation) or degrees per second
/// (rotation rates).
///
/// See [`crate::math`] for the axis conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Euler {
    /// Rotation about the up axis; positive swings the nose to starboard
    pub yaw: f64,
    /// Nose up/down; positive raises the nose
    pub pitch: f64,
    /// Rotation about the forward axis
    pub roll: f64,
}

impl Euler {
    /// All axes zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new triple.
    #[must_use]
    pub const fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Ship-to-world rotation for this orientation.
    #[must_use]
    pub fn rotation(&self) -> DQuat {
        math::rotation_from_euler_deg(self.yaw, self.pitch, self.roll)
    }

    /// World-space unit vector along the ship's forward (+Z) axis.
    #[must_use]
    pub fn forward(&self) -> DVec3 {
        self.rotation() * DVec3::Z
    }

    /// Every axis wrapped into `[-180, 180)`.
    #[must_use]
    pub fn wrapped(self) -> Self {
        Self::new(
            math::wrap_deg(self.yaw),
            math::wrap_deg(self.pitch),
            math::wrap_deg(self.roll),
        )
    }

    /// Every axis clamped into `[-cap, cap]` of the matching axis in `caps`.
    #[must_use]
    pub fn clamped_to(self, caps: Euler) -> Self {
        Self::new(
            math::clamp_symmetric(self.yaw, caps.yaw),
            math::clamp_symmetric(self.pitch, caps.pitch),
            math::clamp_symmetric(self.roll, caps.roll),
        )
    }

    /// Returns `true` if all three axes are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

// =============================================================================
// Kinematics
// =============================================================================

/// Position, velocity and orientation of a ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kinematics {
    /// World position (km)
    pub position: DVec3,
    /// World velocity (km/s)
    pub velocity: DVec3,
    /// Orientation (degrees)
    pub orientation: Euler,
}

impl Kinematics {
    /// Speed magnitude (km/s).
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

// =============================================================================
// Controls
// =============================================================================

/// Control input for one tick.
///
/// A ship keeps two of these: the manual helm input last set by a command, and
/// the controls actually applied by the integrator (helm input or autopilot
/// output).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    /// Ship-local thrust command, each component in `[-1, 1]`.
    /// `z` drives the main engine; `x`/`y` are reserved for translational RCS.
    pub thrust_vector: DVec3,
    /// Commanded rotation rates (deg/s)
    pub rotation_rate_deg_s: Euler,
    /// Free-form hint describing who set these controls; never affects
    /// behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Controls {
    /// Zero thrust and zero rotation, tagged with `mode`.
    #[must_use]
    pub fn idle(mode: &str) -> Self {
        Self {
            thrust_vector: DVec3::ZERO,
            rotation_rate_deg_s: Euler::ZERO,
            mode: Some(mode.to_string()),
        }
    }

    /// Returns `true` if no thrust and no rotation is commanded.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.thrust_vector == DVec3::ZERO && self.rotation_rate_deg_s == Euler::ZERO
    }
}

// =============================================================================
// Capability Caps
// =============================================================================

/// Propulsion and attitude-control capability of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsLimits {
    /// Main engine thrust at full throttle (N)
    pub max_main_thrust_newton: f64,
    /// Yaw rate cap (deg/s)
    pub max_rcs_yaw_deg_s: f64,
    /// Pitch rate cap (deg/s)
    pub max_rcs_pitch_deg_s: f64,
    /// Roll rate cap (deg/s)
    pub max_rcs_roll_deg_s: f64,
    /// Translational RCS acceleration cap (m/s^2), reserved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rcs_linear_m_s2: Option<f64>,
}

impl Default for PhysicsLimits {
    fn default() -> Self {
        Self {
            max_main_thrust_newton: 1_000_000.0,
            max_rcs_yaw_deg_s: 10.0,
            max_rcs_pitch_deg_s: 10.0,
            max_rcs_roll_deg_s: 10.0,
            max_rcs_linear_m_s2: Some(1.0),
        }
    }
}

impl PhysicsLimits {
    /// Per-axis rotation caps as an [`Euler`] triple.
    #[must_use]
    pub const fn rcs_caps(&self) -> Euler {
        Euler::new(
            self.max_rcs_yaw_deg_s,
            self.max_rcs_pitch_deg_s,
            self.max_rcs_roll_deg_s,
        )
    }

    /// Checks every cap is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] naming the first bad cap.
    pub fn validate(&self, subject: &str) -> Result<(), SimError> {
        require_non_negative(subject, "max_main_thrust_newton", self.max_main_thrust_newton)?;
        require_non_negative(subject, "max_rcs_yaw_deg_s", self.max_rcs_yaw_deg_s)?;
        require_non_negative(subject, "max_rcs_pitch_deg_s", self.max_rcs_pitch_deg_s)?;
        require_non_negative(subject, "max_rcs_roll_deg_s", self.max_rcs_roll_deg_s)?;
        if let Some(linear) = self.max_rcs_linear_m_s2 {
            require_non_negative(subject, "max_rcs_linear_m_s2", linear)?;
        }
        Ok(())
    }
}

// =============================================================================
// Sensors
// =============================================================================

/// Range/field-of-view envelope of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorProfile {
    /// Detection range (m). Zero or less disables the sensor.
    pub range_m: f64,
    /// Full field-of-view cone angle (deg), centred on the forward axis.
    /// 360 or more sees in every direction.
    pub fov_deg: f64,
    /// Detection strength multiplier
    pub sensitivity: f64,
}

impl Default for SensorProfile {
    fn default() -> Self {
        Self {
            range_m: 50_000.0,
            fov_deg: 360.0,
            sensitivity: 1.0,
        }
    }
}

impl SensorProfile {
    /// Returns `true` if the sensor can detect anything at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.range_m > 0.0
    }

    fn validate(&self, subject: &str, which: &str) -> Result<(), SimError> {
        require_non_negative(subject, &format!("{which}.range_m"), self.range_m)?;
        require_non_negative(subject, &format!("{which}.fov_deg"), self.fov_deg)?;
        require_non_negative(subject, &format!("{which}.sensitivity"), self.sensitivity)
    }
}

/// Sensor capability carried by a ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSuite {
    /// Continuous passive sensor, scanned every tick
    pub passive: SensorProfile,
    /// Active sensor, used by explicit pings
    pub active: SensorProfile,
    /// Active pings detect everything inside this radius (m) regardless of
    /// field of view or signature
    pub active_guaranteed_range_m: f64,
    /// Minimum time between performed active pings (s)
    pub ping_cooldown_s: f64,
    /// Electronic counter-countermeasure strength, offsets target ECM
    pub eccm_strength: f64,
}

impl Default for SensorSuite {
    fn default() -> Self {
        Self {
            passive: SensorProfile::default(),
            active: SensorProfile {
                range_m: 100_000.0,
                fov_deg: 60.0,
                sensitivity: 1.5,
            },
            active_guaranteed_range_m: 5_000.0,
            ping_cooldown_s: 5.0,
            eccm_strength: 0.0,
        }
    }
}

impl SensorSuite {
    /// Checks every sensor parameter is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] naming the first bad parameter.
    pub fn validate(&self, subject: &str) -> Result<(), SimError> {
        self.passive.validate(subject, "sensors.passive")?;
        self.active.validate(subject, "sensors.active")?;
        require_non_negative(
            subject,
            "sensors.active_guaranteed_range_m",
            self.active_guaranteed_range_m,
        )?;
        require_non_negative(subject, "sensors.ping_cooldown_s", self.ping_cooldown_s)?;
        require_non_negative(subject, "sensors.eccm_strength", self.eccm_strength)
    }
}

/// How visible a ship is to other ships' sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signature {
    /// Base radar return
    pub base_radar: f64,
    /// Electronic countermeasure strength
    pub ecm_strength: f64,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            base_radar: 1.0,
            ecm_strength: 0.0,
        }
    }
}

impl Signature {
    /// Checks both values are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] naming the bad value.
    pub fn validate(&self, subject: &str) -> Result<(), SimError> {
        require_non_negative(subject, "signature.base_radar", self.base_radar)?;
        require_non_negative(subject, "signature.ecm_strength", self.ecm_strength)
    }
}
