//! Sensor/contact engine.
//!
//! Turns ship positions into per-observer contact lists and emits events when
//! a contact appears or disappears.
//!
//! # Detection Policy
//!
//! A target is detected by a sensor profile when all of the following hold:
//!
//! - it is not the observer
//! - its range is within the profile range (a profile with range <= 0 sees
//!   nothing)
//! - its off-axis angle from the observer's forward axis is at most half the
//!   field of view (a field of view of 360 or more sees in every direction)
//! - its detection strength is at least the configured minimum
//!
//! Active pings also detect every target inside the guaranteed radius,
//! ignoring field of view and strength.
//!
//! # Contact Memory
//!
//! The engine remembers each observer's contact set. A passive scan replaces
//! it, emitting `sensor_contact_new` for new entries and `sensor_contact_lost`
//! for entries that vanished. An active ping only adds: it emits
//! `sensor_contact_new` for new entries and never loses a contact.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::config::SensorTuning;
use crate::entity::{SensorProfile, Ship, ShipId};
use crate::error::SimError;
use crate::math;
use crate::output::{EventKind, PingSkipReason};
use crate::resolver::EventLog;
use crate::world_view::{SensorTarget, WorldView};

/// Angular slack on the field-of-view boundary (degrees).
const FOV_EPSILON_DEG: f64 = 1e-9;

// =============================================================================
// Types
// =============================================================================

/// Which sensor made (or should make) a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    /// Continuous passive sensor
    Passive,
    /// Active ping
    Active,
}

impl SensorMode {
    /// The mode's wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passive" => Ok(Self::Passive),
            "active" => Ok(Self::Active),
            other => Err(SimError::InvalidSensorMode(other.to_string())),
        }
    }
}

/// One detected target, as seen by one observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Detected ship
    pub target_entity_id: ShipId,
    /// Range (m)
    pub range_m: f64,
    /// Azimuth relative to the observer's nose (deg, positive to starboard)
    pub bearing_deg: f64,
    /// Elevation relative to the observer's horizontal plane (deg)
    pub elevation_deg: f64,
    /// Sensor that made the detection
    pub detection: SensorMode,
    /// Detection strength
    pub strength: f64,
}

// =============================================================================
// Detection
// =============================================================================

/// Detection strength of `target` at `range_m` for a profile.
///
/// `sensitivity * base_radar * clamp(1 - ecm + eccm, 0.1, 2.0) * (1 - range/profile_range)`,
/// with the range factor floored at zero.
#[must_use]
pub fn detection_strength(
    profile: &SensorProfile,
    eccm: f64,
    target: &SensorTarget,
    range_m: f64,
) -> f64 {
    let countermeasures = (1.0 - target.signature.ecm_strength + eccm).clamp(0.1, 2.0);
    let range_factor = if profile.range_m > 0.0 {
        (1.0 - range_m / profile.range_m).max(0.0)
    } else {
        0.0
    };
    profile.sensitivity * target.signature.base_radar * countermeasures * range_factor
}

/// Runs one sensor sweep for `observer` over `targets`.
///
/// Contacts come back in target-id order when `targets` is sorted.
#[must_use]
pub fn detect(
    observer: &Ship,
    targets: &[SensorTarget],
    mode: SensorMode,
    tuning: &SensorTuning,
) -> Vec<Contact> {
    let suite = &observer.sensors;
    let profile = match mode {
        SensorMode::Passive => suite.passive,
        SensorMode::Active => suite.active,
    };
    if !profile.is_enabled() {
        return Vec::new();
    }

    let origin = observer.kinematics.position;
    let to_local = observer.kinematics.orientation.rotation().inverse();
    let guaranteed_m = match mode {
        SensorMode::Active => suite.active_guaranteed_range_m,
        SensorMode::Passive => 0.0,
    };

    targets
        .iter()
        .filter(|target| &target.id != observer.id())
        .filter_map(|target| {
            let offset = target.position - origin;
            let range_m = offset.length() * 1000.0;
            if !range_m.is_finite() {
                return None;
            }
            let local = to_local * offset;
            let strength = detection_strength(&profile, suite.eccm_strength, target, range_m);

            let guaranteed = range_m <= guaranteed_m;
            let sensed = range_m <= profile.range_m
                && within_fov(local, profile.fov_deg)
                && strength >= tuning.min_detection_strength;
            if !(guaranteed || sensed) {
                return None;
            }

            Some(Contact {
                target_entity_id: target.id.clone(),
                range_m,
                bearing_deg: local.x.atan2(local.z).to_degrees(),
                elevation_deg: local.y.atan2(local.x.hypot(local.z)).to_degrees(),
                detection: mode,
                strength,
            })
        })
        .collect()
}

/// Returns `true` if a ship-local offset lies inside a cone of `fov_deg`
/// around +Z. The boundary is inclusive.
fn within_fov(local: DVec3, fov_deg: f64) -> bool {
    if fov_deg >= 360.0 {
        return true;
    }
    if local.length_squared() <= math::DIRECTION_EPSILON {
        return true;
    }
    let off_axis = math::angle_between_deg(DVec3::Z, local);
    off_axis <= fov_deg / 2.0 + FOV_EPSILON_DEG
}

// =============================================================================
// Engine
// =============================================================================

/// Per-observer contact memory and ping bookkeeping.
///
/// # Example
///
/// ```
/// use flaxos_core::entity::Ship;
/// use flaxos_core::plugins::sensor::{SensorEngine, SensorMode};
/// use flaxos_core::resolver::EventLog;
/// use flaxos_core::world_view::WorldView;
/// use glam::DVec3;
///
/// let alpha = Ship::new("alpha", 1.0e6).unwrap();
/// let bravo = Ship::new("bravo", 1.0e6).unwrap().with_position(DVec3::new(0.0, 0.0, 10.0));
/// let view = WorldView::capture([&alpha, &bravo]);
///
/// let mut engine = SensorEngine::default();
/// let mut log = EventLog::new();
/// let contacts = engine.scan(&alpha, &view, SensorMode::Passive, 1.0, &mut log);
///
/// assert_eq!(contacts.len(), 1);
/// assert_eq!(log.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SensorEngine {
    tuning: SensorTuning,
    memory: BTreeMap<ShipId, BTreeMap<ShipId, Contact>>,
    last_ping_s: BTreeMap<ShipId, f64>,
}

impl SensorEngine {
    /// Creates an engine with no remembered contacts.
    #[must_use]
    pub fn new(tuning: SensorTuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    /// Runs a scan in the given mode and returns the observer's contacts.
    pub fn scan(
        &mut self,
        observer: &Ship,
        view: &WorldView,
        mode: SensorMode,
        time_s: f64,
        log: &mut EventLog,
    ) -> Vec<Contact> {
        match mode {
            SensorMode::Passive => self.passive_scan(observer, view, time_s, log),
            SensorMode::Active => self.active_ping(observer, view, time_s, log),
        }
    }

    /// Replaces the observer's contact set with a fresh passive sweep.
    ///
    /// New contacts are announced first, then lost ones, each group in
    /// target-id order.
    pub fn passive_scan(
        &mut self,
        observer: &Ship,
        view: &WorldView,
        time_s: f64,
        log: &mut EventLog,
    ) -> Vec<Contact> {
        let observer_id = observer.id();
        let detected: BTreeMap<ShipId, Contact> =
            detect(observer, view.targets(), SensorMode::Passive, &self.tuning)
                .into_iter()
                .map(|c| (c.target_entity_id.clone(), c))
                .collect();
        let previous = self.memory.remove(observer_id).unwrap_or_default();

        for (id, contact) in &detected {
            if !previous.contains_key(id) {
                announce_new(log, time_s, observer_id, contact);
            }
        }
        for (id, contact) in &previous {
            if !detected.contains_key(id) {
                trace!(observer = %observer_id, target = %id, "contact lost");
                log.record(
                    time_s,
                    observer_id.clone(),
                    Some(id.clone()),
                    EventKind::SensorContactLost {
                        last_range_m: contact.range_m,
                        last_bearing_deg: contact.bearing_deg,
                    },
                );
            }
        }

        let contacts = detected.values().cloned().collect();
        if !detected.is_empty() {
            self.memory.insert(observer_id.clone(), detected);
        }
        contacts
    }

    /// Performs an active ping, subject to cooldown, and merges its
    /// detections into the observer's contact set.
    ///
    /// Always records a `sensor_ping` event and returns the remembered
    /// contacts, whether or not the ping went out.
    pub fn active_ping(
        &mut self,
        observer: &Ship,
        view: &WorldView,
        time_s: f64,
        log: &mut EventLog,
    ) -> Vec<Contact> {
        let observer_id = observer.id();
        let suite = &observer.sensors;

        let skip = if !suite.active.is_enabled() {
            Some(PingSkipReason::NoActiveSensor)
        } else if self
            .last_ping_s
            .get(observer_id)
            .is_some_and(|last| time_s - last < suite.ping_cooldown_s)
        {
            Some(PingSkipReason::Cooldown)
        } else {
            None
        };

        log.record(
            time_s,
            observer_id.clone(),
            None,
            EventKind::SensorPing {
                performed: skip.is_none(),
                reason: skip,
            },
        );
        if let Some(reason) = skip {
            trace!(observer = %observer_id, ?reason, "ping skipped");
            return self.contacts_for(observer_id);
        }

        self.last_ping_s.insert(observer_id.clone(), time_s);
        let remembered = self.memory.entry(observer_id.clone()).or_default();
        for contact in detect(observer, view.targets(), SensorMode::Active, &self.tuning) {
            if !remembered.contains_key(&contact.target_entity_id) {
                announce_new(log, time_s, observer_id, &contact);
            }
            remembered.insert(contact.target_entity_id.clone(), contact);
        }
        self.contacts_for(observer_id)
    }

    /// The observer's remembered contacts, in target-id order.
    #[must_use]
    pub fn contacts_for(&self, observer: &ShipId) -> Vec<Contact> {
        self.memory
            .get(observer)
            .map(|contacts| contacts.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Drops everything remembered for `observer`.
    pub fn forget(&mut self, observer: &ShipId) {
        self.memory.remove(observer);
        self.last_ping_s.remove(observer);
    }

    /// Drops all contact memory and ping history.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.last_ping_s.clear();
    }
}

fn announce_new(log: &mut EventLog, time_s: f64, observer: &ShipId, contact: &Contact) {
    trace!(
        observer = %observer,
        target = %contact.target_entity_id,
        range_m = contact.range_m,
        "contact acquired"
    );
    log.record(
        time_s,
        observer.clone(),
        Some(contact.target_entity_id.clone()),
        EventKind::SensorContactNew {
            range_m: contact.range_m,
            bearing_deg: contact.bearing_deg,
            detection: contact.detection,
        },
    );
}

// =============================================================================
// Tests
// =============================================================================
