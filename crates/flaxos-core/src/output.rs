//! Discrete events emitted by the simulation.
//!
//! Events are immutable records appended to the world's
//! [`EventLog`](crate::resolver::EventLog). Each carries a monotonically
//! increasing [`EventId`], the simulation time it was emitted at, the ship
//! whose sensor produced it, and a typed payload.
//!
//! # Wire Shape
//!
//! Events serialize flat, with the payload under `data` and its discriminant
//! under `type`:
//!
//! ```json
//! {
//!   "id": 3,
//!   "time": 12.0,
//!   "sensor_ship_id": "alpha",
//!   "target_entity_id": "bravo",
//!   "type": "sensor_contact_new",
//!   "data": { "range_m": 15000.0, "bearing_deg": 45.0, "detection": "passive" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entity::ShipId;
use crate::plugins::sensor::SensorMode;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique, monotonically increasing identifier for an event.
///
/// Ids start at 1 and are never reused, even after the log is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Creates a new event ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this event ID.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event:{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EventId> for u64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Why an active ping was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PingSkipReason {
    /// The previous ping was too recent
    Cooldown,
    /// The ship has no usable active sensor (range <= 0)
    NoActiveSensor,
}

/// Typed event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventKind {
    /// A target entered the observer's contact set.
    SensorContactNew {
        /// Range at detection (m)
        range_m: f64,
        /// Relative bearing at detection (deg, positive to starboard)
        bearing_deg: f64,
        /// Sensor that made the detection
        detection: SensorMode,
    },
    /// A target left the observer's contact set.
    SensorContactLost {
        /// Range when last seen (m)
        last_range_m: f64,
        /// Relative bearing when last seen (deg)
        last_bearing_deg: f64,
    },
    /// An active ping was requested.
    SensorPing {
        /// Whether the ping actually went out
        performed: bool,
        /// Why it did not, when `performed` is false
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<PingSkipReason>,
    },
}

impl EventKind {
    /// The wire name of this event type.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::SensorContactNew { .. } => "sensor_contact_new",
            Self::SensorContactLost { .. } => "sensor_contact_lost",
            Self::SensorPing { .. } => "sensor_ping",
        }
    }
}

// =============================================================================
// Event
// =============================================================================

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Log-assigned id
    pub id: EventId,
    /// Simulation time of emission (s)
    pub time: f64,
    /// Ship whose sensor produced the event
    pub sensor_ship_id: ShipId,
    /// Contact the event is about; absent for pings
    #[serde(default)]
    pub target_entity_id: Option<ShipId>,
    /// Typed payload
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// The wire name of this event's type.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }
}
