//! The world-owned event log.
//!
//! The log is append-only: events are never mutated, and they are only
//! removed by an explicit [`EventLog::clear`]. Reading with
//! [`EventLog::since`] never removes anything, so several clients can poll the
//! same log independently.

use crate::entity::ShipId;
use crate::output::{Event, EventId, EventKind};

/// Append-only log of simulation events.
///
/// # Example
///
/// ```
/// use flaxos_core::entity::ShipId;
/// use flaxos_core::output::EventKind;
/// use flaxos_core::resolver::EventLog;
///
/// let mut log = EventLog::new();
/// let kind = EventKind::SensorPing { performed: true, reason: None };
/// let id = log.record(1.0, ShipId::from("alpha"), None, kind);
///
/// assert_eq!(id.as_u64(), 1);
/// assert_eq!(log.since(0.0).len(), 1);
/// assert!(log.since(1.0).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    next_id: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Creates an empty log whose first event gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends an event and returns its id.
    pub fn record(
        &mut self,
        time: f64,
        sensor_ship_id: ShipId,
        target_entity_id: Option<ShipId>,
        kind: EventKind,
    ) -> EventId {
        let id = EventId::new(self.next_id);
        self.next_id += 1;
        self.events.push(Event {
            id,
            time,
            sensor_ship_id,
            target_entity_id,
            kind,
        });
        id
    }

    /// Events with `time > since_time`, ordered by time then id.
    ///
    /// Nothing is removed from the log.
    #[must_use]
    pub fn since(&self, since_time: f64) -> Vec<Event> {
        let mut out: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.time > since_time)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.id.cmp(&b.id)));
        out
    }

    /// Events with an id greater than `last_seen`, in id order.
    #[must_use]
    pub fn since_id(&self, last_seen: EventId) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.id > last_seen)
            .cloned()
            .collect()
    }

    /// Number of events held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the log holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates events in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Id the next recorded event will receive.
    #[must_use]
    pub const fn next_id(&self) -> EventId {
        EventId::new(self.next_id)
    }

    /// Removes every event. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
