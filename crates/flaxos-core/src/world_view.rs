//! Read-only snapshot of the ships other systems may observe.
//!
//! The tick advances ships in parallel, each worker owning one ship
//! exclusively. Anything a worker needs about *other* ships (the chase
//! target's position) and anything the sensor pass needs about every ship
//! comes from a `WorldView` captured beforehand, so no worker ever reads a
//! ship another worker is writing.

use glam::DVec3;
use serde::Serialize;

use crate::entity::{Ship, ShipId, Signature};

/// What an observer can learn about another ship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorTarget {
    /// Ship id
    pub id: ShipId,
    /// World position (km)
    pub position: DVec3,
    /// Radar signature and ECM
    pub signature: Signature,
}

impl SensorTarget {
    /// Captures the observable parts of `ship`.
    #[must_use]
    pub fn of(ship: &Ship) -> Self {
        Self {
            id: ship.id().clone(),
            position: ship.kinematics.position,
            signature: ship.signature,
        }
    }
}

/// Snapshot of every ship's observable state, sorted by id.
///
/// # Example
///
/// ```
/// use flaxos_core::entity::{Ship, ShipId};
/// use flaxos_core::world_view::WorldView;
/// use glam::DVec3;
///
/// let a = Ship::new("a", 1.0).unwrap().with_position(DVec3::X);
/// let b = Ship::new("b", 1.0).unwrap();
/// let view = WorldView::capture([&b, &a]);
///
/// assert_eq!(view.position_of(&ShipId::from("a")), Some(DVec3::X));
/// assert_eq!(view.targets()[0].id, ShipId::from("a"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldView {
    targets: Vec<SensorTarget>,
}

impl WorldView {
    /// Captures a snapshot of `ships`.
    pub fn capture<'a>(ships: impl IntoIterator<Item = &'a Ship>) -> Self {
        let mut targets: Vec<SensorTarget> = ships.into_iter().map(SensorTarget::of).collect();
        targets.sort_by(|a, b| a.id.cmp(&b.id));
        Self { targets }
    }

    /// Looks up a ship's observable state.
    #[must_use]
    pub fn get(&self, id: &ShipId) -> Option<&SensorTarget> {
        self.targets
            .binary_search_by(|t| t.id.cmp(id))
            .ok()
            .map(|index| &self.targets[index])
    }

    /// Looks up a ship's position (km).
    #[must_use]
    pub fn position_of(&self, id: &ShipId) -> Option<DVec3> {
        self.get(id).map(|t| t.position)
    }

    /// Every captured ship, in id order.
    #[must_use]
    pub fn targets(&self) -> &[SensorTarget] {
        &self.targets
    }

    /// Number of captured ships.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no ships were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
