//! Agent records and the creation-ordered store that owns them.
//!
//! # Iteration during removal
//!
//! Agents are kept in a `Vec<Option<Agent>>` indexed by `AgentId`.  Removing
//! an agent leaves a hole rather than shifting later agents, so ids stay
//! valid and an id snapshot taken before a tick can be walked safely while
//! hooks remove agents: a removed id simply resolves to `None`.
//!
//! ```ignore
//! for id in store.ids() {              // snapshot
//!     let Some(agent) = store.get_mut(id) else { continue };
//!     ...
//! }
//! ```

use am_core::{AgentId, GeoPoint, Place};

use crate::{MovementState, Trip};

// ── Agent ─────────────────────────────────────────────────────────────────────

/// Plain-data agent record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,
    pub position: GeoPoint,
    /// Place of the most recently completed waypoint.
    pub place: Place,
    pub trip: Trip,
    /// Active leg; `None` while idle.
    pub motion: Option<MovementState>,
    /// Total movement sub-steps taken.  Only throttles observation.
    pub steps: u64,
}

impl Agent {
    pub fn new(id: AgentId, position: GeoPoint, place: Place) -> Self {
        Self {
            id,
            position,
            place,
            trip: Trip::new(),
            motion: None,
            steps: 0,
        }
    }

    /// `true` while the agent has an active leg and its trip is not paused.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.motion.is_some() && !self.trip.paused
    }

    /// Heading of the active leg in degrees, if any.
    #[inline]
    pub fn bearing(&self) -> Option<f64> {
        self.motion.as_ref().map(|m| m.bearing)
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// All agents, indexed by `AgentId` in creation order.
#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    slots: Vec<Option<Agent>>,
    live:  usize,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an idle agent and return its id.  Ids are never reused until
    /// [`clear`](Self::clear).
    pub fn insert(&mut self, position: GeoPoint, place: Place) -> AgentId {
        let id = AgentId(self.slots.len() as u32);
        self.slots.push(Some(Agent::new(id, position, place)));
        self.live += 1;
        id
    }

    /// Remove an agent immediately.  Returns `None` if it was already gone.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.slots.get_mut(id.index())?.take()?;
        self.live -= 1;
        Some(agent)
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Snapshot of live agent ids in creation order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|a| a.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.slots.iter_mut().flatten()
    }

    /// Number of live agents.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Remove every agent and restart id allocation at zero.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }
}
