//! Plain data row types written by output backends.

use am_core::Place;
use am_sim::AgentView;

/// One agent's position and travel state at a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id: u32,
    pub tick:     u64,
    pub lat:      f64,
    pub lon:      f64,
    pub place:    Place,
    /// Heading of the active leg in degrees; `None` while idle.
    pub bearing:  Option<f64>,
    pub moving:   bool,
    pub queued:   u32,
}

impl AgentSnapshotRow {
    pub fn new(tick: u64, view: &AgentView) -> Self {
        Self {
            agent_id: view.id.0,
            tick,
            lat:      view.position.lat,
            lon:      view.position.lon,
            place:    view.place,
            bearing:  view.bearing,
            moving:   view.moving,
            queued:   view.queued as u32,
        }
    }
}

/// Summary statistics for one dispatched tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:          u64,
    /// Simulated time in ticks since the first frame.
    pub time:          f64,
    pub moving_agents: u64,
}
