//! Host-supplied per-tick callbacks.
//!
//! Hooks run inside [`Simulation::tick`] with mutable access to the whole
//! simulation, so they can schedule trips, change speeds, add or remove
//! agents, or edit the map.  While a hook runs it is detached from the
//! simulation; installing a replacement from inside the hook wins over
//! re-attaching the running one.
//!
//! Closures of the right shape implement both traits.

use am_core::AgentId;
use am_spatial::{AStarRouter, Router};

use crate::Simulation;

/// Called once per tick before any agent hook.
pub trait TickHook<R: Router = AStarRouter> {
    fn on_tick(&mut self, sim: &mut Simulation<R>);
}

/// Called once per tick for the agent it is attached to, after the tick
/// hook and before movement.
pub trait AgentHook<R: Router = AStarRouter> {
    fn on_tick(&mut self, agent: AgentId, sim: &mut Simulation<R>);
}

impl<R: Router, F: FnMut(&mut Simulation<R>)> TickHook<R> for F {
    fn on_tick(&mut self, sim: &mut Simulation<R>) {
        self(sim)
    }
}

impl<R: Router, F: FnMut(AgentId, &mut Simulation<R>)> AgentHook<R> for F {
    fn on_tick(&mut self, agent: AgentId, sim: &mut Simulation<R>) {
        self(agent, sim)
    }
}
