//! The `Simulation` struct and its frame-driven tick.

use std::collections::BTreeMap;

use am_agent::{Agent, AgentStore};
use am_core::{AgentId, GeoPoint, NodeId, Place, SimConfig, SimRng, UnitId};
use am_mobility::{self as mobility, MapView, MobilityEngine, StepObserver, TripRequest};
use am_spatial::{AStarRouter, MapFeatures, Router, StreetGraph};

use crate::observer::StepBridge;
use crate::{AgentHook, AgentView, FrameClock, SimError, SimObserver, SimResult, TickHook};

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Where [`Simulation::spawn_agents`] puts new agents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Spawn {
    /// Agent `i` starts at the centroid of the `i`-th unit (by id, wrapping).
    SequentialUnits,
    /// Each agent starts at a random interior point of a random unit.
    RandomUnits,
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Simulation<R>` owns the map, the street graph, every agent, and the frame
/// clock.  The host drives it by calling [`tick`](Self::tick) once per frame
/// sample; each dispatched tick runs, in order:
///
/// 1. **Tick hook**: the host's per-tick callback.
/// 2. **Agent hooks**: each attached agent hook, ascending `AgentId`, over a
///    snapshot of the agents alive when this phase began.  Agents removed
///    mid-phase are skipped; agents added mid-phase wait for the next tick.
/// 3. **Movement**: every live agent advances by the frame's elapsed time.
/// 4. **Observation**: `on_tick_end`, then `on_snapshot` at snapshot
///    intervals.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation<R: Router = AStarRouter> {
    /// Global configuration.  Validated by the builder.
    pub config: SimConfig,

    /// Frame clock: tick counter, simulated time, run/pause state.
    pub clock: FrameClock,

    /// Seeded from `config.seed`; available to hooks for reproducible
    /// random decisions.
    pub rng: SimRng,

    /// `on_snapshot` fires every this many ticks; 0 disables snapshots.
    pub snapshot_interval: u64,

    pub(crate) features:    MapFeatures,
    pub(crate) graph:       StreetGraph,
    pub(crate) agents:      AgentStore,
    pub(crate) engine:      MobilityEngine<R>,
    pub(crate) tick_hook:   Option<Box<dyn TickHook<R>>>,
    pub(crate) agent_hooks: BTreeMap<AgentId, Box<dyn AgentHook<R>>>,
    pub(crate) step_hook:   Option<Box<dyn StepObserver>>,
}

impl<R: Router> Simulation<R> {
    // ── Run state ─────────────────────────────────────────────────────────

    /// Start (or resume) dispatching ticks.  Idempotent.
    pub fn run(&mut self) {
        if self.clock.run() {
            log::info!("simulation running from {}", self.clock.tick);
        }
    }

    /// Stop dispatching ticks.  The tick counter and simulated time freeze
    /// until [`run`](Self::run) is called again.
    pub fn pause(&mut self) {
        if self.clock.pause() {
            log::info!("simulation paused at {}", self.clock.tick);
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Stop, zero the clock, and remove every agent, street, and unit.
    ///
    /// Host tick and step hooks stay installed; agent hooks go with their
    /// agents.  The RNG is re-seeded so a cleared simulation replays
    /// identically.
    pub fn clear<O: SimObserver + ?Sized>(&mut self, observer: &mut O) {
        self.clock.reset();
        self.agents.clear();
        self.agent_hooks.clear();
        self.features.clear();
        self.graph = StreetGraph::empty();
        self.rng = SimRng::new(self.config.seed);
        observer.on_clear();
        log::info!("simulation cleared");
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Feed one raw frame timestamp.
    ///
    /// Does nothing and returns `Ok(false)` while the simulation is not
    /// running.  Otherwise dispatches exactly one tick and returns `Ok(true)`.
    ///
    /// An error from any agent's movement aborts the rest of the tick and is
    /// returned; the tick still counts as dispatched.
    pub fn tick<O: SimObserver + ?Sized>(&mut self, timestamp: f64, observer: &mut O) -> SimResult<bool> {
        let Some((tick, elapsed)) = self.clock.sample(timestamp) else {
            return Ok(false);
        };
        observer.on_tick_start(tick);

        self.dispatch_tick_hook();
        self.dispatch_agent_hooks();

        let mut step_hook = self.step_hook.take();
        let moved = {
            let mut bridge = StepBridge { tick, hook: step_hook.as_mut(), observer: &mut *observer };
            move_agents(&mut self.agents, &self.engine, &self.config, elapsed, &mut bridge)
        };
        if self.step_hook.is_none() {
            self.step_hook = step_hook;
        }
        let arrivals = moved?;

        let moving = self.agents.iter().filter(|a| a.is_moving()).count();
        log::trace!("{tick}: elapsed {elapsed:.4}, {arrivals} arrival(s), {moving} moving");
        observer.on_tick_end(tick, self.clock.elapsed_ticks(), moving);

        if self.snapshot_interval > 0 && tick.0 % self.snapshot_interval == 0 {
            observer.on_snapshot(tick, &self.views());
        }
        Ok(true)
    }

    fn dispatch_tick_hook(&mut self) {
        if let Some(mut hook) = self.tick_hook.take() {
            hook.on_tick(self);
            if self.tick_hook.is_none() {
                self.tick_hook = Some(hook);
            }
        }
    }

    fn dispatch_agent_hooks(&mut self) {
        let ids: Vec<AgentId> = self.agent_hooks.keys().copied().collect();
        for id in ids {
            if !self.agents.contains(id) {
                continue;
            }
            let Some(mut hook) = self.agent_hooks.remove(&id) else {
                continue;
            };
            hook.on_tick(id, self);
            if self.agents.contains(id) {
                self.agent_hooks.entry(id).or_insert(hook);
            }
        }
    }

    // ── Hooks ─────────────────────────────────────────────────────────────

    /// Install the per-tick host hook, replacing any previous one.
    pub fn set_tick_hook(&mut self, hook: impl TickHook<R> + 'static) {
        self.tick_hook = Some(Box::new(hook));
    }

    pub fn clear_tick_hook(&mut self) {
        self.tick_hook = None;
    }

    /// Attach a per-tick hook to one agent, replacing any previous one.
    pub fn set_agent_hook(&mut self, id: AgentId, hook: impl AgentHook<R> + 'static) -> SimResult<()> {
        if !self.agents.contains(id) {
            return Err(SimError::AgentNotFound(id));
        }
        self.agent_hooks.insert(id, Box::new(hook));
        Ok(())
    }

    pub fn clear_agent_hook(&mut self, id: AgentId) {
        self.agent_hooks.remove(&id);
    }

    /// Install a hook run immediately before and after every movement
    /// sub-step of every agent.
    pub fn set_step_hook(&mut self, hook: impl StepObserver + 'static) {
        self.step_hook = Some(Box::new(hook));
    }

    pub fn clear_step_hook(&mut self) {
        self.step_hook = None;
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Add an idle agent at `position` in `place`.
    pub fn add_agent(&mut self, position: GeoPoint, place: Place) -> SimResult<AgentId> {
        self.features.check_place(place)?;
        let id = self.agents.insert(position, place);
        log::debug!("agent {id} added at {position} in {place}");
        Ok(id)
    }

    /// Remove an agent and its hook immediately.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        self.agent_hooks.remove(&id);
        let agent = self.agents.remove(id)?;
        log::debug!("agent {id} removed");
        Some(agent)
    }

    /// Create `count` idle agents placed in units.
    pub fn spawn_agents(&mut self, count: usize, spawn: Spawn) -> SimResult<Vec<AgentId>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let units: Vec<UnitId> = self.features.units().map(|u| u.id).collect();
        if units.is_empty() {
            return Err(SimError::NoUnits);
        }

        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let id = match spawn {
                Spawn::SequentialUnits => units[i % units.len()],
                Spawn::RandomUnits => units[self.rng.gen_range(0..units.len())],
            };
            let unit = self.features.unit(id)?;
            let position = match spawn {
                Spawn::SequentialUnits => unit.centroid(),
                Spawn::RandomUnits => unit.random_interior_point(&mut self.rng),
            };
            ids.push(self.agents.insert(position, Place::Unit(id)));
        }
        log::info!("spawned {count} agent(s) ({spawn:?})");
        Ok(ids)
    }

    #[inline]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    #[inline]
    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    /// Read-only views of every live agent in id order.
    pub fn views(&self) -> Vec<AgentView> {
        self.agents.iter().map(AgentView::of).collect()
    }

    // ── Trips ─────────────────────────────────────────────────────────────

    /// Compose and queue a trip for agent `id`.  Returns the number of
    /// waypoints queued.
    pub fn schedule_trip(&mut self, id: AgentId, req: TripRequest) -> SimResult<usize> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        let map = MapView { features: &self.features, graph: &self.graph };
        Ok(self.engine.schedule_trip(map, &self.config, agent, req)?)
    }

    pub fn pause_trip(&mut self, id: AgentId) -> SimResult<()> {
        mobility::pause_trip(self.agent_mut(id)?);
        Ok(())
    }

    pub fn resume_trip(&mut self, id: AgentId) -> SimResult<()> {
        Ok(mobility::resume_trip(self.agent_mut(id)?)?)
    }

    pub fn reset_trip(&mut self, id: AgentId) -> SimResult<()> {
        mobility::reset_trip(self.agent_mut(id)?);
        Ok(())
    }

    pub fn set_speed(&mut self, id: AgentId, speed: f64) -> SimResult<()> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        Ok(mobility::set_speed(agent, speed, &self.config)?)
    }

    pub fn multiply_speed(&mut self, id: AgentId, factor: f64) -> SimResult<()> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        Ok(mobility::multiply_speed(agent, factor, &self.config)?)
    }

    pub fn increase_speed(&mut self, id: AgentId, delta: f64) -> SimResult<()> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        Ok(mobility::increase_speed(agent, delta, &self.config)?)
    }

    fn agent_mut(&mut self, id: AgentId) -> SimResult<&mut Agent> {
        self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))
    }

    // ── Map ───────────────────────────────────────────────────────────────

    #[inline]
    pub fn features(&self) -> &MapFeatures {
        &self.features
    }

    /// Mutable access to streets and units.  Call
    /// [`rebuild_graph`](Self::rebuild_graph) after changing streets.
    #[inline]
    pub fn features_mut(&mut self) -> &mut MapFeatures {
        &mut self.features
    }

    #[inline]
    pub fn graph(&self) -> &StreetGraph {
        &self.graph
    }

    /// Rebuild the street graph from the current streets.  Removed directed
    /// edges come back.
    pub fn rebuild_graph(&mut self) {
        self.graph = StreetGraph::build(self.features.streets());
    }

    /// Make the edge `from → to` impassable until the next rebuild.
    pub fn remove_directed_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        self.graph.remove_directed_edge(from, to)
    }
}

/// Advance every live agent by `elapsed` ticks.  Returns total arrivals.
fn move_agents<R: Router>(
    agents:   &mut AgentStore,
    engine:   &MobilityEngine<R>,
    config:   &SimConfig,
    elapsed:  f64,
    observer: &mut dyn StepObserver,
) -> SimResult<usize> {
    let mut arrivals = 0;
    for agent in agents.iter_mut() {
        arrivals += engine.advance(agent, elapsed, config, observer)?;
    }
    Ok(arrivals)
}
