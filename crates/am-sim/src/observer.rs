//! Observer trait and the read-only agent projection it receives.

use am_agent::Agent;
use am_core::{AgentId, GeoPoint, Place, Tick};
use am_mobility::StepObserver;

/// Read-only view of one agent, as published to observers.
///
/// Observers never see the live [`Agent`], so nothing they do can alter
/// movement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentView {
    pub id:       AgentId,
    pub position: GeoPoint,
    pub place:    Place,
    /// Heading of the active leg in degrees; `None` while idle.
    pub bearing:  Option<f64>,
    pub moving:   bool,
    /// Waypoints still queued, including the active leg's goal.
    pub queued:   usize,
}

impl AgentView {
    pub fn of(agent: &Agent) -> Self {
        Self {
            id:       agent.id,
            position: agent.position,
            place:    agent.place,
            bearing:  agent.bearing(),
            moving:   agent.is_moving(),
            queued:   agent.trip.len(),
        }
    }
}

/// Callbacks invoked by [`Simulation::tick`][crate::Simulation::tick].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, _time: f64, moving: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {moving} agents moving");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of each dispatched tick, before any hook runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called every `config.sampling_interval` movement sub-steps of an
    /// agent, with its position at that moment.
    fn on_sample(&mut self, _tick: Tick, _agent: &AgentView) {}

    /// Called after movement.  `time` is simulated time in ticks since the
    /// first frame; `moving` counts agents still travelling.
    fn on_tick_end(&mut self, _tick: Tick, _time: f64, _moving: usize) {}

    /// Called at snapshot intervals with every live agent in id order.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &[AgentView]) {}

    /// Called when the simulation is cleared.
    fn on_clear(&mut self) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

// ── Step bridge ───────────────────────────────────────────────────────────────

/// Routes the movement engine's per-step callbacks to the host's step hook
/// and forwards samples to the tick observer.
pub(crate) struct StepBridge<'a, O: SimObserver + ?Sized> {
    pub tick:     Tick,
    pub hook:     Option<&'a mut Box<dyn StepObserver>>,
    pub observer: &'a mut O,
}

impl<O: SimObserver + ?Sized> StepObserver for StepBridge<'_, O> {
    fn before_step(&mut self, agent: &mut Agent) {
        if let Some(hook) = self.hook.as_mut() {
            hook.before_step(agent);
        }
    }

    fn after_step(&mut self, agent: &mut Agent) {
        if let Some(hook) = self.hook.as_mut() {
            hook.after_step(agent);
        }
    }

    fn on_sample(&mut self, agent: &Agent) {
        if let Some(hook) = self.hook.as_mut() {
            hook.on_sample(agent);
        }
        self.observer.on_sample(self.tick, &AgentView::of(agent));
    }
}
