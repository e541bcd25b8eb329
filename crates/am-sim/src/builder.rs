//! Fluent builder for constructing a [`Simulation`].

use std::collections::BTreeMap;

use am_agent::AgentStore;
use am_core::{SimConfig, SimRng};
use am_mobility::{MobilityEngine, StepObserver};
use am_spatial::{AStarRouter, MapFeatures, Router, StreetGraph};

use crate::{FrameClock, SimResult, Simulation};

/// Fluent builder for [`Simulation<R>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                     |
/// |--------------------------|-----------------------------|
/// | `.features(f)`           | Empty map                   |
/// | `.router(r)`             | `AStarRouter`               |
/// | `.snapshot_interval(n)`  | `1` (every tick)            |
/// | `.step_hook(h)`          | None                        |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config)
///     .features(features)
///     .snapshot_interval(10)
///     .build()?;
/// sim.run();
/// sim.tick(timestamp, &mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router = AStarRouter> {
    config:            SimConfig,
    features:          MapFeatures,
    router:            R,
    snapshot_interval: u64,
    step_hook:         Option<Box<dyn StepObserver>>,
}

impl SimBuilder<AStarRouter> {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            features:          MapFeatures::new(),
            router:            AStarRouter,
            snapshot_interval: 1,
            step_hook:         None,
        }
    }
}

impl<R: Router> SimBuilder<R> {
    /// Streets and units to start with.  The street graph is built from
    /// them in [`build`](Self::build).
    pub fn features(mut self, features: MapFeatures) -> Self {
        self.features = features;
        self
    }

    /// Swap the routing algorithm.
    pub fn router<R2: Router>(self, router: R2) -> SimBuilder<R2> {
        SimBuilder {
            config:            self.config,
            features:          self.features,
            router,
            snapshot_interval: self.snapshot_interval,
            step_hook:         self.step_hook,
        }
    }

    /// Publish snapshots every `n` ticks; 0 disables them.
    pub fn snapshot_interval(mut self, n: u64) -> Self {
        self.snapshot_interval = n;
        self
    }

    pub fn step_hook(mut self, hook: impl StepObserver + 'static) -> Self {
        self.step_hook = Some(Box::new(hook));
        self
    }

    /// Validate the configuration, build the street graph, and return a
    /// stopped simulation with no agents.
    pub fn build(self) -> SimResult<Simulation<R>> {
        self.config.validate()?;
        let graph = StreetGraph::build(self.features.streets());
        log::info!(
            "simulation built: {} street(s), {} unit(s), seed {}",
            self.features.street_count(),
            self.features.unit_count(),
            self.config.seed
        );

        Ok(Simulation {
            clock:             FrameClock::new(self.config.sample_units_per_tick),
            rng:               SimRng::new(self.config.seed),
            snapshot_interval: self.snapshot_interval,
            features:          self.features,
            graph,
            agents:            AgentStore::new(),
            engine:            MobilityEngine::with_router(self.router),
            tick_hook:         None,
            agent_hooks:       BTreeMap::new(),
            step_hook:         self.step_hook,
            config:            self.config,
        })
    }
}
