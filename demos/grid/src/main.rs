//! grid: agents wandering between lots on a synthetic street grid.
//!
//! Usage: `grid [config.json] [features.json]`
//!
//! Without arguments a 4 × 6 block grid is generated and the default
//! configuration is used.  The config file holds a (partial) `SimConfig`;
//! the features file is a feature document as read by
//! `am_spatial::loader`.
//!
//! Frames are fed at a synthetic 60 Hz in milliseconds, with a two-second
//! pause in the middle to show that paused wall time is not simulated.

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use am_core::{Place, SimConfig, Tick, UnitId};
use am_mobility::TripRequest;
use am_output::{CsvWriter, OutputWriter, SimOutputObserver};
use am_sim::{AgentHook, AgentView, SimBuilder, SimObserver, Simulation, Spawn, TickHook};
use am_spatial::loader::load_features_reader;

use network::build_grid;

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:    usize = 40;
const GRID_ROWS:      u32   = 4;
const GRID_COLS:      u32   = 6;
const SEED:           u64   = 42;
const FRAME_MS:       f64   = 1000.0 / 60.0;
const FRAMES:         u32   = 1_800;
const PAUSE_AT:       u32   = 600;
const PAUSE_FRAMES:   u32   = 120;
const SPEED_RANGE:    (f64, f64) = (1.0, 3.0);
const OUTPUT_DIR:     &str  = "output/grid";

// ── Hooks ─────────────────────────────────────────────────────────────────────

/// Sends every idle agent to a random point in a random lot.
struct Wander;

impl TickHook for Wander {
    fn on_tick(&mut self, sim: &mut Simulation) {
        let units: Vec<UnitId> = sim.features().units().map(|u| u.id).collect();
        for id in sim.agents().ids() {
            if !sim.agent(id).is_some_and(|a| a.trip.is_empty() && a.motion.is_none()) {
                continue;
            }
            let Some(&unit) = sim.rng.choose(&units) else {
                return;
            };
            let Ok(lot) = sim.features().unit(unit).cloned() else {
                continue;
            };
            let goal = lot.random_interior_point(&mut sim.rng);
            let speed = sim.rng.gen_range(SPEED_RANGE.0..SPEED_RANGE.1);
            if let Err(e) = sim.schedule_trip(id, TripRequest::to(goal, Place::Unit(unit), speed)) {
                log::warn!("agent {id}: could not schedule trip: {e}");
            }
        }
    }
}

/// Logs every place change of one agent.
struct Tracker {
    last: Option<Place>,
}

impl AgentHook for Tracker {
    fn on_tick(&mut self, agent: am_core::AgentId, sim: &mut Simulation) {
        let Some(place) = sim.agent(agent).map(|a| a.place) else {
            return;
        };
        if self.last != Some(place) {
            log::info!("{agent} is now in {place} at {}", sim.clock.tick);
            self.last = Some(place);
        }
    }
}

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    summary_rows:  usize,
    peak_moving:   usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, summary_rows: 0, peak_moving: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, time: f64, moving: usize) {
        self.summary_rows += 1;
        self.peak_moving = self.peak_moving.max(moving);
        self.inner.on_tick_end(tick, time, moving);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[AgentView]) {
        self.snapshot_rows += agents.len();
        self.inner.on_snapshot(tick, agents);
    }

    fn on_clear(&mut self) {
        self.inner.on_clear();
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&String>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig {
            step_precision:        0.01,
            sampling_interval:     10,
            sample_units_per_tick: FRAME_MS,
            seed:                  SEED,
            ..SimConfig::default()
        });
    };
    let file = File::open(path).with_context(|| format!("opening config {path}"))?;
    let config: SimConfig =
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {path}"))?;
    Ok(config)
}

fn load_features(path: Option<&String>) -> Result<am_spatial::MapFeatures> {
    let Some(path) = path else {
        return Ok(build_grid(GRID_ROWS, GRID_COLS));
    };
    let file = File::open(path).with_context(|| format!("opening features {path}"))?;
    load_features_reader(BufReader::new(file)).with_context(|| format!("loading features {path}"))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first())?;
    let features = load_features(args.get(1))?;

    println!("=== grid: agentmaps street simulation ===");
    println!(
        "Agents: {AGENT_COUNT}  |  Frames: {FRAMES}  |  Seed: {}",
        config.seed
    );

    // 1. Build the simulation.
    let mut sim = SimBuilder::new(config).features(features).snapshot_interval(30).build()?;
    println!(
        "Map: {} streets, {} units; graph {} nodes, {} edges",
        sim.features().street_count(),
        sim.features().unit_count(),
        sim.graph().node_count(),
        sim.graph().edge_count()
    );

    // 2. Agents and hooks.
    let ids = sim.spawn_agents(AGENT_COUNT, Spawn::RandomUnits)?;
    sim.set_tick_hook(Wander);
    if let Some(&first) = ids.first() {
        sim.set_agent_hook(first, Tracker { last: None })?;
    }

    // 3. Output.
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 4. Run.
    let t0 = Instant::now();
    sim.run();
    let mut frame_time = 0.0;
    for frame in 0..FRAMES + PAUSE_FRAMES {
        if frame == PAUSE_AT {
            sim.pause();
        } else if frame == PAUSE_AT + PAUSE_FRAMES {
            sim.run();
        }
        sim.tick(frame_time, &mut obs)?;
        frame_time += FRAME_MS;
    }
    sim.pause();
    let elapsed = t0.elapsed();
    obs.inner.finish()?;

    // 5. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks dispatched    : {}", sim.clock.tick.0);
    println!("  simulated ticks     : {:.1}", sim.clock.elapsed_ticks());
    println!("  peak moving agents  : {}", obs.peak_moving);
    println!("  agent_snapshots.csv : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv  : {} rows", obs.summary_rows);
    println!();

    // 6. Final agent positions table.
    println!("{:<8} {:<12} {:<22} {:<7} {:<6}", "Agent", "Place", "Position", "Moving", "Queued");
    println!("{}", "-".repeat(58));
    for view in sim.views() {
        println!(
            "{:<8} {:<12} {:<22} {:<7} {:<6}",
            view.id.0,
            view.place.to_string(),
            view.position.to_string(),
            if view.moving { "yes" } else { "no" },
            view.queued,
        );
    }

    Ok(())
}
