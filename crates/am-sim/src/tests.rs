//! Integration tests for am-sim.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use am_agent::Agent;
use am_core::{AgentId, GeoPoint, Place, SimConfig, StreetId, Tick, UnitId};
use am_mobility::{MobilityError, StepObserver, TripRequest};
use am_spatial::{annotate_intersections, MapFeatures, Street, Unit, UnitNeighbors};

use crate::{AgentView, NoopObserver, SimBuilder, SimError, SimObserver, Simulation};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: StreetId = StreetId(1);
const B: StreetId = StreetId(2);
const U1: UnitId = UnitId(1);
const U2: UnitId = UnitId(2);

fn p(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

fn close(a: GeoPoint, b: GeoPoint) -> bool {
    a.distance(b) < 1e-6
}

/// A 10×10 lot north of street A between `lon` and `lon + 10`, set back 2.
fn lot(id: UnitId, lon: f64) -> Unit {
    Unit {
        id,
        polygon: vec![p(2.0, lon), p(2.0, lon + 10.0), p(12.0, lon + 10.0), p(12.0, lon)],
        street: A,
        anchors: [p(2.0, lon), p(2.0, lon + 10.0)],
        neighbors: UnitNeighbors::default(),
    }
}

/// Street A (0,0) → (0,100) with lots U1 over lon 45..55 and U2 over 55..65.
fn strip() -> MapFeatures {
    MapFeatures::from_records(
        vec![Street::new(A, vec![p(0.0, 0.0), p(0.0, 100.0)])],
        vec![lot(U1, 45.0), lot(U2, 55.0)],
    )
}

/// Streets A (along lat 0) and B (along lon 50) crossing at (0, 50).
fn cross() -> MapFeatures {
    let mut streets = vec![
        Street::new(A, vec![p(0.0, 0.0), p(0.0, 50.0), p(0.0, 100.0)]),
        Street::new(B, vec![p(-50.0, 50.0), p(0.0, 50.0), p(50.0, 50.0)]),
    ];
    annotate_intersections(&mut streets);
    MapFeatures::from_records(streets, vec![])
}

fn config() -> SimConfig {
    SimConfig { step_precision: 0.01, seed: 7, ..SimConfig::default() }
}

fn sim_with(features: MapFeatures) -> Simulation {
    SimBuilder::new(config()).features(features).build().unwrap()
}

/// Feed frames `from..to` one raw unit apart.
fn frames<O: SimObserver>(sim: &mut Simulation, from: u32, to: u32, observer: &mut O) {
    for t in from..to {
        sim.tick(t as f64, observer).unwrap();
    }
}

type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

#[derive(Default)]
struct Counter {
    starts:    usize,
    ends:      usize,
    samples:   usize,
    snapshots: Vec<(Tick, usize)>,
    cleared:   bool,
    moving:    Vec<usize>,
}

impl SimObserver for Counter {
    fn on_tick_start(&mut self, _t: Tick) { self.starts += 1; }
    fn on_sample(&mut self, _t: Tick, _a: &AgentView) { self.samples += 1; }
    fn on_tick_end(&mut self, _t: Tick, _time: f64, moving: usize) {
        self.ends += 1;
        self.moving.push(moving);
    }
    fn on_snapshot(&mut self, t: Tick, agents: &[AgentView]) { self.snapshots.push((t, agents.len())); }
    fn on_clear(&mut self) { self.cleared = true; }
}

// ── FrameClock ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod clock_tests {
    use super::*;
    use crate::FrameClock;

    #[test]
    fn stopped_clock_takes_no_samples() {
        let mut clock = FrameClock::new(1.0);
        assert_eq!(clock.sample(10.0), None);
        assert_eq!(clock.tick, Tick::ZERO);
    }

    #[test]
    fn first_sample_zeroes_simulated_time() {
        let mut clock = FrameClock::new(1.0);
        clock.run();
        assert_eq!(clock.sample(500.0), Some((Tick(0), 0.0)));
        assert_eq!(clock.time, 0.0);
        assert_eq!(clock.start_delay, 500.0);
        assert_eq!(clock.sample(503.0), Some((Tick(1), 3.0)));
        assert_eq!(clock.tick, Tick(2));
    }

    #[test]
    fn elapsed_is_scaled_by_units_per_tick() {
        let mut clock = FrameClock::new(1000.0 / 60.0);
        clock.run();
        clock.sample(0.0);
        let (_, elapsed) = clock.sample(1000.0).unwrap();
        assert!((elapsed - 60.0).abs() < 1e-9);
        assert!((clock.elapsed_ticks() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn pause_freezes_and_resume_frame_has_zero_elapsed() {
        let mut clock = FrameClock::new(1.0);
        clock.run();
        clock.sample(0.0);
        clock.sample(1.0);
        assert!(clock.pause());
        for t in 2..6 {
            assert_eq!(clock.sample(t as f64), None);
        }
        assert_eq!(clock.tick, Tick(2));

        assert!(clock.run());
        assert_eq!(clock.sample(10.0), Some((Tick(2), 0.0)));
        assert_eq!(clock.time, 1.0);
        assert_eq!(clock.sample(11.0), Some((Tick(3), 1.0)));
        assert_eq!(clock.elapsed_ticks(), 2.0);
    }

    #[test]
    fn run_is_idempotent() {
        let mut clock = FrameClock::new(1.0);
        assert!(clock.run());
        clock.sample(0.0);
        clock.sample(4.0);
        assert!(!clock.run());
        // A redundant run must not be mistaken for a resume.
        assert_eq!(clock.sample(5.0), Some((Tick(2), 1.0)));
    }

    #[test]
    fn backwards_timestamp_yields_no_elapsed_time() {
        let mut clock = FrameClock::new(1.0);
        clock.run();
        clock.sample(10.0);
        let (_, elapsed) = clock.sample(8.0).unwrap();
        assert_eq!(elapsed, 0.0);
    }

    #[test]
    fn reset_returns_to_unstarted() {
        let mut clock = FrameClock::new(2.0);
        clock.run();
        clock.sample(3.0);
        clock.reset();
        assert_eq!(clock, FrameClock::new(2.0));
        assert!(!clock.is_running());
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_stopped_with_graph() {
        let sim = sim_with(strip());
        assert!(!sim.is_running());
        assert!(sim.agents().is_empty());
        assert_eq!(sim.graph().node_count(), 2);
        assert_eq!(sim.features().unit_count(), 2);
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = SimConfig { step_precision: 0.0, ..SimConfig::default() };
        let err = SimBuilder::new(bad).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn empty_map_builds() {
        let sim = SimBuilder::new(SimConfig::default()).build().unwrap();
        assert!(sim.graph().is_empty());
    }
}

// ── Tick dispatch ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick_tests {
    use super::*;

    #[test]
    fn tick_is_noop_until_run() {
        let mut sim = sim_with(strip());
        let mut obs = Counter::default();
        assert!(!sim.tick(0.0, &mut obs).unwrap());
        assert_eq!(sim.clock.tick, Tick::ZERO);
        assert_eq!(obs.starts, 0);
    }

    #[test]
    fn pause_freezes_tick_count() {
        let mut sim = sim_with(strip());
        let mut obs = Counter::default();
        sim.run();
        frames(&mut sim, 0, 5, &mut obs);
        sim.pause();
        frames(&mut sim, 5, 10, &mut obs);
        assert_eq!(sim.clock.tick, Tick(5));
        sim.run();
        frames(&mut sim, 10, 15, &mut obs);
        assert_eq!(sim.clock.tick, Tick(10));
        assert_eq!(obs.starts, 10);
        assert_eq!(obs.ends, 10);
    }

    #[test]
    fn paused_interval_does_not_move_agents() {
        let mut sim = sim_with(strip());
        let id = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        sim.schedule_trip(id, TripRequest::to(p(0.0, 90.0), Place::Street(A), 1.0)).unwrap();
        sim.run();
        frames(&mut sim, 0, 3, &mut NoopObserver);
        sim.pause();
        sim.run();
        // Thirty raw units pass while paused; only the frames after the
        // resume frame contribute.
        frames(&mut sim, 33, 36, &mut NoopObserver);
        let lon = sim.agent(id).unwrap().position.lon;
        assert!((lon - 4.0).abs() < 1e-6, "lon = {lon}");
    }

    #[test]
    fn agent_travels_in_simulated_ticks() {
        let mut sim = sim_with(strip());
        let id = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        sim.schedule_trip(id, TripRequest::to(p(0.0, 20.0), Place::Street(A), 1.0)).unwrap();
        let mut obs = Counter::default();
        sim.run();

        frames(&mut sim, 0, 11, &mut obs);
        let agent = sim.agent(id).unwrap();
        assert!(close(agent.position, p(0.0, 10.0)), "{}", agent.position);
        assert!(agent.is_moving());

        frames(&mut sim, 11, 21, &mut obs);
        let agent = sim.agent(id).unwrap();
        assert_eq!(agent.position, p(0.0, 20.0));
        assert!(!agent.is_moving());
        assert_eq!(obs.moving.last(), Some(&0));
        assert_eq!(obs.moving[1], 1);
    }

    #[test]
    fn samples_follow_sampling_interval() {
        let config = SimConfig { sampling_interval: 100, ..config() };
        let mut sim = SimBuilder::new(config).features(strip()).build().unwrap();
        let id = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        sim.schedule_trip(id, TripRequest::to(p(0.0, 90.0), Place::Street(A), 1.0)).unwrap();
        let mut obs = Counter::default();
        sim.run();
        frames(&mut sim, 0, 4, &mut obs);
        assert_eq!(obs.samples, 3);
    }

    #[test]
    fn snapshots_follow_snapshot_interval() {
        let mut sim = SimBuilder::new(config())
            .features(strip())
            .snapshot_interval(2)
            .build()
            .unwrap();
        sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        sim.add_agent(p(0.0, 5.0), Place::Street(A)).unwrap();
        let mut obs = Counter::default();
        sim.run();
        frames(&mut sim, 0, 5, &mut obs);
        assert_eq!(obs.snapshots, vec![(Tick(0), 2), (Tick(2), 2), (Tick(4), 2)]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut sim = sim_with(strip());
        sim.spawn_agents(3, crate::Spawn::SequentialUnits).unwrap();
        sim.run();
        frames(&mut sim, 0, 3, &mut NoopObserver);

        let mut obs = Counter::default();
        sim.clear(&mut obs);
        assert!(obs.cleared);
        assert!(!sim.is_running());
        assert_eq!(sim.clock.tick, Tick::ZERO);
        assert!(sim.agents().is_empty());
        assert!(sim.features().is_empty());
        assert!(sim.graph().is_empty());
        assert!(!sim.tick(10.0, &mut obs).unwrap());
    }
}

// ── Hooks ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod hook_tests {
    use super::*;

    struct FirstStep {
        log:  Log,
        seen: bool,
    }

    impl StepObserver for FirstStep {
        fn before_step(&mut self, _agent: &mut Agent) {
            if !self.seen {
                self.seen = true;
                push(&self.log, "step");
            }
        }
    }

    struct Bracket(Log);

    impl SimObserver for Bracket {
        fn on_tick_start(&mut self, _t: Tick) { push(&self.0, "start"); }
        fn on_tick_end(&mut self, _t: Tick, _time: f64, _moving: usize) { push(&self.0, "end"); }
    }

    #[test]
    fn tick_phases_run_in_order() {
        let log: Log = Rc::default();
        let mut sim = sim_with(strip());
        let a0 = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        let a1 = sim.add_agent(p(0.0, 1.0), Place::Street(A)).unwrap();
        sim.schedule_trip(a0, TripRequest::to(p(0.0, 90.0), Place::Street(A), 1.0)).unwrap();

        let l = log.clone();
        sim.set_tick_hook(move |_: &mut Simulation| push(&l, "tick"));
        // Attached out of order; dispatch is by ascending id.
        let l = log.clone();
        sim.set_agent_hook(a1, move |id: AgentId, _: &mut Simulation| push(&l, format!("agent{}", id.0))).unwrap();
        let l = log.clone();
        sim.set_agent_hook(a0, move |id: AgentId, _: &mut Simulation| push(&l, format!("agent{}", id.0))).unwrap();
        sim.set_step_hook(FirstStep { log: log.clone(), seen: false });

        let mut obs = Bracket(log.clone());
        sim.run();
        frames(&mut sim, 0, 2, &mut obs);

        // The first frame has no elapsed time, so no movement step.
        assert_eq!(
            *log.borrow(),
            ["start", "tick", "agent0", "agent1", "end", "start", "tick", "agent0", "agent1", "step", "end"]
        );
    }

    #[test]
    fn agent_removed_mid_tick_is_skipped() {
        let log: Log = Rc::default();
        let mut sim = sim_with(strip());
        let a0 = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        let a1 = sim.add_agent(p(0.0, 1.0), Place::Street(A)).unwrap();
        sim.schedule_trip(a1, TripRequest::to(p(0.0, 90.0), Place::Street(A), 1.0)).unwrap();

        sim.set_agent_hook(a0, move |_: AgentId, sim: &mut Simulation| {
            sim.remove_agent(a1);
        })
        .unwrap();
        let l = log.clone();
        sim.set_agent_hook(a1, move |_: AgentId, _: &mut Simulation| push(&l, "a1")).unwrap();

        sim.run();
        frames(&mut sim, 0, 3, &mut NoopObserver);
        assert!(log.borrow().is_empty());
        assert!(sim.agent(a1).is_none());
        assert_eq!(sim.agents().len(), 1);
    }

    #[test]
    fn tick_hook_schedules_trips() {
        let mut sim = sim_with(strip());
        let id = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        sim.set_tick_hook(move |sim: &mut Simulation| {
            if sim.agent(id).is_some_and(|a| a.trip.is_empty() && a.position.lon < 1.0) {
                sim.schedule_trip(id, TripRequest::to(p(0.0, 10.0), Place::Street(A), 2.0)).unwrap();
            }
        });
        sim.run();
        frames(&mut sim, 0, 7, &mut NoopObserver);
        assert_eq!(sim.agent(id).unwrap().position, p(0.0, 10.0));
    }

    #[test]
    fn hook_can_replace_itself() {
        let calls = Rc::new(Cell::new((0u32, 0u32)));
        let mut sim = sim_with(strip());
        let c = calls.clone();
        sim.set_tick_hook(move |sim: &mut Simulation| {
            c.set((c.get().0 + 1, c.get().1));
            let c2 = c.clone();
            sim.set_tick_hook(move |_: &mut Simulation| c2.set((c2.get().0, c2.get().1 + 1)));
        });
        sim.run();
        frames(&mut sim, 0, 4, &mut NoopObserver);
        assert_eq!(calls.get(), (1, 3));
    }

    #[test]
    fn agent_hook_requires_live_agent() {
        let mut sim = sim_with(strip());
        let err = sim.set_agent_hook(AgentId(3), |_: AgentId, _: &mut Simulation| {}).unwrap_err();
        assert!(matches!(err, SimError::AgentNotFound(AgentId(3))));
    }
}

// ── Agents, spawning, and control ─────────────────────────────────────────────

#[cfg(test)]
mod agent_tests {
    use super::*;
    use crate::Spawn;

    #[test]
    fn sequential_spawn_uses_unit_centroids() {
        let mut sim = sim_with(strip());
        let ids = sim.spawn_agents(3, Spawn::SequentialUnits).unwrap();
        let places: Vec<Place> = ids.iter().map(|&id| sim.agent(id).unwrap().place).collect();
        assert_eq!(places, [Place::Unit(U1), Place::Unit(U2), Place::Unit(U1)]);
        assert!(close(sim.agent(ids[0]).unwrap().position, p(7.0, 50.0)));
        assert!(close(sim.agent(ids[1]).unwrap().position, p(7.0, 60.0)));
    }

    #[test]
    fn random_spawn_is_inside_and_seeded() {
        let spawn = || {
            let mut sim = sim_with(strip());
            sim.spawn_agents(8, Spawn::RandomUnits).unwrap();
            sim.views()
        };
        let first = spawn();
        assert_eq!(first, spawn());

        let features = strip();
        for view in &first {
            let unit = features.unit(view.place.unit().unwrap()).unwrap();
            assert!(unit.contains(view.position, 0.0));
        }
    }

    #[test]
    fn spawn_without_units_fails() {
        let mut sim = sim_with(cross());
        assert!(matches!(sim.spawn_agents(1, Spawn::RandomUnits), Err(SimError::NoUnits)));
        assert!(sim.spawn_agents(0, Spawn::RandomUnits).unwrap().is_empty());
    }

    #[test]
    fn add_agent_checks_place() {
        let mut sim = sim_with(strip());
        let err = sim.add_agent(p(0.0, 0.0), Place::Unit(UnitId(9))).unwrap_err();
        assert!(matches!(err, SimError::Spatial(_)));
        assert!(sim.add_agent(p(3.0, 3.0), Place::Unanchored).is_ok());
    }

    #[test]
    fn controls_report_missing_agents() {
        let mut sim = sim_with(strip());
        let ghost = AgentId(4);
        let req = TripRequest::to(p(0.0, 10.0), Place::Street(A), 1.0);
        assert!(matches!(sim.schedule_trip(ghost, req), Err(SimError::AgentNotFound(_))));
        assert!(matches!(sim.pause_trip(ghost), Err(SimError::AgentNotFound(_))));
        assert!(matches!(sim.set_speed(ghost, 2.0), Err(SimError::AgentNotFound(_))));
    }

    #[test]
    fn mobility_errors_pass_through() {
        let mut sim = sim_with(strip());
        let id = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        let err = sim.schedule_trip(id, TripRequest::to(p(0.0, 10.0), Place::Street(A), 0.01)).unwrap_err();
        assert!(matches!(err, SimError::Mobility(MobilityError::SpeedTooLow { .. })));
        assert!(matches!(
            sim.resume_trip(id),
            Err(SimError::Mobility(MobilityError::EmptyTripStart(_)))
        ));
    }

    #[test]
    fn paused_trip_holds_position_across_ticks() {
        let mut sim = sim_with(strip());
        let id = sim.add_agent(p(0.0, 0.0), Place::Street(A)).unwrap();
        sim.schedule_trip(id, TripRequest::to(p(0.0, 90.0), Place::Street(A), 1.0)).unwrap();
        sim.run();
        frames(&mut sim, 0, 3, &mut NoopObserver);
        sim.pause_trip(id).unwrap();
        let held = sim.agent(id).unwrap().position;
        frames(&mut sim, 3, 6, &mut NoopObserver);
        assert_eq!(sim.agent(id).unwrap().position, held);

        sim.resume_trip(id).unwrap();
        sim.multiply_speed(id, 2.0).unwrap();
        frames(&mut sim, 6, 7, &mut NoopObserver);
        let lon = sim.agent(id).unwrap().position.lon;
        assert!((lon - (held.lon + 2.0)).abs() < 1e-6, "lon = {lon}");
    }

    #[test]
    fn removed_edge_disconnects_until_rebuild() {
        let mut sim = sim_with(cross());
        let id = sim.add_agent(p(0.0, 10.0), Place::Street(A)).unwrap();
        let hub = sim.graph().node_at(p(0.0, 50.0)).unwrap();
        let north = sim.graph().node_at(p(50.0, 50.0)).unwrap();
        assert!(sim.remove_directed_edge(hub, north));

        let req = TripRequest::to(p(40.0, 50.0), Place::Street(B), 1.0);
        let err = sim.schedule_trip(id, req).unwrap_err();
        assert!(matches!(err, SimError::Mobility(MobilityError::DisconnectedGraph { .. })));
        assert!(sim.agent(id).unwrap().trip.is_empty());

        sim.rebuild_graph();
        assert!(sim.schedule_trip(id, req).unwrap() > 0);
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let run = || {
            let mut sim = sim_with(strip());
            sim.spawn_agents(4, Spawn::RandomUnits).unwrap();
            sim.set_tick_hook(|sim: &mut Simulation| {
                let units: Vec<UnitId> = sim.features().units().map(|u| u.id).collect();
                for id in sim.agents().ids() {
                    if sim.agent(id).is_some_and(|a| a.trip.is_empty()) {
                        let unit = units[sim.rng.gen_range(0..units.len())];
                        let lot = sim.features().unit(unit).unwrap().clone();
                        let goal = lot.random_interior_point(&mut sim.rng);
                        sim.schedule_trip(id, TripRequest::to(goal, Place::Unit(unit), 3.0)).unwrap();
                    }
                }
            });
            sim.run();
            frames(&mut sim, 0, 40, &mut NoopObserver);
            sim.views()
        };
        assert_eq!(run(), run());
    }
}
