//! Trip scheduling and sub-stepped movement.

use am_agent::{Agent, MovementState};
use am_core::SimConfig;
use am_spatial::geometry::COINCIDENT_TOLERANCE;
use am_spatial::{AStarRouter, PathFinder, Router};

use crate::compose::{compose, dedup_against_tail, MapView, TripRequest};
use crate::control::check_speed;
use crate::{MobilityResult, StepObserver};

/// Schedules trips through a [`PathFinder`] and advances agents along them.
///
/// # Type parameter
///
/// `R` must implement [`Router`] (e.g. [`AStarRouter`]).  Swap it at compile
/// time for a different search with no runtime overhead.
pub struct MobilityEngine<R: Router = AStarRouter> {
    pub finder: PathFinder<R>,
}

impl MobilityEngine<AStarRouter> {
    /// An engine routing with [`AStarRouter`].
    pub fn new() -> Self {
        Self::with_router(AStarRouter)
    }
}

impl Default for MobilityEngine<AStarRouter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Router> MobilityEngine<R> {
    pub fn with_router(router: R) -> Self {
        Self { finder: PathFinder::new(router) }
    }

    /// Compose a trip for `agent` and queue it.
    ///
    /// Chains from the last queued waypoint unless `replace_trip` is set, in
    /// which case the agent's current trip is discarded and the new one
    /// starts from its present position and place.  On any error the
    /// agent's existing trip is left untouched.  An idle, unpaused agent
    /// begins its first leg immediately.
    ///
    /// Returns the number of waypoints queued.
    pub fn schedule_trip(
        &self,
        map:    MapView<'_>,
        config: &SimConfig,
        agent:  &mut Agent,
        req:    TripRequest,
    ) -> MobilityResult<usize> {
        check_speed(req.speed, config)?;
        map.features.check_place(req.goal_place)?;

        let tail = match agent.trip.back() {
            Some(wp) if !req.replace_trip => (wp.point, wp.place),
            _ => (agent.position, agent.place),
        };
        map.features.check_place(tail.1)?;

        let legs = compose(&self.finder, map, config, tail.0, tail.1, &req)?;
        let legs = dedup_against_tail(tail, legs);

        if req.replace_trip {
            let paused = agent.trip.paused;
            agent.trip.clear();
            agent.trip.paused = paused;
            agent.motion = None;
        }
        let queued = legs.len();
        agent.trip.extend(legs);
        log::debug!(
            "agent {}: queued {queued} waypoint(s) to {} ({} pending)",
            agent.id,
            req.goal_place,
            agent.trip.len()
        );

        if agent.motion.is_none() && !agent.trip.paused {
            start_next_leg(agent)?;
        }
        Ok(queued)
    }

    /// Advance `agent` by `elapsed` ticks of simulated time.
    ///
    /// Returns the number of waypoints reached.
    pub fn advance(
        &self,
        agent:    &mut Agent,
        elapsed:  f64,
        config:   &SimConfig,
        observer: &mut dyn StepObserver,
    ) -> MobilityResult<usize> {
        advance_agent(agent, elapsed, config, observer)
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

/// Sub-step `agent` through `elapsed` ticks.
fn advance_agent(
    agent:    &mut Agent,
    elapsed:  f64,
    config:   &SimConfig,
    observer: &mut dyn StepObserver,
) -> MobilityResult<usize> {
    if !agent.is_moving() || !(elapsed > 0.0) {
        return Ok(0);
    }
    let precision = config.step_precision;
    let full = (elapsed / precision).floor() as u64;
    let partial = elapsed - full as f64 * precision;

    let mut arrivals = 0;
    for i in 0..=full {
        let interval = if i < full { precision } else { partial };
        if interval <= 0.0 {
            break;
        }
        if !agent.is_moving() {
            break;
        }
        observer.before_step(agent);
        arrivals += step(agent, interval, config)?;
        agent.steps += 1;
        observer.after_step(agent);
        if agent.steps % config.sampling_interval == 0 {
            observer.on_sample(agent);
        }
    }
    Ok(arrivals)
}

/// Spend `interval` ticks of travel, crossing into later legs on arrival.
fn step(agent: &mut Agent, interval: f64, config: &SimConfig) -> MobilityResult<usize> {
    let mut arrivals = 0;
    let mut time = interval;
    while time > 0.0 {
        if agent.trip.paused {
            break;
        }
        let position = agent.position;
        let Some(motion) = agent.motion.as_mut() else {
            break;
        };
        // Step hooks hold `&mut Agent` and may have written the speed directly.
        check_speed(motion.speed, config)?;

        let mut remaining = position.distance(motion.goal_point);
        if motion.move_directly && remaining > motion.origin_distance {
            motion.aim_from(position)?;
            log::trace!("agent {}: course corrected to {:.1}°", agent.id, motion.bearing);
        }

        let budget = motion.speed * time;
        let d = budget.min(remaining);
        let (dlat, dlon) = motion.increment(d);
        agent.position.lat += dlat;
        agent.position.lon += dlon;
        remaining = agent.position.distance(motion.goal_point);

        if remaining >= config.arrival_epsilon {
            break;
        }
        // Leftover time carries into the next leg at that leg's speed.
        time = (budget - d) / motion.speed;
        arrive(agent)?;
        arrivals += 1;
    }
    Ok(arrivals)
}

/// Snap to the active leg's goal, take its place, and begin the next leg.
fn arrive(agent: &mut Agent) -> MobilityResult<()> {
    if let Some(wp) = agent.trip.pop_front() {
        agent.position = wp.point;
        agent.place = wp.place;
        log::trace!("agent {}: reached {} at {}", agent.id, wp.place, wp.point);
    }
    start_next_leg(agent)?;
    if agent.motion.is_none() {
        log::debug!("agent {}: trip complete at {}", agent.id, agent.place);
    }
    Ok(())
}

/// Begin the leg toward the front waypoint, passing through zero-length
/// legs immediately.  Leaves the agent idle when the trip is exhausted.
pub(crate) fn start_next_leg(agent: &mut Agent) -> MobilityResult<()> {
    agent.motion = None;
    while let Some(wp) = agent.trip.front().copied() {
        if !wp.point.approx_eq(agent.position, COINCIDENT_TOLERANCE) {
            agent.motion = Some(MovementState::begin(agent.position, &wp)?);
            return Ok(());
        }
        agent.trip.pop_front();
        agent.position = wp.point;
        agent.place = wp.place;
    }
    Ok(())
}
