//! Per-agent trip control: pause, resume, reset, and speed changes.
//!
//! Speed changes apply to the active leg and to every queued waypoint, and
//! take effect on the next movement sub-step.  They are validated against
//! `SimConfig::min_speed` before anything is changed, so a rejected change
//! leaves every leg at its old speed.

use am_agent::Agent;
use am_core::SimConfig;

use crate::engine::start_next_leg;
use crate::{MobilityError, MobilityResult};

/// Stop the agent where it is.  Its trip stays queued.
pub fn pause_trip(agent: &mut Agent) {
    agent.trip.paused = true;
}

/// Continue a paused trip, or start a queued one on an idle agent.
///
/// # Errors
/// [`MobilityError::EmptyTripStart`] if no waypoints are queued.
pub fn resume_trip(agent: &mut Agent) -> MobilityResult<()> {
    if agent.trip.is_empty() {
        return Err(MobilityError::EmptyTripStart(agent.id));
    }
    agent.trip.paused = false;
    if agent.motion.is_none() {
        start_next_leg(agent)?;
    }
    Ok(())
}

/// Drop the trip and the active leg.  The agent stays where it is, in the
/// place of its last completed waypoint.
pub fn reset_trip(agent: &mut Agent) {
    agent.trip.clear();
    agent.motion = None;
}

pub fn set_speed(agent: &mut Agent, speed: f64, config: &SimConfig) -> MobilityResult<()> {
    check_speed(speed, config)?;
    rescale(agent, config, |_| speed)
}

pub fn multiply_speed(agent: &mut Agent, factor: f64, config: &SimConfig) -> MobilityResult<()> {
    rescale(agent, config, |s| s * factor)
}

pub fn increase_speed(agent: &mut Agent, delta: f64, config: &SimConfig) -> MobilityResult<()> {
    rescale(agent, config, |s| s + delta)
}

/// Speeds below `min_speed` are rejected.  NaN compares false, so it is
/// rejected explicitly.
pub(crate) fn check_speed(speed: f64, config: &SimConfig) -> MobilityResult<()> {
    if speed.is_nan() || speed < config.min_speed {
        return Err(MobilityError::SpeedTooLow { speed, min: config.min_speed });
    }
    Ok(())
}

fn rescale(agent: &mut Agent, config: &SimConfig, f: impl Fn(f64) -> f64) -> MobilityResult<()> {
    let current = agent.motion.iter().map(|m| m.speed);
    for speed in current.chain(agent.trip.iter().map(|w| w.speed)) {
        check_speed(f(speed), config)?;
    }
    if let Some(motion) = agent.motion.as_mut() {
        motion.speed = f(motion.speed);
    }
    for wp in agent.trip.iter_mut() {
        wp.speed = f(wp.speed);
    }
    Ok(())
}
