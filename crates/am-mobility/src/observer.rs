//! Sub-step callbacks.

use am_agent::Agent;

/// Host logic that needs finer than per-tick precision.
///
/// `before_step` and `after_step` run around every movement sub-step and may
/// change the agent (its speed, its trip); changes take effect on the very
/// next sub-step.  Change speeds through [`crate::set_speed`] and friends,
/// which reject a speed below `min_speed` up front.  A speed written
/// directly is still checked before the agent moves, and a low one fails the
/// advance with [`crate::MobilityError::SpeedTooLow`].  All methods default
/// to no-ops.
pub trait StepObserver {
    fn before_step(&mut self, _agent: &mut Agent) {}

    fn after_step(&mut self, _agent: &mut Agent) {}

    /// Called after every `sampling_interval`-th sub-step of an agent.
    fn on_sample(&mut self, _agent: &Agent) {}
}

/// A [`StepObserver`] that does nothing.
pub struct NoopStepObserver;

impl StepObserver for NoopStepObserver {}
