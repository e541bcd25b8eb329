//! `am-sim` — frame-driven simulation clock and host integration.
//!
//! # Tick
//!
//! ```text
//! host frame(timestamp):
//!   sim.tick(timestamp, observer)
//!     (not running → no-op)
//!     ① Clock      : sample the timestamp; elapsed ticks since last frame
//!     ② Tick hook  : host callback with &mut Simulation
//!     ③ Agent hooks: per-agent callbacks, ascending AgentId
//!     ④ Movement   : sub-stepped advance of every live agent
//!     ⑤ Observe    : on_tick_end, on_snapshot at snapshot intervals
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                            |
//! |--------------|-----------------------------------------------------|
//! | [`clock`]    | `FrameClock`                                        |
//! | [`hooks`]    | `TickHook`, `AgentHook`                             |
//! | [`observer`] | `SimObserver`, `AgentView`, `NoopObserver`          |
//! | [`sim`]      | `Simulation`, `Spawn`                               |
//! | [`builder`]  | `SimBuilder`                                        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use am_core::SimConfig;
//! use am_sim::{NoopObserver, SimBuilder, Spawn};
//!
//! let mut sim = SimBuilder::new(SimConfig::default()).features(features).build()?;
//! sim.spawn_agents(100, Spawn::RandomUnits)?;
//! sim.run();
//! for frame in 0..600 {
//!     sim.tick(frame as f64, &mut NoopObserver)?;
//! }
//! ```

pub mod builder;
pub mod clock;
pub mod error;
pub mod hooks;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use clock::FrameClock;
pub use error::{SimError, SimResult};
pub use hooks::{AgentHook, TickHook};
pub use observer::{AgentView, NoopObserver, SimObserver};
pub use sim::{Simulation, Spawn};
