//! `am-agent` — agent storage, trips, and per-leg movement state.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`trip`]     | `Waypoint`, `Trip` (queue of waypoints + paused flag)       |
//! | [`state`]    | `MovementState` (direction, slope, bearing of active leg)  |
//! | [`store`]    | `Agent`, `AgentStore` (creation-ordered, safe removal)      |
//!
//! Agents here are plain data.  Trip composition and movement live in
//! `am-mobility`; nothing in this crate knows about streets or rendering.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types.     |

pub mod state;
pub mod store;
pub mod trip;

#[cfg(test)]
mod tests;

pub use state::MovementState;
pub use store::{Agent, AgentStore};
pub use trip::{Trip, Waypoint};
