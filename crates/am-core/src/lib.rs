//! `am-core` — foundational types for the `agentmaps` simulation.
//!
//! This crate is a dependency of every other `am-*` crate.  It has no `am-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`ids`]        | `AgentId`, `StreetId`, `UnitId`, `NodeId`, `EdgeId`    |
//! | [`geo`]        | `GeoPoint`, planar distance and bearing                |
//! | [`place`]      | `Place`: unit / street / unanchored                   |
//! | [`time`]       | `Tick`                                                 |
//! | [`config`]     | `SimConfig` and its defaults                           |
//! | [`rng`]        | `SimRng` (deterministic simulation-level RNG)          |
//! | [`error`]      | `CoreError`, `CoreResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod place;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{AgentId, EdgeId, NodeId, StreetId, UnitId};
pub use place::Place;
pub use rng::SimRng;
pub use time::Tick;
