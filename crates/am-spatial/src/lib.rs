//! `am-spatial` — streets, units, the street graph, and path finding.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`feature`]  | `Street`, `Unit`, `MapFeatures`, `annotate_intersections`     |
//! | [`geometry`] | polyline projection/slicing, polygon containment              |
//! | [`network`]  | `StreetGraph` (CSR + R-tree), `StreetGraphBuilder`            |
//! | [`router`]   | `Router` trait, `Route`, `AStarRouter`                        |
//! | [`path`]     | `PathFinder`, `sparsify`, `prune_excess`, `orient`            |
//! | [`loader`]   | JSON feature documents (feature = `"json"` only)              |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `json`  | Enables the JSON feature loader via `serde_json`.            |
//! | `serde` | Derives `Serialize`/`Deserialize` on public record types.    |

pub mod error;
pub mod feature;
pub mod geometry;
pub mod network;
pub mod path;
pub mod router;

#[cfg(feature = "json")]
pub mod loader;


pub use error::{SpatialError, SpatialResult};
pub use feature::{annotate_intersections, Intersection, MapFeatures, Street, Unit, UnitNeighbors};
pub use geometry::LinePosition;
pub use network::{StreetGraph, StreetGraphBuilder, StreetNode};
pub use path::{PathAnchor, PathFinder, PathStep};
pub use router::{AStarRouter, Route, Router};
