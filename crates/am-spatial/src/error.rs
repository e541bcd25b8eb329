//! Spatial-subsystem error type.

use thiserror::Error;

use am_core::{NodeId, StreetId, UnitId};

/// Errors produced by `am-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The street graph has no path between the two nodes.
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in street graph")]
    NodeNotFound(NodeId),

    #[error("street {0} does not exist")]
    UnknownStreet(StreetId),

    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),

    /// A geometric query was made against degenerate geometry.
    #[error("geometry error: {0}")]
    Geometry(String),

    #[cfg(feature = "json")]
    #[error("feature document parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
