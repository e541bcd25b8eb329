use am_core::{AgentId, CoreError, NodeId, Place};
use am_spatial::SpatialError;
use thiserror::Error;

/// Errors raised by trip scheduling, movement, and trip control.
///
/// Every variant is raised synchronously by the call that caused it and is
/// never retried; the host decides whether to reschedule.
#[derive(Debug, Error)]
pub enum MobilityError {
    /// The referenced unit or street does not exist.
    #[error("place {0} does not exist")]
    InvalidPlace(Place),

    /// Goal outside its place's bounds, or a heading between coincident points.
    #[error("geometry violation: {0}")]
    GeometryViolation(String),

    #[error("speed {speed} is below the minimum of {min}")]
    SpeedTooLow { speed: f64, min: f64 },

    #[error("no street path from node {from} to node {to}")]
    DisconnectedGraph { from: NodeId, to: NodeId },

    #[error("agent {0} has no queued waypoints to start")]
    EmptyTripStart(AgentId),

    #[error("agent {0} does not exist")]
    AgentNotFound(AgentId),

    #[error("spatial error: {0}")]
    Spatial(SpatialError),

    #[error(transparent)]
    Core(CoreError),
}

impl From<SpatialError> for MobilityError {
    fn from(err: SpatialError) -> Self {
        match err {
            SpatialError::UnknownStreet(id)      => MobilityError::InvalidPlace(Place::Street(id)),
            SpatialError::UnknownUnit(id)        => MobilityError::InvalidPlace(Place::Unit(id)),
            SpatialError::NoRoute { from, to }   => MobilityError::DisconnectedGraph { from, to },
            SpatialError::Geometry(msg)          => MobilityError::GeometryViolation(msg),
            other                                => MobilityError::Spatial(other),
        }
    }
}

impl From<CoreError> for MobilityError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CoincidentPoints(p) => {
                MobilityError::GeometryViolation(format!("no heading between coincident points at {p}"))
            }
            other                          => MobilityError::Core(other),
        }
    }
}

pub type MobilityResult<T> = Result<T, MobilityError>;
