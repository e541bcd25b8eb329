use am_core::{AgentId, CoreError};
use am_mobility::MobilityError;
use am_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("agent {0} does not exist")]
    AgentNotFound(AgentId),

    #[error("cannot spawn agents: the map has no units")]
    NoUnits,

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("mobility error: {0}")]
    Mobility(#[from] MobilityError),
}

pub type SimResult<T> = Result<T, SimError>;
