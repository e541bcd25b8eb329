//! `Place`: where an agent is, without coordinates.

use std::fmt;

use crate::{StreetId, UnitId};

/// A tagged reference to a map feature, or to nothing at all.
///
/// Every waypoint carries the place the agent will be in once it reaches
/// that waypoint; an agent's own `place` is always the place of its most
/// recently completed waypoint.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Place {
    /// Inside (or at the door of) a unit.
    Unit(UnitId),
    /// On a street.
    Street(StreetId),
    /// Not related to any map feature.  Only reachable by a direct move.
    #[default]
    Unanchored,
}

impl Place {
    #[inline]
    pub fn is_unanchored(self) -> bool {
        matches!(self, Place::Unanchored)
    }

    #[inline]
    pub fn unit(self) -> Option<UnitId> {
        match self {
            Place::Unit(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn street(self) -> Option<StreetId> {
        match self {
            Place::Street(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Unit(id)   => write!(f, "unit:{}", id.0),
            Place::Street(id) => write!(f, "street:{}", id.0),
            Place::Unanchored => f.write_str("unanchored"),
        }
    }
}
