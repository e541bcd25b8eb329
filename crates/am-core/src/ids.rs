//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as `BTreeMap` keys;
//! the simulation relies on their ordering for deterministic iteration.
//! Graph ids (`NodeId`, `EdgeId`) index straight into the graph's arrays via
//! `.index()`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Agent handle.  Assigned in creation order and never reused, so
    /// iterating agents by ascending id is iterating them in creation order.
    pub struct AgentId(u32);
}

typed_id! {
    /// Identifier of a street record supplied by the map generator.
    pub struct StreetId(u32);
}

typed_id! {
    /// Identifier of a unit (building lot) record supplied by the map generator.
    pub struct UnitId(u32);
}

typed_id! {
    /// Index of a street-graph node (a street endpoint or intersection).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed street-graph edge.
    pub struct EdgeId(u32);
}
