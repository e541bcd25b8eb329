//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::GeoPoint;

/// Errors raised by `am-core` primitives.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    /// A bearing was requested between two points that coincide.
    #[error("bearing is undefined between coincident points at {0}")]
    CoincidentPoints(GeoPoint),
}

/// Shorthand result type for `am-core`.
pub type CoreResult<T> = Result<T, CoreError>;
