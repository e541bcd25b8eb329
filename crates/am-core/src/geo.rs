//! Coordinate type and planar distance utilities.
//!
//! The simulation treats coordinates as planar: one coordinate unit is one
//! distance unit and distances are Euclidean.  Hosts holding WGS-84 data
//! project it before building streets and units.  `lat` is the vertical axis
//! and `lon` the horizontal one, matching the field names map data arrives
//! with.

use crate::{CoreError, CoreResult};

/// A coordinate pair stored as double-precision floats.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Euclidean distance in distance units.
    #[inline]
    pub fn distance(self, other: GeoPoint) -> f64 {
        (other.lat - self.lat).hypot(other.lon - self.lon)
    }

    /// Squared distance; cheaper for nearest-point comparisons.
    #[inline]
    pub fn distance_2(self, other: GeoPoint) -> f64 {
        let dlat = other.lat - self.lat;
        let dlon = other.lon - self.lon;
        dlat * dlat + dlon * dlon
    }

    /// Bearing from `self` to `other` in degrees clockwise from north (+lat),
    /// normalised to `[0, 360)`.
    ///
    /// # Errors
    /// [`CoreError::CoincidentPoints`] if the two points coincide.
    pub fn bearing_to(self, other: GeoPoint) -> CoreResult<f64> {
        let dlat = other.lat - self.lat;
        let dlon = other.lon - self.lon;
        if dlat == 0.0 && dlon == 0.0 {
            return Err(CoreError::CoincidentPoints(self));
        }
        Ok(dlon.atan2(dlat).to_degrees().rem_euclid(360.0))
    }

    /// Point at fraction `t` of the way from `self` to `other`.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// `true` if both coordinates differ by at most `tol`.
    #[inline]
    pub fn approx_eq(self, other: GeoPoint, tol: f64) -> bool {
        (self.lat - other.lat).abs() <= tol && (self.lon - other.lon).abs() <= tol
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
