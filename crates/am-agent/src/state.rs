//! Movement state of an agent's active leg.

use am_core::{CoreResult, GeoPoint, Place};

use crate::Waypoint;

/// Direction and speed of the leg an agent is currently travelling.
///
/// Computed once when the leg begins and reused for every sub-step, so each
/// increment is a couple of multiplications.  Legs flagged `move_directly`
/// may recompute it mid-leg to correct course.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementState {
    /// Where the leg started.
    pub current_point: GeoPoint,
    pub goal_point: GeoPoint,
    /// `+1.0` or `-1.0`: sign of travel along each axis.
    pub lat_dir: f64,
    pub lon_dir: f64,
    /// Degrees clockwise from north.
    pub bearing: f64,
    /// `|Δlat / Δlon|`; infinite for legs running due north or south.
    pub slope: f64,
    pub speed: f64,
    /// Straight-line distance from the leg's start to its goal.
    pub origin_distance: f64,
    pub move_directly: bool,
    /// Place the agent is in on arrival.
    pub place: Place,
}

impl MovementState {
    /// Begin a leg from `from` toward `goal`.
    ///
    /// Fails with [`CoreError::CoincidentPoints`](am_core::CoreError) if the
    /// two points coincide, since no heading exists between them.
    pub fn begin(from: GeoPoint, goal: &Waypoint) -> CoreResult<Self> {
        let mut state = Self {
            current_point:   from,
            goal_point:      goal.point,
            lat_dir:         1.0,
            lon_dir:         1.0,
            bearing:         0.0,
            slope:           0.0,
            speed:           goal.speed,
            origin_distance: from.distance(goal.point),
            move_directly:   goal.move_directly,
            place:           goal.place,
        };
        state.aim_from(from)?;
        Ok(state)
    }

    /// Recompute heading from `from` to the goal, keeping speed and the
    /// original distance.
    pub fn aim_from(&mut self, from: GeoPoint) -> CoreResult<()> {
        self.bearing = from.bearing_to(self.goal_point)?;
        let dlat = self.goal_point.lat - from.lat;
        let dlon = self.goal_point.lon - from.lon;
        self.lat_dir = if dlat < 0.0 { -1.0 } else { 1.0 };
        self.lon_dir = if dlon < 0.0 { -1.0 } else { 1.0 };
        self.slope = if dlon == 0.0 { f64::INFINITY } else { (dlat / dlon).abs() };
        Ok(())
    }

    /// `(Δlat, Δlon)` for moving `distance` along the current heading.
    pub fn increment(&self, distance: f64) -> (f64, f64) {
        if self.slope.is_infinite() {
            return (self.lat_dir * distance, 0.0);
        }
        let dlon = distance / (1.0 + self.slope * self.slope).sqrt();
        (self.lat_dir * self.slope * dlon, self.lon_dir * dlon)
    }
}
