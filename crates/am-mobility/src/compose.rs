//! Waypoint composition: turn a (start, goal) request into a leg list.
//!
//! # Leg structure
//!
//! | Start → Goal           | Waypoints                                                    |
//! |------------------------|--------------------------------------------------------------|
//! | anything, direct       | goal (direct)                                                |
//! | `Unanchored` ↔ any     | goal (direct)                                                |
//! | unit U → unit U        | goal                                                         |
//! | unit U → elsewhere     | door(U), street point across from door(U), *street legs*…    |
//! | … → street S           | *street legs* to the goal's projection on S, goal            |
//! | … → unit G             | *street legs* to the point across from door(G), door(G), goal |
//!
//! *Street legs* follow one street when both ends share it, otherwise the
//! sparse network path between them, each consecutive pair re-expanded
//! along its street's geometry.

use am_core::{GeoPoint, Place, SimConfig, StreetId};
use am_spatial::geometry::{slice_between, COINCIDENT_TOLERANCE};
use am_spatial::{MapFeatures, PathAnchor, PathFinder, Router, StreetGraph};
use am_agent::Waypoint;

use crate::{MobilityError, MobilityResult};

/// Read-only view of the map a trip is composed against.
#[derive(Copy, Clone)]
pub struct MapView<'a> {
    pub features: &'a MapFeatures,
    pub graph:    &'a StreetGraph,
}

/// Arguments of one `schedule_trip` call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TripRequest {
    pub goal_point:    GeoPoint,
    pub goal_place:    Place,
    /// Distance units per tick for every leg of the trip.
    pub speed:         f64,
    /// Ignore the street network and travel in a straight line.
    pub move_directly: bool,
    /// Discard the current trip and start from where the agent is now,
    /// instead of chaining from the last queued waypoint.
    pub replace_trip:  bool,
}

impl TripRequest {
    /// A chained, network-following trip to `goal_point` in `goal_place`.
    pub fn to(goal_point: GeoPoint, goal_place: Place, speed: f64) -> Self {
        Self { goal_point, goal_place, speed, move_directly: false, replace_trip: false }
    }

    pub fn directly(mut self) -> Self {
        self.move_directly = true;
        self
    }

    pub fn replacing(mut self) -> Self {
        self.replace_trip = true;
        self
    }
}

/// Compose the waypoints leading from `start` (in `start_place`) to the
/// request's goal.  Does not touch any agent.
pub(crate) fn compose<R: Router>(
    finder:      &PathFinder<R>,
    map:         MapView<'_>,
    config:      &SimConfig,
    start:       GeoPoint,
    start_place: Place,
    req:         &TripRequest,
) -> MobilityResult<Vec<Waypoint>> {
    let speed = req.speed;

    let direct = || vec![Waypoint::direct(req.goal_point, req.goal_place, speed)];
    if req.move_directly || start_place.is_unanchored() || req.goal_place.is_unanchored() {
        return Ok(direct());
    }

    if !map.features.place_contains(req.goal_place, req.goal_point, config.boundary_buffer)? {
        return Err(MobilityError::GeometryViolation(format!(
            "goal {} lies outside {} (buffer {})",
            req.goal_point, req.goal_place, config.boundary_buffer
        )));
    }

    if let (Place::Unit(a), Place::Unit(b)) = (start_place, req.goal_place) {
        if a == b {
            return Ok(vec![Waypoint::new(req.goal_point, req.goal_place, speed)]);
        }
    }

    let mut legs = Vec::new();

    // Leave the start unit through its door onto its front street.
    let from = match start_place {
        Place::Unit(id) => {
            let unit = map.features.unit(id)?;
            let across = map.features.street_point_near_door(id)?;
            legs.push(Waypoint::new(unit.door(), start_place, speed));
            legs.push(Waypoint::new(across.point, start_place, speed));
            PathAnchor { point: across.point, street: unit.street }
        }
        Place::Street(id) => PathAnchor { point: start, street: id },
        Place::Unanchored => return Ok(direct()),
    };

    let to = match req.goal_place {
        Place::Unit(id) => {
            let unit = map.features.unit(id)?;
            let across = map.features.street_point_near_door(id)?;
            PathAnchor { point: across.point, street: unit.street }
        }
        Place::Street(id) => PathAnchor { point: req.goal_point, street: id },
        Place::Unanchored => return Ok(direct()),
    };

    street_legs(finder, map, &from, &to, speed, &mut legs)?;

    if let Place::Unit(id) = req.goal_place {
        legs.push(Waypoint::new(map.features.unit(id)?.door(), req.goal_place, speed));
    }
    legs.push(Waypoint::new(req.goal_point, req.goal_place, speed));
    Ok(legs)
}

/// Append legs along the street network from `from` to `to`.
fn street_legs<R: Router>(
    finder: &PathFinder<R>,
    map:    MapView<'_>,
    from:   &PathAnchor,
    to:     &PathAnchor,
    speed:  f64,
    legs:   &mut Vec<Waypoint>,
) -> MobilityResult<()> {
    if from.street == to.street {
        return same_street(map.features, from.street, from.point, to.point, speed, legs);
    }

    let steps = finder.find_between_streets(map.graph, from, to)?;
    let mut cursor = from.point;
    for (i, step) in steps.iter().enumerate() {
        // The first step is on the start street; later ones carry the
        // street of the run arriving at them.
        let street = if i == 0 { from.street } else { step.street.unwrap_or(from.street) };
        same_street(map.features, street, cursor, step.point, speed, legs)?;
        cursor = step.point;
    }
    same_street(map.features, to.street, cursor, to.point, speed, legs)
}

/// Append the slice of `street` between `a` and `b`, in travel order.
pub(crate) fn same_street(
    features: &MapFeatures,
    street:   StreetId,
    a:        GeoPoint,
    b:        GeoPoint,
    speed:    f64,
    legs:     &mut Vec<Waypoint>,
) -> MobilityResult<()> {
    let s = features.street(street)?;
    let from = s.project(a)?;
    let to = s.project(b)?;
    let place = Place::Street(street);
    legs.extend(
        slice_between(&s.coords, &from, &to)
            .into_iter()
            .map(|p| Waypoint::new(p, place, speed)),
    );
    Ok(())
}

/// Drop legs that repeat the point before them.
///
/// `tail` is where the new legs start from: the last queued waypoint, or
/// the agent itself.  The earlier of two coincident points keeps its place
/// tag, so the street point across from a door stays tagged with the unit
/// until the agent actually moves along the street.  The final leg survives
/// if it changes the place.
pub(crate) fn dedup_against_tail(tail: (GeoPoint, Place), legs: Vec<Waypoint>) -> Vec<Waypoint> {
    let last = legs.len().saturating_sub(1);
    let mut prev = tail;
    let mut out: Vec<Waypoint> = Vec::with_capacity(legs.len());
    for (i, wp) in legs.into_iter().enumerate() {
        let repeats = wp.point.approx_eq(prev.0, COINCIDENT_TOLERANCE);
        if repeats && (i != last || wp.place == prev.1) {
            continue;
        }
        prev = (wp.point, wp.place);
        out.push(wp);
    }
    out
}
