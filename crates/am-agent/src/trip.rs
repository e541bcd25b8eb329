//! Waypoints and trips.

use std::collections::VecDeque;

use am_core::{GeoPoint, Place};

/// One coordinate / place / speed target in a composed trip.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub point: GeoPoint,
    /// The place the agent is in once it reaches `point`.
    pub place: Place,
    /// Distance units per tick on the leg ending here.
    pub speed: f64,
    /// Travel in a straight line, ignoring streets, with heading correction.
    pub move_directly: bool,
}

impl Waypoint {
    pub fn new(point: GeoPoint, place: Place, speed: f64) -> Self {
        Self { point, place, speed, move_directly: false }
    }

    pub fn direct(point: GeoPoint, place: Place, speed: f64) -> Self {
        Self { point, place, speed, move_directly: true }
    }
}

/// The ordered queue of waypoints one agent is scheduled to traverse.
///
/// The front waypoint is the goal of the active leg; it stays queued until
/// the agent arrives at it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    pub waypoints: VecDeque<Waypoint>,
    /// Set by `pause_trip`; a paused trip keeps its waypoints but does not move.
    pub paused: bool,
}

impl Trip {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Goal of the active (or next) leg.
    #[inline]
    pub fn front(&self) -> Option<&Waypoint> {
        self.waypoints.front()
    }

    /// The last queued waypoint; new trips chain from here.
    #[inline]
    pub fn back(&self) -> Option<&Waypoint> {
        self.waypoints.back()
    }

    pub fn pop_front(&mut self) -> Option<Waypoint> {
        self.waypoints.pop_front()
    }

    pub fn extend(&mut self, waypoints: impl IntoIterator<Item = Waypoint>) {
        self.waypoints.extend(waypoints);
    }

    /// Drop every waypoint and clear the paused flag.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.paused = false;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> + '_ {
        self.waypoints.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Waypoint> + '_ {
        self.waypoints.iter_mut()
    }
}
