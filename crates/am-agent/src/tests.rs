//! Unit tests for am-agent.

#[cfg(test)]
mod store {
    use am_core::{AgentId, GeoPoint, Place, StreetId};

    use crate::AgentStore;

    #[test]
    fn ids_follow_creation_order() {
        let mut store = AgentStore::new();
        let a = store.insert(GeoPoint::new(0.0, 0.0), Place::Unanchored);
        let b = store.insert(GeoPoint::new(1.0, 1.0), Place::Street(StreetId(3)));
        assert_eq!((a, b), (AgentId(0), AgentId(1)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b).unwrap().place, Place::Street(StreetId(3)));
        assert!(!store.get(a).unwrap().is_moving());
    }

    #[test]
    fn removal_keeps_other_ids_valid() {
        let mut store = AgentStore::new();
        let ids: Vec<_> = (0..4).map(|i| store.insert(GeoPoint::new(i as f64, 0.0), Place::Unanchored)).collect();
        let snapshot = store.ids();
        assert!(store.remove(ids[1]).is_some());
        assert!(store.remove(ids[1]).is_none());
        assert_eq!(store.len(), 3);
        // A snapshot taken before the removal still resolves cleanly.
        let seen: Vec<_> = snapshot.iter().filter_map(|&id| store.get(id)).map(|a| a.id).collect();
        assert_eq!(seen, vec![ids[0], ids[2], ids[3]]);
        assert_eq!(store.get(ids[3]).unwrap().position, GeoPoint::new(3.0, 0.0));
    }

    #[test]
    fn new_ids_after_removal_are_fresh() {
        let mut store = AgentStore::new();
        let a = store.insert(GeoPoint::new(0.0, 0.0), Place::Unanchored);
        store.remove(a);
        let b = store.insert(GeoPoint::new(0.0, 0.0), Place::Unanchored);
        assert_ne!(a, b);
        assert!(!store.contains(a));
    }

    #[test]
    fn clear_restarts_ids() {
        let mut store = AgentStore::new();
        store.insert(GeoPoint::new(0.0, 0.0), Place::Unanchored);
        store.insert(GeoPoint::new(0.0, 0.0), Place::Unanchored);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.insert(GeoPoint::new(0.0, 0.0), Place::Unanchored), AgentId(0));
    }
}

#[cfg(test)]
mod trip {
    use am_core::{GeoPoint, Place, UnitId};

    use crate::{Trip, Waypoint};

    #[test]
    fn queue_order_and_clear() {
        let mut trip = Trip::new();
        trip.extend([
            Waypoint::new(GeoPoint::new(0.0, 1.0), Place::Unit(UnitId(1)), 1.0),
            Waypoint::direct(GeoPoint::new(0.0, 2.0), Place::Unanchored, 2.0),
        ]);
        trip.paused = true;
        assert_eq!(trip.len(), 2);
        assert_eq!(trip.front().unwrap().point, GeoPoint::new(0.0, 1.0));
        assert!(trip.back().unwrap().move_directly);
        assert_eq!(trip.pop_front().unwrap().place, Place::Unit(UnitId(1)));
        trip.clear();
        assert!(trip.is_empty());
        assert!(!trip.paused);
    }
}

#[cfg(test)]
mod state {
    use am_core::{CoreError, GeoPoint, Place};

    use crate::{MovementState, Waypoint};

    fn leg(from: GeoPoint, to: GeoPoint) -> MovementState {
        MovementState::begin(from, &Waypoint::new(to, Place::Unanchored, 1.0)).unwrap()
    }

    #[test]
    fn increments_follow_heading() {
        let m = leg(GeoPoint::new(0.0, 0.0), GeoPoint::new(-3.0, 4.0));
        assert_eq!((m.lat_dir, m.lon_dir), (-1.0, 1.0));
        assert_eq!(m.origin_distance, 5.0);
        let (dlat, dlon) = m.increment(5.0);
        assert!((dlat + 3.0).abs() < 1e-12);
        assert!((dlon - 4.0).abs() < 1e-12);
    }

    #[test]
    fn due_north_and_south_legs() {
        let north = leg(GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 0.0));
        assert!(north.slope.is_infinite());
        assert_eq!(north.bearing, 0.0);
        assert_eq!(north.increment(2.0), (2.0, 0.0));

        let south = leg(GeoPoint::new(0.0, 0.0), GeoPoint::new(-10.0, 0.0));
        assert_eq!(south.bearing, 180.0);
        assert_eq!(south.increment(2.0), (-2.0, 0.0));
    }

    #[test]
    fn due_east_leg() {
        let east = leg(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 10.0));
        assert_eq!(east.slope, 0.0);
        assert!((east.bearing - 90.0).abs() < 1e-12);
        assert_eq!(east.increment(1.5), (0.0, 1.5));
    }

    #[test]
    fn coincident_leg_has_no_heading() {
        let p = GeoPoint::new(1.0, 1.0);
        let err = MovementState::begin(p, &Waypoint::new(p, Place::Unanchored, 1.0)).unwrap_err();
        assert_eq!(err, CoreError::CoincidentPoints(p));
    }

    #[test]
    fn reaim_changes_heading_only() {
        let mut m = leg(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 10.0));
        m.aim_from(GeoPoint::new(5.0, 10.0)).unwrap();
        assert_eq!(m.lat_dir, -1.0);
        assert!(m.slope.is_infinite());
        assert_eq!(m.origin_distance, 10.0);
        assert_eq!(m.current_point, GeoPoint::new(0.0, 0.0));
    }
}
