//! Unit tests for am-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EdgeId, NodeId, StreetId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering_follows_creation() {
        assert!(AgentId(0) < AgentId(1));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(StreetId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(StreetId::default(), StreetId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(StreetId(7).to_string(), "StreetId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{CoreError, GeoPoint};

    #[test]
    fn planar_distance() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert!((a.distance_2(b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn bearing_quadrants() {
        let o = GeoPoint::new(0.0, 0.0);
        let north = o.bearing_to(GeoPoint::new(1.0, 0.0)).unwrap();
        let east  = o.bearing_to(GeoPoint::new(0.0, 1.0)).unwrap();
        let south = o.bearing_to(GeoPoint::new(-1.0, 0.0)).unwrap();
        let west  = o.bearing_to(GeoPoint::new(0.0, -1.0)).unwrap();
        assert!(north.abs() < 1e-9);
        assert!((east - 90.0).abs() < 1e-9);
        assert!((south - 180.0).abs() < 1e-9);
        assert!((west - 270.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_of_coincident_points_fails() {
        let p = GeoPoint::new(2.0, 2.0);
        assert_eq!(p.bearing_to(p), Err(CoreError::CoincidentPoints(p)));
    }

    #[test]
    fn lerp_midpoint() {
        let m = GeoPoint::new(0.0, 0.0).lerp(GeoPoint::new(10.0, -10.0), 0.5);
        assert!(m.approx_eq(GeoPoint::new(5.0, -5.0), 1e-12));
    }
}

#[cfg(test)]
mod place {
    use crate::{Place, StreetId, UnitId};

    #[test]
    fn accessors() {
        assert_eq!(Place::Unit(UnitId(3)).unit(), Some(UnitId(3)));
        assert_eq!(Place::Unit(UnitId(3)).street(), None);
        assert_eq!(Place::Street(StreetId(1)).street(), Some(StreetId(1)));
        assert!(Place::Unanchored.is_unanchored());
        assert_eq!(Place::default(), Place::Unanchored);
    }

    #[test]
    fn display() {
        assert_eq!(Place::Unit(UnitId(3)).to_string(), "unit:3");
        assert_eq!(Place::Street(StreetId(9)).to_string(), "street:9");
        assert_eq!(Place::Unanchored.to_string(), "unanchored");
    }
}

#[cfg(test)]
mod time {
    use crate::Tick;

    #[test]
    fn tick_arithmetic() {
        assert_eq!(Tick(10).next(), Tick(11));
        assert_eq!(Tick::ZERO.next().next(), Tick(2));
        assert_eq!(Tick(4).to_string(), "T4");
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, SimConfig};

    #[test]
    fn defaults_are_valid() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.min_speed, 0.1);
        assert_eq!(cfg.step_precision, 0.001);
        assert_eq!(cfg.arrival_epsilon, 0.1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_sampling_interval() {
        let cfg = SimConfig { sampling_interval: 0, ..SimConfig::default() };
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn rejects_non_positive_speed_floor() {
        let cfg = SimConfig { min_speed: 0.0, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = SimConfig { min_speed: f64::NAN, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_precision_above_one_tick() {
        let cfg = SimConfig { step_precision: 1.5, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f64 = r1.gen_range(0.0..1.0);
            let b: f64 = r2.gen_range(0.0..1.0);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[7]), Some(&7));
    }
}
