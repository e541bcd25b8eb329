//! Street and unit records, and the `MapFeatures` collection that owns them.
//!
//! These records are produced by the external map generator and are assumed
//! to be valid and non-overlapping by the time they reach the simulation.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use am_core::{GeoPoint, Place, SimRng, StreetId, UnitId};

use crate::geometry::{self, LinePosition};
use crate::{SpatialError, SpatialResult};

// ── Street ────────────────────────────────────────────────────────────────────

/// A point shared by two streets.
///
/// Each street records its intersections with every other street, so the
/// same physical point normally appears twice in the collection: once on
/// each street.  The graph builder merges the two records into one node.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intersection {
    pub point: GeoPoint,
    /// Index of `point` in the owning street's `coords`.
    pub index: usize,
    /// Index of `point` in the other street's `coords`.
    pub other_index: usize,
}

/// A street polyline plus its intersections keyed by the other street's id.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Street {
    pub id: StreetId,
    pub coords: Vec<GeoPoint>,
    pub intersections: BTreeMap<StreetId, Vec<Intersection>>,
}

impl Street {
    pub fn new(id: StreetId, coords: Vec<GeoPoint>) -> Self {
        Self { id, coords, intersections: BTreeMap::new() }
    }

    /// Total length along the street geometry.
    pub fn length(&self) -> f64 {
        geometry::polyline_length(&self.coords)
    }

    /// Project `p` onto the street.
    pub fn project(&self, p: GeoPoint) -> SpatialResult<LinePosition> {
        geometry::project_onto(&self.coords, p)
            .ok_or_else(|| SpatialError::Geometry(format!("street {} has no coordinates", self.id)))
    }

    /// Record an intersection with `other`, ignoring exact repeats.
    pub fn add_intersection(&mut self, other: StreetId, intersection: Intersection) {
        let list = self.intersections.entry(other).or_default();
        if !list.iter().any(|i| i.index == intersection.index && i.other_index == intersection.other_index) {
            list.push(intersection);
        }
    }
}

/// Record every coordinate shared by two different streets as an
/// intersection on both of them.
///
/// Only shared vertices are detected; segments that cross between vertices
/// are not split.  Generators that already computed intersections do not
/// need this.
pub fn annotate_intersections(streets: &mut [Street]) {
    let mut by_point: FxHashMap<(i64, i64), Vec<(usize, usize)>> = FxHashMap::default();
    for (s, street) in streets.iter().enumerate() {
        for (v, p) in street.coords.iter().enumerate() {
            by_point.entry(point_key(*p)).or_default().push((s, v));
        }
    }

    let mut found = 0usize;
    let mut shared: Vec<Vec<(usize, usize)>> = by_point.into_values().filter(|v| v.len() > 1).collect();
    // Hash order is arbitrary; sort so intersection lists come out the same every run.
    shared.sort_unstable();
    for entries in shared {
        for &(sa, va) in &entries {
            for &(sb, vb) in &entries {
                if sa == sb {
                    continue;
                }
                let point = streets[sa].coords[va];
                let other = streets[sb].id;
                streets[sa].add_intersection(other, Intersection { point, index: va, other_index: vb });
                found += 1;
            }
        }
    }
    log::debug!("annotated {found} street intersection records across {} streets", streets.len());
}

/// Quantised coordinate key used to recognise the same point across records.
#[inline]
pub(crate) fn point_key(p: GeoPoint) -> (i64, i64) {
    ((p.lat * 1e9).round() as i64, (p.lon * 1e9).round() as i64)
}

// ── Unit ──────────────────────────────────────────────────────────────────────

/// Optional references to the units around a unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitNeighbors {
    /// Previous unit along the same side of the street.
    pub previous: Option<UnitId>,
    /// Next unit along the same side of the street.
    pub next: Option<UnitId>,
    /// Unit directly across the street.
    pub across: Option<UnitId>,
}

/// A building lot fronting a street.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub polygon: Vec<GeoPoint>,
    /// The street this unit fronts.
    pub street: StreetId,
    /// The two street-facing corners of the unit.
    pub anchors: [GeoPoint; 2],
    pub neighbors: UnitNeighbors,
}

impl Unit {
    /// The unit's door: the midpoint of its street-facing side.
    #[inline]
    pub fn door(&self) -> GeoPoint {
        self.anchors[0].lerp(self.anchors[1], 0.5)
    }

    pub fn centroid(&self) -> GeoPoint {
        geometry::centroid(&self.polygon).unwrap_or_else(|| self.door())
    }

    /// `true` if `p` lies inside the unit or within `buffer` of its boundary.
    pub fn contains(&self, p: GeoPoint, buffer: f64) -> bool {
        geometry::within_polygon_buffered(&self.polygon, p, buffer)
    }

    /// A uniformly random point strictly inside the unit, by rejection
    /// sampling over its bounding box.  Falls back to the centroid for
    /// slivers that reject every draw.
    pub fn random_interior_point(&self, rng: &mut SimRng) -> GeoPoint {
        const MAX_DRAWS: usize = 64;
        let Some((lo, hi)) = geometry::bounds(&self.polygon) else {
            return self.door();
        };
        if lo.lat < hi.lat && lo.lon < hi.lon {
            for _ in 0..MAX_DRAWS {
                let p = GeoPoint::new(rng.gen_range(lo.lat..hi.lat), rng.gen_range(lo.lon..hi.lon));
                if geometry::point_in_polygon(&self.polygon, p) {
                    return p;
                }
            }
        }
        self.centroid()
    }
}

// ── MapFeatures ───────────────────────────────────────────────────────────────

/// All streets and units known to the simulation, keyed by id.
///
/// `BTreeMap` keeps iteration in id order so graph construction and agent
/// spawning are deterministic.
#[derive(Clone, Debug, Default)]
pub struct MapFeatures {
    streets: BTreeMap<StreetId, Street>,
    units:   BTreeMap<UnitId, Unit>,
}

impl MapFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, replacing any duplicate ids with the later record.
    pub fn from_records(streets: Vec<Street>, units: Vec<Unit>) -> Self {
        let mut features = Self::new();
        for s in streets {
            features.insert_street(s);
        }
        for u in units {
            features.insert_unit(u);
        }
        features
    }

    pub fn insert_street(&mut self, street: Street) -> Option<Street> {
        self.streets.insert(street.id, street)
    }

    pub fn insert_unit(&mut self, unit: Unit) -> Option<Unit> {
        self.units.insert(unit.id, unit)
    }

    pub fn remove_street(&mut self, id: StreetId) -> Option<Street> {
        self.streets.remove(&id)
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    pub fn street(&self, id: StreetId) -> SpatialResult<&Street> {
        self.streets.get(&id).ok_or(SpatialError::UnknownStreet(id))
    }

    pub fn street_mut(&mut self, id: StreetId) -> SpatialResult<&mut Street> {
        self.streets.get_mut(&id).ok_or(SpatialError::UnknownStreet(id))
    }

    pub fn unit(&self, id: UnitId) -> SpatialResult<&Unit> {
        self.units.get(&id).ok_or(SpatialError::UnknownUnit(id))
    }

    pub fn streets(&self) -> impl Iterator<Item = &Street> + '_ {
        self.streets.values()
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty() && self.units.is_empty()
    }

    pub fn clear(&mut self) {
        self.streets.clear();
        self.units.clear();
    }

    /// Fails with the matching unknown-id error if `place` names a missing
    /// feature.  `Unanchored` always exists.
    pub fn check_place(&self, place: Place) -> SpatialResult<()> {
        match place {
            Place::Unit(id)   => self.unit(id).map(|_| ()),
            Place::Street(id) => self.street(id).map(|_| ()),
            Place::Unanchored => Ok(()),
        }
    }

    /// The point on a unit's front street directly across from its door.
    pub fn street_point_near_door(&self, unit: UnitId) -> SpatialResult<LinePosition> {
        let unit = self.unit(unit)?;
        self.street(unit.street)?.project(unit.door())
    }

    /// `true` if `p` lies within `buffer` of the geometry of `place`.
    /// `Unanchored` contains every point.
    pub fn place_contains(&self, place: Place, p: GeoPoint, buffer: f64) -> SpatialResult<bool> {
        match place {
            Place::Unit(id) => Ok(self.unit(id)?.contains(p, buffer)),
            Place::Street(id) => {
                Ok(geometry::distance_to_polyline(&self.street(id)?.coords, p) <= buffer)
            }
            Place::Unanchored => Ok(true),
        }
    }
}
