//! JSON feature-document loader (feature = `"json"`).
//!
//! The document carries street and unit records as the map generator emits
//! them.  Coordinates default to GeoJSON's `[lon, lat]` order; set
//! `"coordinate_order": "lat_lon"` for documents written the other way.
//!
//! ```json
//! {
//!   "coordinate_order": "lon_lat",
//!   "annotate_intersections": true,
//!   "streets": [ { "id": 1, "coordinates": [[0, 0], [100, 0]] } ],
//!   "units": [ { "id": 7, "street": 1,
//!                "polygon": [[45, 1], [55, 1], [55, 10], [45, 10]],
//!                "anchors": [[45, 1], [55, 1]] } ]
//! }
//! ```
//!
//! Malformed features are skipped with a warning instead of failing the
//! whole load.

use std::io::Read;

use serde::Deserialize;

use am_core::{GeoPoint, StreetId, UnitId};

use crate::feature::{annotate_intersections, Intersection, MapFeatures, Street, Unit, UnitNeighbors};
use crate::SpatialResult;

/// Axis order of coordinate pairs in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    #[default]
    LonLat,
    LatLon,
}

impl CoordinateOrder {
    fn point(self, pair: [f64; 2]) -> GeoPoint {
        match self {
            CoordinateOrder::LonLat => GeoPoint::new(pair[1], pair[0]),
            CoordinateOrder::LatLon => GeoPoint::new(pair[0], pair[1]),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeatureDocument {
    #[serde(default)]
    pub coordinate_order: CoordinateOrder,
    /// Detect shared street vertices and record them as intersections.
    #[serde(default)]
    pub annotate_intersections: bool,
    pub streets: Vec<StreetRecord>,
    #[serde(default)]
    pub units: Vec<UnitRecord>,
}

#[derive(Debug, Deserialize)]
pub struct StreetRecord {
    pub id: u32,
    pub coordinates: Vec<[f64; 2]>,
    #[serde(default)]
    pub intersections: Vec<IntersectionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct IntersectionRecord {
    pub street: u32,
    pub point: [f64; 2],
    pub index: usize,
    pub other_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct UnitRecord {
    pub id: u32,
    pub street: u32,
    pub polygon: Vec<[f64; 2]>,
    pub anchors: [[f64; 2]; 2],
    #[serde(default)]
    pub previous: Option<u32>,
    #[serde(default)]
    pub next: Option<u32>,
    #[serde(default)]
    pub across: Option<u32>,
}

/// Parse a feature document from any reader.
pub fn load_features_reader<R: Read>(reader: R) -> SpatialResult<MapFeatures> {
    let doc: FeatureDocument = serde_json::from_reader(reader)?;
    Ok(features_from_document(doc))
}

/// Parse a feature document from a string.
pub fn load_features_str(text: &str) -> SpatialResult<MapFeatures> {
    let doc: FeatureDocument = serde_json::from_str(text)?;
    Ok(features_from_document(doc))
}

/// Convert parsed records into [`MapFeatures`], skipping malformed ones.
pub fn features_from_document(doc: FeatureDocument) -> MapFeatures {
    let order = doc.coordinate_order;

    let mut streets: Vec<Street> = Vec::with_capacity(doc.streets.len());
    for rec in doc.streets {
        if rec.coordinates.len() < 2 {
            log::warn!("skipping street {}: needs at least 2 coordinates", rec.id);
            continue;
        }
        let coords: Vec<GeoPoint> = rec.coordinates.iter().map(|&c| order.point(c)).collect();
        let mut street = Street::new(StreetId(rec.id), coords);
        for i in rec.intersections {
            if i.index >= street.coords.len() {
                log::warn!("street {}: dropping intersection with out-of-range index {}", rec.id, i.index);
                continue;
            }
            street.add_intersection(
                StreetId(i.street),
                Intersection { point: order.point(i.point), index: i.index, other_index: i.other_index },
            );
        }
        streets.push(street);
    }
    if doc.annotate_intersections {
        annotate_intersections(&mut streets);
    }

    let mut features = MapFeatures::new();
    for street in streets {
        features.insert_street(street);
    }

    for rec in doc.units {
        if rec.polygon.len() < 3 {
            log::warn!("skipping unit {}: polygon needs at least 3 points", rec.id);
            continue;
        }
        if features.street(StreetId(rec.street)).is_err() {
            log::warn!("skipping unit {}: front street {} not loaded", rec.id, rec.street);
            continue;
        }
        features.insert_unit(Unit {
            id: UnitId(rec.id),
            polygon: rec.polygon.iter().map(|&c| order.point(c)).collect(),
            street: StreetId(rec.street),
            anchors: [order.point(rec.anchors[0]), order.point(rec.anchors[1])],
            neighbors: UnitNeighbors {
                previous: rec.previous.map(UnitId),
                next: rec.next.map(UnitId),
                across: rec.across.map(UnitId),
            },
        });
    }

    log::info!(
        "loaded {} streets and {} units",
        features.street_count(),
        features.unit_count()
    );
    features
}
