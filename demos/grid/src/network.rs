//! Synthetic grid neighbourhood.
//!
//! `rows + 1` east–west streets and `cols + 1` north–south streets spaced
//! `BLOCK` apart, crossing at every grid vertex.  Each block has one lot
//! fronting the east–west street on its south edge.

use am_core::{GeoPoint, StreetId, UnitId};
use am_spatial::{annotate_intersections, MapFeatures, Street, Unit, UnitNeighbors};

pub const BLOCK:   f64 = 100.0;
const SETBACK:     f64 = 5.0;
const LOT_DEPTH:   f64 = 40.0;
const LOT_MARGIN:  f64 = 10.0;

/// East–west streets are `StreetId(i)`; north–south are `StreetId(1000 + j)`.
pub fn east_west(i: u32) -> StreetId {
    StreetId(i)
}

pub fn north_south(j: u32) -> StreetId {
    StreetId(1000 + j)
}

/// Build a `rows × cols` block grid.
pub fn build_grid(rows: u32, cols: u32) -> MapFeatures {
    let mut streets = Vec::with_capacity((rows + cols + 2) as usize);
    for i in 0..=rows {
        let lat = i as f64 * BLOCK;
        let coords = (0..=cols).map(|j| GeoPoint::new(lat, j as f64 * BLOCK)).collect();
        streets.push(Street::new(east_west(i), coords));
    }
    for j in 0..=cols {
        let lon = j as f64 * BLOCK;
        let coords = (0..=rows).map(|i| GeoPoint::new(i as f64 * BLOCK, lon)).collect();
        streets.push(Street::new(north_south(j), coords));
    }
    annotate_intersections(&mut streets);

    let mut units = Vec::with_capacity((rows * cols) as usize);
    for i in 0..rows {
        for j in 0..cols {
            units.push(lot(i, j, cols));
        }
    }
    MapFeatures::from_records(streets, units)
}

fn lot(i: u32, j: u32, cols: u32) -> Unit {
    let front = i as f64 * BLOCK + SETBACK;
    let back = front + LOT_DEPTH;
    let west = j as f64 * BLOCK + LOT_MARGIN;
    let east = (j + 1) as f64 * BLOCK - LOT_MARGIN;
    let id = |j: u32| UnitId(i * cols + j);
    Unit {
        id:        id(j),
        polygon:   vec![
            GeoPoint::new(front, west),
            GeoPoint::new(front, east),
            GeoPoint::new(back, east),
            GeoPoint::new(back, west),
        ],
        street:    east_west(i),
        anchors:   [GeoPoint::new(front, west), GeoPoint::new(front, east)],
        neighbors: UnitNeighbors {
            previous: (j > 0).then(|| id(j - 1)),
            next:     (j + 1 < cols).then(|| id(j + 1)),
            across:   None,
        },
    }
}
