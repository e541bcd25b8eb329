//! Polyline and polygon helpers over planar [`GeoPoint`]s.
//!
//! Streets are polylines, units are polygon rings.  Positions along a
//! polyline are expressed as arc length from its first vertex, which lets
//! callers compare "how far along the street" two points are without caring
//! which segment they sit on.

use am_core::GeoPoint;

/// Two points closer than this are treated as the same coordinate when
/// deduplicating slices.
pub const COINCIDENT_TOLERANCE: f64 = 1e-9;

/// A point projected onto a polyline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinePosition {
    /// The projected point, lying on the polyline.
    pub point: GeoPoint,
    /// Index of the segment (`coords[segment] → coords[segment + 1]`) it lies on.
    pub segment: usize,
    /// Arc length from the first vertex to `point`.
    pub along: f64,
    /// Distance from the query point to `point`.
    pub offset: f64,
}

/// Total length of a polyline.
pub fn polyline_length(coords: &[GeoPoint]) -> f64 {
    coords.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Length of the polyline between two vertex indices, in either order.
pub fn length_between(coords: &[GeoPoint], a: usize, b: usize) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    polyline_length(&coords[lo..=hi])
}

/// Cumulative arc length at each vertex.  `out[0] == 0.0`.
pub fn cumulative_lengths(coords: &[GeoPoint]) -> Vec<f64> {
    let mut out = Vec::with_capacity(coords.len());
    let mut acc = 0.0;
    for (i, p) in coords.iter().enumerate() {
        if i > 0 {
            acc += coords[i - 1].distance(*p);
        }
        out.push(acc);
    }
    out
}

/// Nearest point on segment `a → b` to `p`, with its fraction along the segment.
fn project_on_segment(a: GeoPoint, b: GeoPoint, p: GeoPoint) -> (GeoPoint, f64) {
    let dlat = b.lat - a.lat;
    let dlon = b.lon - a.lon;
    let len_2 = dlat * dlat + dlon * dlon;
    if len_2 == 0.0 {
        return (a, 0.0);
    }
    let t = (((p.lat - a.lat) * dlat + (p.lon - a.lon) * dlon) / len_2).clamp(0.0, 1.0);
    (a.lerp(b, t), t)
}

/// Project `p` onto the polyline.  Ties go to the earliest segment.
///
/// Returns `None` for an empty polyline.
pub fn project_onto(coords: &[GeoPoint], p: GeoPoint) -> Option<LinePosition> {
    match coords {
        [] => None,
        [only] => Some(LinePosition { point: *only, segment: 0, along: 0.0, offset: only.distance(p) }),
        _ => {
            let mut best: Option<LinePosition> = None;
            let mut along_start = 0.0;
            for (segment, w) in coords.windows(2).enumerate() {
                let (point, t) = project_on_segment(w[0], w[1], p);
                let seg_len = w[0].distance(w[1]);
                let offset = point.distance(p);
                if best.is_none_or(|b| offset < b.offset) {
                    best = Some(LinePosition { point, segment, along: along_start + t * seg_len, offset });
                }
                along_start += seg_len;
            }
            best
        }
    }
}

/// Distance from `p` to the nearest point of the polyline.
pub fn distance_to_polyline(coords: &[GeoPoint], p: GeoPoint) -> f64 {
    project_onto(coords, p).map_or(f64::INFINITY, |pos| pos.offset)
}

/// The polyline's geometry between two projected positions, ordered from
/// `from` to `to` regardless of the polyline's own vertex order.
///
/// Both endpoints are included; consecutive duplicates (a position sitting
/// exactly on a vertex) are dropped.
pub fn slice_between(coords: &[GeoPoint], from: &LinePosition, to: &LinePosition) -> Vec<GeoPoint> {
    let mut out = vec![from.point];
    if from.along <= to.along {
        for i in (from.segment + 1)..=to.segment {
            out.push(coords[i]);
        }
    } else {
        for i in ((to.segment + 1)..=from.segment).rev() {
            out.push(coords[i]);
        }
    }
    out.push(to.point);
    dedup_consecutive(&mut out, COINCIDENT_TOLERANCE);
    out
}

/// Remove points that repeat their predecessor within `tol`.
pub fn dedup_consecutive(points: &mut Vec<GeoPoint>, tol: f64) {
    points.dedup_by(|b, a| a.approx_eq(*b, tol));
}

/// Ring vertices without the closing duplicate, if the ring has one.
fn open_ring(polygon: &[GeoPoint]) -> &[GeoPoint] {
    match polygon {
        [first, .., last] if polygon.len() > 3 && first.approx_eq(*last, COINCIDENT_TOLERANCE) => {
            &polygon[..polygon.len() - 1]
        }
        _ => polygon,
    }
}

/// Even-odd ray casting test.  Works for open or closed rings.
pub fn point_in_polygon(polygon: &[GeoPoint], p: GeoPoint) -> bool {
    let ring = open_ring(polygon);
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > p.lat) != (b.lat > p.lat) {
            let cross_lon = a.lon + (p.lat - a.lat) / (b.lat - a.lat) * (b.lon - a.lon);
            if p.lon < cross_lon {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to the ring's boundary (closing edge included).
pub fn distance_to_ring(polygon: &[GeoPoint], p: GeoPoint) -> f64 {
    let ring = open_ring(polygon);
    match ring {
        [] => f64::INFINITY,
        [only] => only.distance(p),
        _ => {
            let closing = project_on_segment(ring[ring.len() - 1], ring[0], p).0.distance(p);
            ring.windows(2)
                .map(|w| project_on_segment(w[0], w[1], p).0.distance(p))
                .fold(closing, f64::min)
        }
    }
}

/// `true` if `p` is inside the polygon or within `buffer` of its boundary.
pub fn within_polygon_buffered(polygon: &[GeoPoint], p: GeoPoint, buffer: f64) -> bool {
    point_in_polygon(polygon, p) || distance_to_ring(polygon, p) <= buffer
}

/// Vertex average of the ring.  Adequate for the convex lots units are.
pub fn centroid(polygon: &[GeoPoint]) -> Option<GeoPoint> {
    let ring = open_ring(polygon);
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (lat, lon) = ring.iter().fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
    Some(GeoPoint::new(lat / n, lon / n))
}

/// Axis-aligned bounds `(min, max)` of a point set.
pub fn bounds(points: &[GeoPoint]) -> Option<(GeoPoint, GeoPoint)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (
            GeoPoint::new(lo.lat.min(p.lat), lo.lon.min(p.lon)),
            GeoPoint::new(hi.lat.max(p.lat), hi.lon.max(p.lon)),
        )
    }))
}
