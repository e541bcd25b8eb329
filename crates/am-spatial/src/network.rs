//! Street graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length`, `edge_street`)
//! are sorted by source node and indexed by `EdgeId`.
//!
//! # Segmentation
//!
//! Each street contributes one node per intersection plus its two
//! endpoints.  Consecutive nodes along a street are joined by an undirected
//! edge (a pair of directed edges) weighted by the true distance along the
//! street geometry between them.  Intersection points recorded by both
//! streets resolve to the same node.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps coordinates to the nearest `NodeId`.

use std::collections::{BTreeMap, BTreeSet};

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use am_core::{EdgeId, GeoPoint, NodeId, StreetId};

use crate::feature::{point_key, Street};
use crate::geometry;

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── StreetNode ────────────────────────────────────────────────────────────────

/// A graph node as seen from one street: the node and the index of its
/// coordinate in that street's polyline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StreetNode {
    pub index: usize,
    pub node:  NodeId,
}

// ── StreetGraph ───────────────────────────────────────────────────────────────

/// Weighted street graph in CSR format plus a spatial index for node snapping.
///
/// Symmetric when built; one direction of an edge can later be disabled with
/// [`remove_directed_edge`](Self::remove_directed_edge).  Build with
/// [`StreetGraph::build`] or [`StreetGraphBuilder`].
pub struct StreetGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Streets passing through each node, ascending.  Indexed by `NodeId`.
    pub node_streets: Vec<Vec<StreetId>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,

    /// Distance along the street geometry.
    pub edge_length: Vec<f64>,

    /// The street each edge runs along.
    pub edge_street: Vec<StreetId>,

    /// `false` once a direction has been removed by the host.
    edge_enabled: Vec<bool>,

    // ── Lookups ───────────────────────────────────────────────────────────
    /// Nodes on each street in coordinate order.
    street_nodes: BTreeMap<StreetId, Vec<StreetNode>>,

    node_by_key: FxHashMap<(i64, i64), NodeId>,

    spatial_idx: RTree<NodeEntry>,
}

impl StreetGraph {
    /// An empty graph; every route request against it fails.
    pub fn empty() -> Self {
        StreetGraphBuilder::new().build()
    }

    /// Segment every street into nodes and edges.
    ///
    /// Idempotent: calling it again with the same streets produces an
    /// identical graph, so hosts rebuild simply by calling it again after
    /// changing the street set.
    pub fn build<'a>(streets: impl IntoIterator<Item = &'a Street>) -> Self {
        let mut b = StreetGraphBuilder::new();
        for street in streets {
            b.add_street(street);
        }
        let graph = b.build();
        log::debug!(
            "built street graph: {} nodes, {} directed edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all enabled outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end)
            .filter(|&i| self.edge_enabled[i])
            .map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).count()
    }

    /// `true` if `street` passes through `node`.
    pub fn node_on_street(&self, node: NodeId, street: StreetId) -> bool {
        self.node_streets
            .get(node.index())
            .is_some_and(|s| s.binary_search(&street).is_ok())
    }

    /// Disable every edge running from `from` to `to`, leaving the reverse
    /// direction intact.  Returns `true` if any edge was disabled.
    pub fn remove_directed_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        if from.index() >= self.node_count() {
            return false;
        }
        let start = self.node_out_start[from.index()] as usize;
        let end   = self.node_out_start[from.index() + 1] as usize;
        let mut removed = false;
        for i in start..end {
            if self.edge_to[i] == to && self.edge_enabled[i] {
                self.edge_enabled[i] = false;
                removed = true;
            }
        }
        removed
    }

    // ── Node lookups ──────────────────────────────────────────────────────

    /// The node at exactly `pos` (to within 1e-9), if there is one.
    pub fn node_at(&self, pos: GeoPoint) -> Option<NodeId> {
        self.node_by_key.get(&point_key(pos)).copied()
    }

    /// The node nearest to `pos`.  `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.node_at(pos).or_else(|| {
            self.spatial_idx
                .nearest_neighbor(&[pos.lat, pos.lon])
                .map(|e| e.id)
        })
    }

    /// Nodes on `street` in coordinate order (empty for unknown streets).
    pub fn street_nodes(&self, street: StreetId) -> &[StreetNode] {
        self.street_nodes.get(&street).map_or(&[], Vec::as_slice)
    }

    /// The node on `street` nearest to `pos`.  Ties go to the node earlier
    /// along the street.
    pub fn nearest_node_on_street(&self, street: StreetId, pos: GeoPoint) -> Option<NodeId> {
        self.street_nodes(street)
            .iter()
            .min_by(|a, b| {
                let da = self.node_pos[a.node.index()].distance_2(pos);
                let db = self.node_pos[b.node.index()].distance_2(pos);
                da.total_cmp(&db)
            })
            .map(|n| n.node)
    }
}

// ── StreetGraphBuilder ────────────────────────────────────────────────────────

/// Construct a [`StreetGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes are deduplicated by coordinate, so adding the same point twice (as
/// two streets' records of one intersection do) yields one node.
///
/// # Example
///
/// ```
/// use am_core::{GeoPoint, StreetId};
/// use am_spatial::StreetGraphBuilder;
///
/// let mut b = StreetGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(0.0, 0.0));
/// let c = b.add_node(GeoPoint::new(0.0, 100.0));
/// assert_eq!(b.add_node(GeoPoint::new(0.0, 0.0)), a);
/// b.add_road(a, c, 100.0, StreetId(1));
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // both directions
/// ```
#[derive(Default)]
pub struct StreetGraphBuilder {
    nodes:        Vec<GeoPoint>,
    node_streets: Vec<BTreeSet<StreetId>>,
    node_by_key:  FxHashMap<(i64, i64), NodeId>,
    raw_edges:    Vec<RawEdge>,
    street_nodes: BTreeMap<StreetId, Vec<StreetNode>>,
}

struct RawEdge {
    from:   NodeId,
    to:     NodeId,
    length: f64,
    street: StreetId,
}

impl StreetGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `pos`, or return the existing node there.
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let key = point_key(pos);
        if let Some(&id) = self.node_by_key.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.node_streets.push(BTreeSet::new());
        self.node_by_key.insert(key, id);
        id
    }

    /// Add a **directed** edge from `from` to `to` along `street`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length: f64, street: StreetId) {
        self.node_streets[from.index()].insert(street);
        self.node_streets[to.index()].insert(street);
        self.raw_edges.push(RawEdge { from, to, length, street });
    }

    /// Add edges in **both directions** between `a` and `b`.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length: f64, street: StreetId) {
        self.add_directed_edge(a, b, length, street);
        self.add_directed_edge(b, a, length, street);
    }

    /// Segment one street at its endpoints and intersections.
    ///
    /// Intersection indices are collected from every neighbouring street's
    /// record; a 3-way intersection listed under two neighbours yields one
    /// index.  A closed loop is also split at an interior vertex so it has
    /// two edges.  Streets with fewer than two coordinates are skipped.
    pub fn add_street(&mut self, street: &Street) {
        if street.coords.len() < 2 {
            log::warn!("skipping street {} with {} coordinate(s)", street.id, street.coords.len());
            return;
        }
        let last = street.coords.len() - 1;
        let mut indices: BTreeSet<usize> = street
            .intersections
            .values()
            .flatten()
            .map(|i| i.index)
            .filter(|&i| i <= last)
            .collect();
        indices.insert(0);
        indices.insert(last);
        // Two indices at the same point (a closed loop) would collapse into
        // one node with no edge between them; split at a vertex in between.
        let splits: Vec<usize> = indices
            .iter()
            .zip(indices.iter().skip(1))
            .filter(|&(&a, &b)| b - a >= 2 && point_key(street.coords[a]) == point_key(street.coords[b]))
            .map(|(&a, &b)| (a + b) / 2)
            .collect();
        indices.extend(splits);

        let mut on_street = Vec::with_capacity(indices.len());
        for &index in &indices {
            let node = self.add_node(street.coords[index]);
            self.node_streets[node.index()].insert(street.id);
            on_street.push(StreetNode { index, node });
        }

        for pair in on_street.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.node == b.node {
                continue;
            }
            let length = geometry::length_between(&street.coords, a.index, b.index);
            self.add_road(a.node, b.node, length, street.id);
        }
        self.street_nodes.insert(street.id, on_street);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`StreetGraph`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = edges.
    pub fn build(self) -> StreetGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order among a node's edges.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:   Vec<NodeId>   = raw.iter().map(|e| e.from).collect();
        let edge_to:     Vec<NodeId>   = raw.iter().map(|e| e.to).collect();
        let edge_length: Vec<f64>      = raw.iter().map(|e| e.length).collect();
        let edge_street: Vec<StreetId> = raw.iter().map(|e| e.street).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        StreetGraph {
            node_pos: self.nodes,
            node_streets: self.node_streets.into_iter().map(|s| s.into_iter().collect()).collect(),
            node_out_start,
            edge_from,
            edge_to,
            edge_length,
            edge_street,
            edge_enabled: vec![true; edge_count],
            street_nodes: self.street_nodes,
            node_by_key: self.node_by_key,
            spatial_idx,
        }
    }
}
