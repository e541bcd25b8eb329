//! Routing trait and default A* implementation.
//!
//! # Pluggability
//!
//! The trip composer calls routing via the [`Router`] trait, so hosts can
//! swap in another search (contraction hierarchies, congestion-aware costs)
//! without touching the simulation core.
//!
//! # Cost units
//!
//! Costs are distances along the street geometry.  The A* heuristic is the
//! straight-line distance to the goal, which never overestimates because an
//! edge is never shorter than the chord between its endpoints.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use am_core::{EdgeId, NodeId};

use crate::network::StreetGraph;
use crate::SpatialError;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes visited in order, from source to destination inclusive.
    pub nodes: Vec<NodeId>,
    /// Edges traversed in order; always `nodes.len() - 1` long.
    pub edges: Vec<EdgeId>,
    /// Sum of edge lengths.
    pub total_distance: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to`.
    ///
    /// `from == to` yields a trivial route.  A disconnected pair yields
    /// [`SpatialError::NoRoute`].
    fn route(&self, graph: &StreetGraph, from: NodeId, to: NodeId) -> Result<Route, SpatialError>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Distance-weighted A* over the CSR street graph.
///
/// Disabled (removed) edge directions are skipped.  Ties in the open set are
/// broken by `NodeId` so results are deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarRouter;

impl Router for AStarRouter {
    fn route(&self, graph: &StreetGraph, from: NodeId, to: NodeId) -> Result<Route, SpatialError> {
        astar(graph, from, to)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

fn astar(graph: &StreetGraph, from: NodeId, to: NodeId) -> Result<Route, SpatialError> {
    let n = graph.node_count();
    for node in [from, to] {
        if node.index() >= n {
            return Err(SpatialError::NodeNotFound(node));
        }
    }
    if from == to {
        return Ok(Route { nodes: vec![from], edges: vec![], total_distance: 0.0 });
    }

    let goal = graph.node_pos[to.index()];
    let heuristic = |node: NodeId| OrderedFloat(graph.node_pos[node.index()].distance(goal));

    // g[v] = best known distance from `from` to v.
    let mut g         = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut closed    = vec![false; n];

    g[from.index()] = 0.0;

    // Min-heap on (f = g + h, node).
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((heuristic(from), from)));

    while let Some(Reverse((_, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, g[to.index()]));
        }
        if closed[node.index()] {
            continue;
        }
        closed[node.index()] = true;

        let cost = g[node.index()];
        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            if closed[neighbor.index()] {
                continue;
            }
            let new_cost = cost + graph.edge_length[edge.index()];
            if new_cost < g[neighbor.index()] {
                g[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((OrderedFloat(new_cost) + heuristic(neighbor), neighbor)));
            }
        }
    }

    Err(SpatialError::NoRoute { from, to })
}

fn reconstruct(
    graph: &StreetGraph,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    total_distance: f64,
) -> Route {
    let mut edges = Vec::new();
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = graph.edge_from[e.index()];
        nodes.push(cur);
    }
    edges.reverse();
    nodes.reverse();
    Route { nodes, edges, total_distance }
}
