//! Street-network paths: orientation, sparsification, and excess-point
//! pruning on top of a [`Router`].
//!
//! A raw route lists every graph node it passes.  Agents only need the
//! points where they turn onto another street, since the trip composer
//! re-expands each same-street run along the street geometry.  A sparse path
//! therefore keeps one entry per street traversed.

use am_core::{GeoPoint, NodeId, StreetId};

use crate::network::StreetGraph;
use crate::router::{Route, Router};
use crate::{SpatialError, SpatialResult};

/// One node of a street-network path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathStep {
    pub node:  NodeId,
    pub point: GeoPoint,
    /// Street of the edge arriving at this node; `None` for the first step.
    pub street: Option<StreetId>,
}

/// A point off the graph that a path starts or ends at, and the street it
/// lies on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathAnchor {
    pub point:  GeoPoint,
    pub street: StreetId,
}

/// Expand a route into steps tagged with their arriving street.
pub fn route_steps(graph: &StreetGraph, route: &Route) -> Vec<PathStep> {
    route
        .nodes
        .iter()
        .enumerate()
        .map(|(i, &node)| PathStep {
            node,
            point: graph.node_pos[node.index()],
            street: i.checked_sub(1).map(|e| graph.edge_street[route.edges[e].index()]),
        })
        .collect()
}

/// Reverse `steps` if their first node is farther from `start` than their
/// last, retagging arriving streets for the new direction.
pub fn orient(steps: &mut [PathStep], start: GeoPoint) {
    let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
        return;
    };
    if first.point.distance(start) <= last.point.distance(start) {
        return;
    }
    reverse_steps(steps);
}

/// Reverse a path in place, retagging arriving streets for the new direction.
pub fn reverse_steps(steps: &mut [PathStep]) {
    // The street arriving at step i (old order) becomes the street leaving it.
    let streets: Vec<Option<StreetId>> = steps.iter().map(|s| s.street).collect();
    steps.reverse();
    let n = steps.len();
    for (k, step) in steps.iter_mut().enumerate() {
        step.street = if k == 0 { None } else { streets[n - k] };
    }
}

/// Collapse a path to one entry per street traversed.
///
/// Keeps the first and last steps, plus every step where the street leaving
/// it differs from the street arriving at it.  Applying it to an already
/// sparse path returns the path unchanged.
pub fn sparsify(steps: &[PathStep]) -> Vec<PathStep> {
    if steps.len() <= 2 {
        return steps.to_vec();
    }
    let last = steps.len() - 1;
    steps
        .iter()
        .enumerate()
        .filter(|&(i, step)| i == 0 || i == last || step.street != steps[i + 1].street)
        .map(|(_, step)| *step)
        .collect()
}

/// Remove detours caused by a nearest-intersection lookup landing behind
/// the true start (or beyond the true goal).
///
/// At the front: if the first two steps both lie on the start's street and
/// the second is closer to the start than to the first, the first step is
/// behind the start and is dropped.  The end is handled symmetrically
/// against the goal.  Needs at least two steps on a side to act.
pub fn prune_excess(
    steps: &mut Vec<PathStep>,
    graph: &StreetGraph,
    start: &PathAnchor,
    goal:  &PathAnchor,
) {
    if steps.len() >= 2 {
        let (a, b) = (steps[0], steps[1]);
        if graph.node_on_street(a.node, start.street)
            && graph.node_on_street(b.node, start.street)
            && b.point.distance(start.point) < b.point.distance(a.point)
        {
            steps.remove(0);
            steps[0].street = None;
        }
    }
    let n = steps.len();
    if n >= 2 {
        let (a, b) = (steps[n - 2], steps[n - 1]);
        if graph.node_on_street(a.node, goal.street)
            && graph.node_on_street(b.node, goal.street)
            && a.point.distance(goal.point) < a.point.distance(b.point)
        {
            steps.pop();
        }
    }
}

// ── PathFinder ────────────────────────────────────────────────────────────────

/// Shortest paths between coordinates, with optional sparsification.
pub struct PathFinder<R: Router> {
    pub router: R,
}

impl<R: Router> PathFinder<R> {
    pub fn new(router: R) -> Self {
        Self { router }
    }

    /// Path between the graph nodes at (or nearest to) `start` and `goal`,
    /// oriented to begin at the end nearest `start`.
    pub fn find(
        &self,
        graph: &StreetGraph,
        start: GeoPoint,
        goal: GeoPoint,
        sparse: bool,
    ) -> SpatialResult<Vec<PathStep>> {
        let from = graph.snap_to_node(start).ok_or_else(empty_graph)?;
        let to   = graph.snap_to_node(goal).ok_or_else(empty_graph)?;
        self.find_between(graph, from, to, start, sparse)
    }

    /// Path between two known nodes.  `start` is the true start point used
    /// to orient the result.
    pub fn find_between(
        &self,
        graph: &StreetGraph,
        from: NodeId,
        to: NodeId,
        start: GeoPoint,
        sparse: bool,
    ) -> SpatialResult<Vec<PathStep>> {
        let route = self.router.route(graph, from, to)?;
        let mut steps = route_steps(graph, &route);
        orient(&mut steps, start);
        Ok(if sparse { sparsify(&steps) } else { steps })
    }

    /// Sparse path between two off-graph points on known streets.
    ///
    /// Each anchor is joined to the graph at the nearest node on its own
    /// street, then excess points are pruned once at each end.  The result
    /// always begins at the start street's node: orientation is fixed by
    /// node identity rather than distance, since the start node may lie
    /// farther from the start point than the goal node does.
    pub fn find_between_streets(
        &self,
        graph: &StreetGraph,
        start: &PathAnchor,
        goal: &PathAnchor,
    ) -> SpatialResult<Vec<PathStep>> {
        let from = graph
            .nearest_node_on_street(start.street, start.point)
            .ok_or(SpatialError::UnknownStreet(start.street))?;
        let to = graph
            .nearest_node_on_street(goal.street, goal.point)
            .ok_or(SpatialError::UnknownStreet(goal.street))?;
        let route = self.router.route(graph, from, to)?;
        let mut steps = route_steps(graph, &route);
        if steps.first().is_some_and(|s| s.node != from) {
            reverse_steps(&mut steps);
        }
        let mut steps = sparsify(&steps);
        prune_excess(&mut steps, graph, start, goal);
        Ok(steps)
    }
}

fn empty_graph() -> SpatialError {
    SpatialError::Geometry("street graph has no nodes".into())
}
