//! Route search trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The planner calls search through the [`RouteSearch`] trait, so an
//! application can swap in A* or a contraction hierarchy without touching
//! the orchestration code.
//!
//! # Costs
//!
//! Costs are supplied per call as a slice indexed by `EdgeId`.  The graph
//! itself carries no weights, which keeps concurrent requests with different
//! route types from ever sharing mutable state.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use sr_core::{EdgeId, GeoPoint, NodeId};

use crate::network::RoadGraph;
use crate::{SpatialError, SpatialResult};

// ── NodePath ──────────────────────────────────────────────────────────────────

/// The result of a search: the visited nodes in order and the summed cost.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePath {
    /// Nodes from source to destination inclusive.  Never empty.
    pub nodes: Vec<NodeId>,
    pub total_cost: f64,
}

impl NodePath {
    /// `true` when source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Number of edges traversed.
    pub fn step_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

// ── RouteSearch trait ─────────────────────────────────────────────────────────

/// Pluggable weighted shortest-path search.
///
/// Implementations must be `Send + Sync` so one instance can serve
/// concurrent planning requests.
pub trait RouteSearch: Send + Sync {
    /// Cheapest path between two graph nodes under `costs`.
    ///
    /// `from == to` yields a one-node path with zero cost.  An unreachable
    /// destination yields [`SpatialError::NoPath`].
    fn shortest_path(
        &self,
        graph: &RoadGraph,
        costs: &[f64],
        from: NodeId,
        to: NodeId,
    ) -> SpatialResult<NodePath>;

    /// Snap `origin` and `destination` to their nearest graph nodes, then
    /// run [`shortest_path`](Self::shortest_path).
    fn search(
        &self,
        graph: &RoadGraph,
        costs: &[f64],
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> SpatialResult<NodePath> {
        let from = graph.snap_to_node(origin).ok_or(SpatialError::EmptyGraph)?;
        let to = graph.snap_to_node(destination).ok_or(SpatialError::EmptyGraph)?;
        self.shortest_path(graph, costs, from, to)
    }
}

// ── DijkstraSearch ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR multigraph.
///
/// Every parallel edge is relaxed, so the cheapest of them determines the
/// hop cost.  Costs must be finite and non-negative.
pub struct DijkstraSearch;

impl RouteSearch for DijkstraSearch {
    fn shortest_path(
        &self,
        graph: &RoadGraph,
        costs: &[f64],
        from: NodeId,
        to: NodeId,
    ) -> SpatialResult<NodePath> {
        dijkstra(graph, costs, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap entry ordered so that `BinaryHeap` pops the smallest cost first.
/// Secondary key `NodeId` gives deterministic tie-breaking.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

fn dijkstra(
    graph: &RoadGraph,
    costs: &[f64],
    from: NodeId,
    to: NodeId,
) -> SpatialResult<NodePath> {
    if costs.len() != graph.edge_count() {
        return Err(SpatialError::CostLengthMismatch {
            expected: graph.edge_count(),
            got:      costs.len(),
        });
    }
    for node in [from, to] {
        if node.index() >= graph.node_count() {
            return Err(SpatialError::NodeNotFound(node));
        }
    }
    if from == to {
        return Ok(NodePath { nodes: vec![from], total_cost: 0.0 });
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(Frontier { cost: 0.0, node: from });

    while let Some(Frontier { cost, node }) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + costs[edge.index()];

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Frontier { cost: new_cost, node: neighbor });
            }
        }
    }

    Err(SpatialError::NoPath { from, to })
}

fn reconstruct(
    graph: &RoadGraph,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    total_cost: f64,
) -> NodePath {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        cur = graph.edge_from[e.index()];
        nodes.push(cur);
    }
    nodes.reverse();
    NodePath { nodes, total_cost }
}
