//! Shortest-time route queries over the built graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::build::TransitGraph;
use super::graph::{Edge, EdgeId, Graph, VertexId};

/// A stop name that is not part of the routing index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stop {name:?} is not in the routing index")]
pub struct UnknownStop {
    pub name: String,
}

/// An optimal route: total minutes plus the edges that make it up, in
/// travel order. Edge ids resolve through the router that produced
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub total_time: f64,
    pub edges: Vec<EdgeId>,
}

/// Heap entry for the search; ordering is reversed so the binary
/// max-heap pops the cheapest vertex, with the vertex id breaking cost
/// ties to keep exploration order deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    cost: OrderedFloat<f64>,
    vertex: VertexId,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Answers shortest-time queries against a finished graph.
///
/// Construction takes ownership of the graph; the router is immutable
/// afterwards, so shared references can serve queries concurrently.
#[derive(Debug)]
pub struct Router {
    transit: TransitGraph,
}

impl Router {
    pub fn new(transit: TransitGraph) -> Self {
        Self { transit }
    }

    pub fn graph(&self) -> &Graph {
        &self.transit.graph
    }

    /// Random-access edge lookup for rendering a plan into steps.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.transit.graph.edge(id)
    }

    /// The fastest route between two named stops.
    ///
    /// Returns `Ok(None)` when no path exists: an unreachable stop is
    /// a normal outcome, not an error. A degenerate query from a stop
    /// to itself yields an empty plan with zero total time.
    ///
    /// # Errors
    ///
    /// Fails with [`UnknownStop`] if either name is absent from the
    /// index.
    pub fn find_route(&self, from: &str, to: &str) -> Result<Option<RoutePlan>, UnknownStop> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        Ok(self.shortest_path(source, target))
    }

    fn resolve(&self, name: &str) -> Result<VertexId, UnknownStop> {
        self.transit.stop_vertex(name).ok_or_else(|| UnknownStop {
            name: name.to_owned(),
        })
    }

    /// Dijkstra with early exit: all weights are non-negative, so the
    /// first time the target is popped its distance is final.
    fn shortest_path(&self, source: VertexId, target: VertexId) -> Option<RoutePlan> {
        let graph = &self.transit.graph;
        let mut best = vec![f64::INFINITY; graph.vertex_count()];
        let mut prev_edge: Vec<Option<EdgeId>> = vec![None; graph.vertex_count()];
        let mut queue = BinaryHeap::new();

        best[source] = 0.0;
        queue.push(QueueEntry {
            cost: OrderedFloat(0.0),
            vertex: source,
        });

        while let Some(QueueEntry { cost, vertex }) = queue.pop() {
            if vertex == target {
                break;
            }
            if cost.0 > best[vertex] {
                continue; // stale entry
            }

            for &edge_id in graph.edges_from(vertex) {
                let edge = &graph.edges()[edge_id];
                let candidate = cost.0 + edge.weight;
                if candidate < best[edge.to] {
                    best[edge.to] = candidate;
                    prev_edge[edge.to] = Some(edge_id);
                    queue.push(QueueEntry {
                        cost: OrderedFloat(candidate),
                        vertex: edge.to,
                    });
                }
            }
        }

        if best[target].is_infinite() {
            return None;
        }

        // Walk the predecessor edges back from the target.
        let mut edges = Vec::new();
        let mut vertex = target;
        while let Some(edge_id) = prev_edge[vertex] {
            edges.push(edge_id);
            vertex = graph.edges()[edge_id].from;
        }
        edges.reverse();

        Some(RoutePlan {
            total_time: best[target],
            edges,
        })
    }
}
