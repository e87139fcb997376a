//! The weighted directed graph the router searches.
//!
//! Plain edge-list storage with a per-vertex list of outgoing edge
//! ids. Edge ids are indices into the edge list and are part of the
//! public contract: route results reference edges by id, and snapshots
//! must restore the exact same numbering.

use serde::{Deserialize, Serialize};

/// Dense vertex identifier, assigned at build time.
pub type VertexId = usize;

/// Edge identifier: an index into the graph's edge list.
pub type EdgeId = usize;

/// One directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Stop name for wait edges, bus name for ride edges.
    pub label: String,
    /// Stops advanced: 0 marks a wait edge, anything else a ride.
    pub span: usize,
    pub from: VertexId,
    pub to: VertexId,
    /// Minutes.
    pub weight: f64,
}

impl Edge {
    /// True for the boarding-delay edge attached to each stop.
    pub fn is_wait(&self) -> bool {
        self.span == 0
    }
}

/// A decoded graph that cannot be assembled consistently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge endpoint lies outside the vertex range
    #[error("edge {edge} references vertex {vertex}, graph has {vertices} vertices")]
    VertexOutOfRange {
        edge: EdgeId,
        vertex: VertexId,
        vertices: usize,
    },

    /// An incidence list disagrees with the edge list
    #[error("incidence list of vertex {vertex} does not match the edge list")]
    InconsistentIncidence { vertex: VertexId },
}

/// Immutable after construction; vertices are `0..vertex_count()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    edges: Vec<Edge>,
    /// Outgoing edge ids per vertex.
    incidence: Vec<Vec<EdgeId>>,
}

impl Graph {
    /// An edgeless graph over a fixed vertex range.
    pub fn with_vertices(count: usize) -> Self {
        Graph {
            edges: Vec::new(),
            incidence: vec![Vec::new(); count],
        }
    }

    /// Appends an edge and returns its id. Ids are assigned
    /// sequentially from zero.
    ///
    /// Panics if `edge.from` is outside the vertex range.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = self.edges.len();
        self.incidence[edge.from].push(id);
        self.edges.push(edge);
        id
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Ids of the edges leaving `vertex`, in insertion order.
    pub fn edges_from(&self, vertex: VertexId) -> &[EdgeId] {
        &self.incidence[vertex]
    }

    /// Per-vertex outgoing edge ids, for persistence.
    pub fn incidence(&self) -> &[Vec<EdgeId>] {
        &self.incidence
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Reassembles a graph from its persisted parts, verifying that
    /// they describe a consistent whole: every endpoint in range, every
    /// incidence entry pointing at an edge that leaves its vertex, and
    /// every edge present in exactly one incidence list.
    pub fn from_parts(edges: Vec<Edge>, incidence: Vec<Vec<EdgeId>>) -> Result<Self, GraphError> {
        let vertices = incidence.len();
        for (id, edge) in edges.iter().enumerate() {
            for vertex in [edge.from, edge.to] {
                if vertex >= vertices {
                    return Err(GraphError::VertexOutOfRange {
                        edge: id,
                        vertex,
                        vertices,
                    });
                }
            }
        }

        let mut listed = vec![false; edges.len()];
        for (vertex, outgoing) in incidence.iter().enumerate() {
            for &id in outgoing {
                match edges.get(id) {
                    Some(edge) if edge.from == vertex && !listed[id] => listed[id] = true,
                    _ => return Err(GraphError::InconsistentIncidence { vertex }),
                }
            }
        }
        if let Some(missing) = listed.iter().position(|seen| !seen) {
            return Err(GraphError::InconsistentIncidence {
                vertex: edges[missing].from,
            });
        }

        Ok(Graph { edges, incidence })
    }
}
