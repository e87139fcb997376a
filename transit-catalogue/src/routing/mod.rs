//! Route planning: the weighted graph, its construction from the
//! catalogue, and shortest-time queries.
//!
//! Every stop owns a pair of vertices. The even vertex is "standing at
//! the stop"; the odd one is "aboard, ready to depart". A wait edge
//! links the pair at the configured boarding cost, and each bus
//! contributes one ride edge per ordered pair of its route positions,
//! so staying aboard past intermediate stops never pays the wait cost
//! again. Queries run Dijkstra over the result.

mod build;
mod config;
mod graph;
mod router;

pub use build::{TransitGraph, build_graph};
pub use config::RoutingSettings;
pub use graph::{Edge, EdgeId, Graph, GraphError, VertexId};
pub use router::{RoutePlan, Router, UnknownStop};
