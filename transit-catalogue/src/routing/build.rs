//! Compilation of the catalogue and distance table into a route graph.
//!
//! Every stop owns a pair of vertices: the even one means "standing at
//! the stop", the odd one "aboard a bus at the stop". The wait edge
//! even→odd charges the fixed boarding delay; ride edges run from the
//! odd vertex of one stop to the even vertex of a later stop on the
//! same route, so each leg pays exactly one wait. Ride edges cover all
//! position pairs `i < j`, not only neighbours, letting the search
//! ride through intermediate stops without re-boarding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::RoutingSettings;
use super::graph::{Edge, Graph, VertexId};
use crate::catalogue::{Catalogue, StopId};
use crate::distances::{DistanceTable, MissingDistance};

/// The built graph together with the stop-name index into it.
///
/// Vertex and edge numbering is defined by the build, so the two parts
/// are meaningless apart and always travel as one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitGraph {
    pub graph: Graph,
    /// Stop name → its even ("standing") vertex.
    pub stop_vertices: BTreeMap<String, VertexId>,
}

impl TransitGraph {
    /// The vertex where a passenger at the named stop starts and ends.
    pub fn stop_vertex(&self, name: &str) -> Option<VertexId> {
        self.stop_vertices.get(name).copied()
    }
}

/// Builds the route graph.
///
/// Stops take vertex pairs in name-ascending order and buses emit
/// their edge blocks in name-ascending order, so identical input
/// yields identical numbering, run after run.
///
/// # Errors
///
/// Fails if any consecutive route pair has no recorded road distance.
pub fn build_graph(
    catalogue: &Catalogue,
    distances: &DistanceTable,
    settings: &RoutingSettings,
) -> Result<TransitGraph, MissingDistance> {
    let mut graph = Graph::with_vertices(2 * catalogue.stop_count());
    let mut stop_vertices = BTreeMap::new();
    let mut vertex_of_stop = vec![0; catalogue.stop_count()];

    let mut vertex: VertexId = 0;
    for (id, stop) in catalogue.sorted_stops() {
        stop_vertices.insert(stop.name.clone(), vertex);
        vertex_of_stop[id.0] = vertex;
        graph.add_edge(Edge {
            label: stop.name.clone(),
            span: 0,
            from: vertex,
            to: vertex + 1,
            weight: settings.bus_wait_time,
        });
        vertex += 2;
    }

    for (_, bus) in catalogue.sorted_buses() {
        add_ride_edges(
            &mut graph,
            distances,
            settings,
            &vertex_of_stop,
            &bus.name,
            &bus.route,
        )?;
        if !bus.is_roundtrip {
            let reversed: Vec<StopId> = bus.route.iter().rev().copied().collect();
            add_ride_edges(
                &mut graph,
                distances,
                settings,
                &vertex_of_stop,
                &bus.name,
                &reversed,
            )?;
        }
    }

    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "route graph built"
    );
    Ok(TransitGraph {
        graph,
        stop_vertices,
    })
}

/// Emits a ride edge for every position pair `i < j` along `route`.
///
/// Cumulative metres are prefixed once, so the quadratic pair loop does
/// constant work per edge.
fn add_ride_edges(
    graph: &mut Graph,
    distances: &DistanceTable,
    settings: &RoutingSettings,
    vertex_of_stop: &[VertexId],
    bus_name: &str,
    route: &[StopId],
) -> Result<(), MissingDistance> {
    let mut cumulative = Vec::with_capacity(route.len());
    let mut total: u64 = 0;
    cumulative.push(total);
    for pair in route.windows(2) {
        total += u64::from(distances.distance(pair[0], pair[1])?);
        cumulative.push(total);
    }

    for i in 0..route.len() {
        for j in (i + 1)..route.len() {
            let metres = (cumulative[j] - cumulative[i]) as f64;
            graph.add_edge(Edge {
                label: bus_name.to_owned(),
                span: j - i,
                from: vertex_of_stop[route[i].0] + 1,
                to: vertex_of_stop[route[j].0],
                weight: settings.ride_minutes(metres),
            });
        }
    }
    Ok(())
}
