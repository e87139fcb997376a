//! Binary snapshots: everything the query phase needs, written once by
//! the build phase.
//!
//! The on-disk form stores plain vectors and maps rather than the live
//! structures, so loading re-runs every catalogue and graph invariant
//! instead of trusting the file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalogue::{Bus, Catalogue, Stop, StopId};
use crate::distances::DistanceTable;
use crate::render::RenderSettings;
use crate::routing::{Edge, EdgeId, Graph, RoutingSettings, TransitGraph, VertexId};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encode: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("snapshot decode: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// The bytes decoded, but describe an impossible model.
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// A fully built network plus the settings it was built with.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub catalogue: Catalogue,
    pub distances: DistanceTable,
    pub routing_settings: RoutingSettings,
    pub render_settings: RenderSettings,
    pub transit: TransitGraph,
}

/// The serialized form. Stop ids refer to positions in `stops`.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    stops: Vec<Stop>,
    buses: Vec<Bus>,
    distances: Vec<(StopId, StopId, u32)>,
    routing_settings: RoutingSettings,
    render_settings: RenderSettings,
    edges: Vec<Edge>,
    incidence: Vec<Vec<EdgeId>>,
    stop_vertices: BTreeMap<String, VertexId>,
}

impl Snapshot {
    fn from_model(model: &Model) -> Self {
        Self {
            stops: model.catalogue.stops().to_vec(),
            buses: model.catalogue.buses().to_vec(),
            distances: model.distances.iter().collect(),
            routing_settings: model.routing_settings,
            render_settings: model.render_settings.clone(),
            edges: model.transit.graph.edges().to_vec(),
            incidence: model.transit.graph.incidence().to_vec(),
            stop_vertices: model.transit.stop_vertices.clone(),
        }
    }

    fn into_model(self) -> Result<Model, SnapshotError> {
        let Snapshot {
            stops,
            buses,
            distances,
            routing_settings,
            render_settings,
            edges,
            incidence,
            stop_vertices,
        } = self;

        let mut catalogue = Catalogue::new();
        for stop in &stops {
            catalogue
                .add_stop(&stop.name, stop.coordinates)
                .map_err(corrupt)?;
        }
        for bus in &buses {
            let route: Vec<&str> = bus
                .route
                .iter()
                .map(|&StopId(index)| {
                    stops.get(index).map(|stop| stop.name.as_str()).ok_or_else(
                        || {
                            SnapshotError::Corrupt(format!(
                                "bus {:?} references stop #{index}, but only {} stops are stored",
                                bus.name,
                                stops.len()
                            ))
                        },
                    )
                })
                .collect::<Result<_, _>>()?;
            catalogue
                .add_bus(&bus.name, &route, bus.is_roundtrip)
                .map_err(corrupt)?;
        }

        for &(from, to, _) in &distances {
            let out_of_range = from.0.max(to.0);
            if out_of_range >= stops.len() {
                return Err(SnapshotError::Corrupt(format!(
                    "distance entry references stop #{out_of_range}, but only {} stops are stored",
                    stops.len()
                )));
            }
        }
        let mut table = DistanceTable::new();
        table.set_distances(distances);

        let graph = Graph::from_parts(edges, incidence).map_err(corrupt)?;
        if graph.vertex_count() != 2 * catalogue.stop_count() {
            return Err(SnapshotError::Corrupt(format!(
                "{} vertices stored for {} stops",
                graph.vertex_count(),
                catalogue.stop_count()
            )));
        }
        if stop_vertices.len() != catalogue.stop_count() {
            return Err(SnapshotError::Corrupt(format!(
                "{} vertex entries stored for {} stops",
                stop_vertices.len(),
                catalogue.stop_count()
            )));
        }
        for (name, &vertex) in &stop_vertices {
            if catalogue.stop(name).is_none() {
                return Err(SnapshotError::Corrupt(format!(
                    "vertex entry for unknown stop {name:?}"
                )));
            }
            if vertex % 2 != 0 || vertex >= graph.vertex_count() {
                return Err(SnapshotError::Corrupt(format!(
                    "stop {name:?} mapped to invalid vertex {vertex}"
                )));
            }
        }

        Ok(Model {
            catalogue,
            distances: table,
            routing_settings,
            render_settings,
            transit: TransitGraph {
                graph,
                stop_vertices,
            },
        })
    }
}

fn corrupt(error: impl std::fmt::Display) -> SnapshotError {
    SnapshotError::Corrupt(error.to_string())
}

/// Writes the model to `path`, replacing any previous snapshot.
pub fn save(path: &Path, model: &Model) -> Result<(), SnapshotError> {
    let snapshot = Snapshot::from_model(model);
    let bytes = bincode::serde::encode_to_vec(&snapshot, bincode::config::standard())?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

/// Reads a model back, re-validating every invariant the builder
/// guarantees.
pub fn load(path: &Path) -> Result<Model, SnapshotError> {
    let file = File::open(path)?;
    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes)?;
    let (snapshot, _): (Snapshot, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot read");
    snapshot.into_model()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::routing::{Router, build_graph};

    fn model() -> Model {
        let mut catalogue = Catalogue::new();
        for (name, longitude) in [("A", 0.0), ("B", 1.0), ("C", 2.0)] {
            catalogue
                .add_stop(name, Coordinates::new(0.0, longitude))
                .unwrap();
        }
        let (a, _) = catalogue.stop("A").unwrap();
        let (b, _) = catalogue.stop("B").unwrap();
        let (c, _) = catalogue.stop("C").unwrap();
        let mut distances = DistanceTable::new();
        distances.set_distances([(a, b, 1000), (b, c, 1000)]);
        catalogue.add_bus("1", &["A", "B", "C"], true).unwrap();
        catalogue.add_bus("shuttle", &["A", "B"], false).unwrap();

        let routing_settings = RoutingSettings::new(5.0, 60.0);
        let transit = build_graph(&catalogue, &distances, &routing_settings).unwrap();
        Model {
            catalogue,
            distances,
            routing_settings,
            render_settings: RenderSettings::default(),
            transit,
        }
    }

    #[test]
    fn round_trip_preserves_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transit.db");
        let model = model();

        save(&path, &model).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, model);
    }

    #[test]
    fn loaded_graph_answers_queries_like_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transit.db");
        save(&path, &model()).unwrap();

        let loaded = load(&path).unwrap();
        let router = Router::new(loaded.transit);

        let plan = router.find_route("A", "C").unwrap().unwrap();
        assert_eq!(plan.total_time, 7.0);
        let steps: Vec<(&str, usize)> = plan
            .edges
            .iter()
            .map(|&id| {
                let edge = router.edge(id).unwrap();
                (edge.label.as_str(), edge.span)
            })
            .collect();
        assert_eq!(steps, [("A", 0), ("1", 2)]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let error = load(&dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(error, SnapshotError::Io(_)));
    }

    #[test]
    fn truncated_snapshot_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transit.db");
        save(&path, &model()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let error = load(&path).unwrap_err();
        assert!(matches!(error, SnapshotError::Decode(_)));
    }

    #[test]
    fn bus_referencing_missing_stop_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transit.db");
        let snapshot = Snapshot {
            stops: vec![Stop {
                name: "A".to_owned(),
                coordinates: Coordinates::new(0.0, 0.0),
            }],
            buses: vec![Bus {
                name: "ghost".to_owned(),
                route: vec![StopId(5)],
                is_roundtrip: true,
            }],
            distances: Vec::new(),
            routing_settings: RoutingSettings::default(),
            render_settings: RenderSettings::default(),
            edges: Vec::new(),
            incidence: Vec::new(),
            stop_vertices: BTreeMap::new(),
        };
        let bytes =
            bincode::serde::encode_to_vec(&snapshot, bincode::config::standard()).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let error = load(&path).unwrap_err();
        assert!(matches!(error, SnapshotError::Corrupt(_)));
        assert!(error.to_string().contains("ghost"));
    }

    #[test]
    fn odd_stop_vertex_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transit.db");
        let snapshot = Snapshot {
            stops: vec![Stop {
                name: "A".to_owned(),
                coordinates: Coordinates::new(0.0, 0.0),
            }],
            buses: Vec::new(),
            distances: Vec::new(),
            routing_settings: RoutingSettings::default(),
            render_settings: RenderSettings::default(),
            edges: vec![Edge {
                label: "A".to_owned(),
                span: 0,
                from: 0,
                to: 1,
                weight: 6.0,
            }],
            incidence: vec![vec![0], Vec::new()],
            stop_vertices: [("A".to_owned(), 1)].into_iter().collect(),
        };
        let bytes =
            bincode::serde::encode_to_vec(&snapshot, bincode::config::standard()).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let error = load(&path).unwrap_err();
        assert!(matches!(error, SnapshotError::Corrupt(_)));
        assert!(error.to_string().contains("invalid vertex"));
    }
}
