//! Wire types for the JSON input document and the response array.
//!
//! Requests are tagged unions over a `type` field; responses are
//! untagged because each shape is distinguished by its keys. Response
//! fields are declared in alphabetical order so serialized documents
//! are stable.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::RenderSettings;
use crate::routing::{Graph, RoutePlan, RoutingSettings};
use crate::stats::BusStatistics;

/// The whole input document. Both CLI modes parse this shape; each
/// reads the sections it needs and ignores the rest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputDocument {
    pub serialization_settings: SerializationSettings,
    pub routing_settings: Option<RoutingSettings>,
    pub render_settings: Option<RenderSettings>,
    #[serde(default)]
    pub base_requests: Vec<BaseRequest>,
    #[serde(default)]
    pub stat_requests: Vec<StatRequest>,
}

/// Where the snapshot lives on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SerializationSettings {
    pub file: PathBuf,
}

/// One entry of `base_requests`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop(StopRequest),
    Bus(BusRequest),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Road metres from this stop to each named neighbour.
    #[serde(default)]
    pub road_distances: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusRequest {
    pub name: String,
    pub stops: Vec<String>,
    pub is_roundtrip: bool,
}

/// One entry of `stat_requests`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum StatRequest {
    Stop { id: i64, name: String },
    Bus { id: i64, name: String },
    Route { id: i64, from: String, to: String },
    Map { id: i64 },
}

impl StatRequest {
    pub fn id(&self) -> i64 {
        match *self {
            StatRequest::Stop { id, .. }
            | StatRequest::Bus { id, .. }
            | StatRequest::Route { id, .. }
            | StatRequest::Map { id } => id,
        }
    }
}

/// One entry of the response array, in `stat_requests` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatResponse {
    Stop(StopResponse),
    Bus(BusResponse),
    Route(RouteResponse),
    Map(MapResponse),
    NotFound(NotFoundResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopResponse {
    pub buses: Vec<String>,
    pub request_id: i64,
}

impl StopResponse {
    pub fn from_names(id: i64, buses: &BTreeSet<&str>) -> Self {
        Self {
            buses: buses.iter().map(|name| (*name).to_owned()).collect(),
            request_id: id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusResponse {
    pub curvature: f64,
    pub request_id: i64,
    pub route_length: u64,
    pub stop_count: usize,
    pub unique_stop_count: usize,
}

impl BusResponse {
    pub fn from_statistics(id: i64, statistics: &BusStatistics) -> Self {
        Self {
            curvature: statistics.curvature,
            request_id: id,
            route_length: statistics.route_length,
            stop_count: statistics.stop_count,
            unique_stop_count: statistics.unique_stop_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResponse {
    pub items: Vec<RouteItem>,
    pub request_id: i64,
    pub total_time: f64,
}

impl RouteResponse {
    /// Spells a plan out as wait/ride steps. The plan must come from a
    /// router over this same graph.
    pub fn from_plan(id: i64, plan: &RoutePlan, graph: &Graph) -> Self {
        let items = plan
            .edges
            .iter()
            .map(|&edge_id| {
                let edge = &graph.edges()[edge_id];
                if edge.is_wait() {
                    RouteItem::Wait {
                        stop_name: edge.label.clone(),
                        time: edge.weight,
                    }
                } else {
                    RouteItem::Bus {
                        bus: edge.label.clone(),
                        span_count: edge.span,
                        time: edge.weight,
                    }
                }
            })
            .collect();
        Self {
            items,
            request_id: id,
            total_time: plan.total_time,
        }
    }
}

/// One leg of a spelled-out route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RouteItem {
    Wait {
        stop_name: String,
        time: f64,
    },
    Bus {
        bus: String,
        span_count: usize,
        time: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapResponse {
    pub map: String,
    pub request_id: i64,
}

/// The shared "not found" shape for any unanswerable request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotFoundResponse {
    pub error_message: String,
    pub request_id: i64,
}

impl NotFoundResponse {
    pub fn new(id: i64) -> Self {
        Self {
            error_message: "not found".to_owned(),
            request_id: id,
        }
    }
}
