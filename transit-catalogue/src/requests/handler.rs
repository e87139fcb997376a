//! Answers stat requests against a fully built model.

use crate::catalogue::Catalogue;
use crate::distances::{DistanceTable, MissingDistance};
use crate::render::{MapRenderer, RenderSettings};
use crate::routing::{Router, UnknownStop};
use crate::stats::StatisticsCalculator;

use super::dto::{
    BusResponse, MapResponse, NotFoundResponse, RouteResponse, StatRequest, StatResponse,
    StopResponse,
};

/// Borrows the model's pieces and turns each request into a response.
///
/// A request naming an unknown entity, or a route with no connection,
/// yields the "not found" response rather than an error; the response
/// array always lines up with the request array.
pub struct RequestHandler<'a> {
    catalogue: &'a Catalogue,
    distances: &'a DistanceTable,
    render_settings: &'a RenderSettings,
    router: &'a Router,
}

impl<'a> RequestHandler<'a> {
    pub fn new(
        catalogue: &'a Catalogue,
        distances: &'a DistanceTable,
        render_settings: &'a RenderSettings,
        router: &'a Router,
    ) -> Self {
        Self {
            catalogue,
            distances,
            render_settings,
            router,
        }
    }

    /// # Errors
    ///
    /// Fails only if a bus statistics request hits a stop pair with no
    /// recorded road distance.
    pub fn handle_all(
        &self,
        requests: &[StatRequest],
    ) -> Result<Vec<StatResponse>, MissingDistance> {
        requests.iter().map(|request| self.handle(request)).collect()
    }

    fn handle(&self, request: &StatRequest) -> Result<StatResponse, MissingDistance> {
        Ok(match request {
            StatRequest::Stop { id, name } => match self.catalogue.buses_at_stop(name) {
                Some(buses) => StatResponse::Stop(StopResponse::from_names(*id, &buses)),
                None => StatResponse::NotFound(NotFoundResponse::new(*id)),
            },
            StatRequest::Bus { id, name } => {
                let calculator = StatisticsCalculator::new(self.catalogue, self.distances);
                match calculator.bus_statistics(name)? {
                    Some(statistics) => {
                        StatResponse::Bus(BusResponse::from_statistics(*id, &statistics))
                    }
                    None => StatResponse::NotFound(NotFoundResponse::new(*id)),
                }
            }
            StatRequest::Route { id, from, to } => match self.router.find_route(from, to) {
                Ok(Some(plan)) => {
                    StatResponse::Route(RouteResponse::from_plan(*id, &plan, self.router.graph()))
                }
                Ok(None) | Err(UnknownStop { .. }) => {
                    StatResponse::NotFound(NotFoundResponse::new(*id))
                }
            },
            StatRequest::Map { id } => StatResponse::Map(MapResponse {
                map: MapRenderer::new(self.render_settings).render(self.catalogue),
                request_id: *id,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::routing::{RoutingSettings, build_graph};
    use serde_json::json;

    /// Equator stops A, B, C spaced 1000 road metres apart, a
    /// roundtrip bus "1" over all three and a retracing "shuttle" over
    /// the first two. Wait time 5 minutes, 60 km/h.
    fn network() -> (Catalogue, DistanceTable, RenderSettings, Router) {
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

        let settings = RoutingSettings::new(5.0, 60.0);
        let transit = build_graph(&catalogue, &distances, &settings).unwrap();
        (
            catalogue,
            distances,
            RenderSettings::default(),
            Router::new(transit),
        )
    }

    fn respond(requests: serde_json::Value) -> Vec<serde_json::Value> {
        let (catalogue, distances, render_settings, router) = network();
        let handler = RequestHandler::new(&catalogue, &distances, &render_settings, &router);
        let requests: Vec<StatRequest> = serde_json::from_value(requests).unwrap();
        let responses = handler.handle_all(&requests).unwrap();
        responses
            .iter()
            .map(|response| serde_json::to_value(response).unwrap())
            .collect()
    }

    #[test]
    fn stop_requests_list_serving_buses_or_not_found() {
        let responses = respond(json!([
            { "id": 1, "type": "Stop", "name": "A" },
            { "id": 2, "type": "Stop", "name": "C" },
            { "id": 3, "type": "Stop", "name": "Nowhere" }
        ]));

        assert_eq!(
            responses[0],
            json!({ "buses": ["1", "shuttle"], "request_id": 1 })
        );
        assert_eq!(responses[1], json!({ "buses": ["1"], "request_id": 2 }));
        assert_eq!(
            responses[2],
            json!({ "error_message": "not found", "request_id": 3 })
        );
    }

    #[test]
    fn bus_requests_report_statistics_or_not_found() {
        let responses = respond(json!([
            { "id": 10, "type": "Bus", "name": "1" },
            { "id": 11, "type": "Bus", "name": "ghost" }
        ]));

        assert_eq!(responses[0]["request_id"], 10);
        assert_eq!(responses[0]["stop_count"], 3);
        assert_eq!(responses[0]["unique_stop_count"], 3);
        assert_eq!(responses[0]["route_length"], 2000);
        // Road metres are far shorter than the geographic degrees.
        let curvature = responses[0]["curvature"].as_f64().unwrap();
        assert!(curvature > 0.0 && curvature < 1.0);

        assert_eq!(
            responses[1],
            json!({ "error_message": "not found", "request_id": 11 })
        );
    }

    #[test]
    fn route_request_spells_out_the_fastest_plan() {
        let responses = respond(json!([
            { "id": 20, "type": "Route", "from": "A", "to": "C" }
        ]));

        assert_eq!(
            responses[0],
            json!({
                "items": [
                    { "type": "Wait", "stop_name": "A", "time": 5.0 },
                    { "type": "Bus", "bus": "1", "span_count": 2, "time": 2.0 }
                ],
                "request_id": 20,
                "total_time": 7.0
            })
        );
    }

    #[test]
    fn unreachable_and_unknown_routes_are_not_found() {
        let responses = respond(json!([
            { "id": 30, "type": "Route", "from": "C", "to": "A" },
            { "id": 31, "type": "Route", "from": "A", "to": "Nowhere" }
        ]));

        let not_found = |id: i64| json!({ "error_message": "not found", "request_id": id });
        assert_eq!(responses[0], not_found(30));
        assert_eq!(responses[1], not_found(31));
    }

    #[test]
    fn map_request_embeds_the_rendered_document() {
        let responses = respond(json!([{ "id": 40, "type": "Map" }]));

        assert_eq!(responses[0]["request_id"], 40);
        let map = responses[0]["map"].as_str().unwrap();
        assert!(map.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>"));
        assert!(map.ends_with("</svg>"));
        assert!(map.contains(">shuttle</text>"));
    }

    #[test]
    fn responses_follow_request_order() {
        let responses = respond(json!([
            { "id": 3, "type": "Map" },
            { "id": 2, "type": "Stop", "name": "A" },
            { "id": 1, "type": "Bus", "name": "1" }
        ]));

        let ids: Vec<i64> = responses
            .iter()
            .map(|response| response["request_id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, [3, 2, 1]);
    }
}
