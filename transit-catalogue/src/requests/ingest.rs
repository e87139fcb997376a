//! Builds the catalogue and distance table from a base document.

use tracing::debug;

use crate::catalogue::{Catalogue, CatalogueError, StopId};
use crate::distances::DistanceTable;
use crate::geo::Coordinates;

use super::dto::BaseRequest;

/// Loads every base request, in three passes so declaration order in
/// the document never matters: stops first, then road distances, then
/// buses.
///
/// # Errors
///
/// Fails on a duplicate stop or bus name, or when a road distance or
/// route references a stop the document never declares.
pub fn ingest(requests: &[BaseRequest]) -> Result<(Catalogue, DistanceTable), CatalogueError> {
    let mut catalogue = Catalogue::new();
    for request in requests {
        if let BaseRequest::Stop(stop) = request {
            catalogue.add_stop(&stop.name, Coordinates::new(stop.latitude, stop.longitude))?;
        }
    }

    let mut entries: Vec<(StopId, StopId, u32)> = Vec::new();
    for request in requests {
        if let BaseRequest::Stop(stop) = request {
            // The stop itself was added in the first pass.
            let (from, _) = catalogue
                .stop(&stop.name)
                .ok_or_else(|| CatalogueError::UnknownStop(stop.name.clone()))?;
            for (neighbour, &metres) in &stop.road_distances {
                let (to, _) = catalogue
                    .stop(neighbour)
                    .ok_or_else(|| CatalogueError::UnknownStop(neighbour.clone()))?;
                entries.push((from, to, metres));
            }
        }
    }
    let mut distances = DistanceTable::new();
    distances.set_distances(entries);

    for request in requests {
        if let BaseRequest::Bus(bus) = request {
            catalogue.add_bus(&bus.name, &bus.stops, bus.is_roundtrip)?;
        }
    }

    debug!(
        stops = catalogue.stop_count(),
        buses = catalogue.bus_count(),
        distances = distances.len(),
        "base document ingested"
    );
    Ok((catalogue, distances))
}
