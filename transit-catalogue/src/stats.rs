//! Per-bus statistics derived from the catalogue and distance table.

use std::collections::HashSet;

use crate::catalogue::{Bus, Catalogue};
use crate::distances::{DistanceTable, MissingDistance};
use crate::geo;

/// Below this great-circle length (metres) a route is treated as
/// geographically degenerate and its curvature reported as 1.0.
const DEGENERATE_GEO_M: f64 = 1e-6;

/// Derived metrics for one bus. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BusStatistics {
    /// Stops visited over a full traversal: the route length for a
    /// roundtrip bus, `2k - 1` for a bus that retraces its k stops.
    pub stop_count: usize,
    /// Distinct stops on the route.
    pub unique_stop_count: usize,
    /// Road distance of the full traversal, in metres.
    pub route_length: u64,
    /// Road distance divided by great-circle distance; 1.0 for routes
    /// whose geographic length degenerates to zero.
    pub curvature: f64,
}

/// Read-only statistics over a frozen catalogue and distance table.
pub struct StatisticsCalculator<'a> {
    catalogue: &'a Catalogue,
    distances: &'a DistanceTable,
}

impl<'a> StatisticsCalculator<'a> {
    pub fn new(catalogue: &'a Catalogue, distances: &'a DistanceTable) -> Self {
        Self {
            catalogue,
            distances,
        }
    }

    /// Metrics for the named bus, or `Ok(None)` if no such bus exists.
    ///
    /// # Errors
    ///
    /// A route segment with no recorded road distance fails the whole
    /// computation: that is missing network data, not a query miss.
    pub fn bus_statistics(&self, name: &str) -> Result<Option<BusStatistics>, MissingDistance> {
        match self.catalogue.bus(name) {
            Some((_, bus)) => Ok(Some(self.compute(bus)?)),
            None => Ok(None),
        }
    }

    fn compute(&self, bus: &Bus) -> Result<BusStatistics, MissingDistance> {
        let entries = bus.route.len();
        let unique: HashSet<_> = bus.route.iter().collect();

        let mut route_length: u64 = 0;
        let mut geographic = 0.0;
        for pair in bus.route.windows(2) {
            route_length += u64::from(self.distances.distance(pair[0], pair[1])?);
            geographic += geo::distance(
                self.catalogue.stop_by_id(pair[0]).coordinates,
                self.catalogue.stop_by_id(pair[1]).coordinates,
            );
        }

        // A non-roundtrip bus retraces the route; the return leg uses
        // the reverse-direction road distances.
        if !bus.is_roundtrip {
            for pair in bus.route.windows(2) {
                route_length += u64::from(self.distances.distance(pair[1], pair[0])?);
            }
            geographic *= 2.0;
        }

        let stop_count = match (bus.is_roundtrip, entries) {
            (true, n) => n,
            (false, 0) => 0,
            (false, n) => 2 * n - 1,
        };
        let curvature = if geographic < DEGENERATE_GEO_M {
            1.0
        } else {
            route_length as f64 / geographic
        };

        Ok(BusStatistics {
            stop_count,
            unique_stop_count: unique.len(),
            route_length,
            curvature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::StopId;
    use crate::geo::Coordinates;

    /// Three stops on the equator, one degree of longitude apart, with
    /// 1000m of road between neighbours in both directions.
    fn equator_network() -> (Catalogue, DistanceTable) {
        let mut catalogue = Catalogue::new();
        catalogue.add_stop("A", Coordinates::new(0.0, 0.0)).unwrap();
        catalogue.add_stop("B", Coordinates::new(0.0, 1.0)).unwrap();
        catalogue.add_stop("C", Coordinates::new(0.0, 2.0)).unwrap();

        let mut distances = DistanceTable::new();
        distances.set_distances([
            (StopId(0), StopId(1), 1000),
            (StopId(1), StopId(2), 1000),
        ]);
        (catalogue, distances)
    }

    #[test]
    fn roundtrip_bus() {
        let (mut catalogue, distances) = equator_network();
        catalogue.add_bus("1", &["A", "B", "C"], true).unwrap();

        let stats = StatisticsCalculator::new(&catalogue, &distances)
            .bus_statistics("1")
            .unwrap()
            .unwrap();

        assert_eq!(stats.stop_count, 3);
        assert_eq!(stats.unique_stop_count, 3);
        assert_eq!(stats.route_length, 2000);

        // Two degrees of equatorial arc dwarf the 2000m of road, so the
        // curvature is well below one here.
        let geographic =
            2.0 * geo::distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 1.0));
        assert!((stats.curvature - 2000.0 / geographic).abs() < 1e-12);
    }

    #[test]
    fn retracing_bus_doubles_and_uses_reverse_distances() {
        let mut catalogue = Catalogue::new();
        catalogue.add_stop("A", Coordinates::new(55.0, 37.00)).unwrap();
        catalogue.add_stop("B", Coordinates::new(55.0, 37.01)).unwrap();
        catalogue.add_stop("C", Coordinates::new(55.0, 37.02)).unwrap();

        let mut distances = DistanceTable::new();
        distances.set_distances([
            (StopId(0), StopId(1), 1000),
            (StopId(1), StopId(0), 1300),
            (StopId(1), StopId(2), 700),
        ]);
        catalogue.add_bus("99", &["A", "B", "C"], false).unwrap();

        let stats = StatisticsCalculator::new(&catalogue, &distances)
            .bus_statistics("99")
            .unwrap()
            .unwrap();

        assert_eq!(stats.stop_count, 5);
        assert_eq!(stats.unique_stop_count, 3);
        // Out: 1000 + 700. Back: 700 (mirrored) + 1300 (explicit).
        assert_eq!(stats.route_length, 3700);
    }

    #[test]
    fn repeated_stops_count_once_in_unique() {
        let (mut catalogue, distances) = equator_network();
        catalogue.add_bus("8", &["A", "B", "A", "B", "C"], true).unwrap();

        let stats = StatisticsCalculator::new(&catalogue, &distances)
            .bus_statistics("8")
            .unwrap()
            .unwrap();

        assert_eq!(stats.stop_count, 5);
        assert_eq!(stats.unique_stop_count, 3);
        assert_eq!(stats.route_length, 4000);
    }

    #[test]
    fn unknown_bus_is_none() {
        let (catalogue, distances) = equator_network();

        let stats = StatisticsCalculator::new(&catalogue, &distances)
            .bus_statistics("ghost")
            .unwrap();
        assert!(stats.is_none());
    }

    #[test]
    fn missing_distance_is_an_error() {
        let (mut catalogue, mut distances) = equator_network();
        catalogue.add_stop("D", Coordinates::new(0.0, 3.0)).unwrap();
        // No distance ever supplied for C <-> D.
        catalogue.add_bus("q", &["C", "D"], true).unwrap();

        let err = StatisticsCalculator::new(&catalogue, &distances)
            .bus_statistics("q")
            .unwrap_err();
        assert_eq!(
            err,
            MissingDistance {
                from: StopId(2),
                to: StopId(3)
            }
        );

        // Supplying the gap repairs the computation.
        distances.set_distances([(StopId(2), StopId(3), 400)]);
        let stats = StatisticsCalculator::new(&catalogue, &distances)
            .bus_statistics("q")
            .unwrap()
            .unwrap();
        assert_eq!(stats.route_length, 400);
    }

    #[test]
    fn colocated_stops_have_curvature_one() {
        let mut catalogue = Catalogue::new();
        let here = Coordinates::new(55.0, 37.0);
        catalogue.add_stop("East platform", here).unwrap();
        catalogue.add_stop("West platform", here).unwrap();

        let mut distances = DistanceTable::new();
        distances.set_distances([(StopId(0), StopId(1), 50)]);
        catalogue
            .add_bus("shuttle", &["East platform", "West platform"], true)
            .unwrap();

        let stats = StatisticsCalculator::new(&catalogue, &distances)
            .bus_statistics("shuttle")
            .unwrap()
            .unwrap();

        assert_eq!(stats.route_length, 50);
        assert_eq!(stats.curvature, 1.0);
    }

    #[test]
    fn single_stop_routes() {
        let (mut catalogue, distances) = equator_network();
        catalogue.add_bus("ring", &["A"], true).unwrap();
        catalogue.add_bus("line", &["A"], false).unwrap();

        let calc = StatisticsCalculator::new(&catalogue, &distances);

        let ring = calc.bus_statistics("ring").unwrap().unwrap();
        assert_eq!(ring.stop_count, 1);
        assert_eq!(ring.route_length, 0);
        assert_eq!(ring.curvature, 1.0);

        let line = calc.bus_statistics("line").unwrap().unwrap();
        assert_eq!(line.stop_count, 1);
    }
}
