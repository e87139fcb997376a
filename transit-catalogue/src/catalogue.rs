//! Entity catalogue: the owner of all stop and bus records.
//!
//! Stops and buses live in insertion-order arenas; every other part of
//! the system refers to them through `StopId`/`BusId` arena indices.
//! Name indexes are ordered maps, so the sorted views used for graph
//! numbering and rendering are reproducible across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Stable handle to a stop in the catalogue arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StopId(pub usize);

/// Stable handle to a bus in the catalogue arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BusId(pub usize);

/// A named geographic point in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub coordinates: Coordinates,
}

/// A named route over catalogue stops.
///
/// The route is stored exactly as supplied. A roundtrip bus traverses
/// it once; any other bus traverses it forward and then retraces it in
/// reverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub name: String,
    /// Stops in traversal order.
    pub route: Vec<StopId>,
    pub is_roundtrip: bool,
}

/// Catalogue mutation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    /// A stop with this name already exists
    #[error("stop {0:?} is already in the catalogue")]
    DuplicateStop(String),

    /// A bus with this name already exists
    #[error("bus {0:?} is already in the catalogue")]
    DuplicateBus(String),

    /// A route or distance entry names a stop that was never added
    #[error("unknown stop {0:?}")]
    UnknownStop(String),
}

/// The frozen network: populated once during the build phase, read-only
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    stops: Vec<Stop>,
    buses: Vec<Bus>,
    stop_names: BTreeMap<String, StopId>,
    bus_names: BTreeMap<String, BusId>,
    /// Which buses serve each stop; maintained on `add_bus`.
    stop_buses: BTreeMap<StopId, BTreeSet<BusId>>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stop. Later lookups by this name resolve to it.
    ///
    /// # Errors
    ///
    /// Fails if a stop with the same name already exists; the catalogue
    /// is unchanged in that case.
    pub fn add_stop(
        &mut self,
        name: &str,
        coordinates: Coordinates,
    ) -> Result<StopId, CatalogueError> {
        if self.stop_names.contains_key(name) {
            return Err(CatalogueError::DuplicateStop(name.to_owned()));
        }

        let id = StopId(self.stops.len());
        self.stops.push(Stop {
            name: name.to_owned(),
            coordinates,
        });
        self.stop_names.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Adds a bus, resolving each stop name to an existing record.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownStop` if any name on the route has not been
    /// added, and with `DuplicateBus` on name reuse. The catalogue is
    /// unchanged on failure.
    pub fn add_bus<S: AsRef<str>>(
        &mut self,
        name: &str,
        stops: &[S],
        is_roundtrip: bool,
    ) -> Result<BusId, CatalogueError> {
        if self.bus_names.contains_key(name) {
            return Err(CatalogueError::DuplicateBus(name.to_owned()));
        }

        let mut route = Vec::with_capacity(stops.len());
        for stop in stops {
            let stop = stop.as_ref();
            match self.stop_names.get(stop) {
                Some(id) => route.push(*id),
                None => return Err(CatalogueError::UnknownStop(stop.to_owned())),
            }
        }

        let id = BusId(self.buses.len());
        for stop_id in &route {
            self.stop_buses.entry(*stop_id).or_default().insert(id);
        }
        self.buses.push(Bus {
            name: name.to_owned(),
            route,
            is_roundtrip,
        });
        self.bus_names.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Exact-name stop lookup. A miss is a normal outcome.
    pub fn stop(&self, name: &str) -> Option<(StopId, &Stop)> {
        let id = *self.stop_names.get(name)?;
        Some((id, &self.stops[id.0]))
    }

    /// Exact-name bus lookup. A miss is a normal outcome.
    pub fn bus(&self, name: &str) -> Option<(BusId, &Bus)> {
        let id = *self.bus_names.get(name)?;
        Some((id, &self.buses[id.0]))
    }

    /// Stop record for an id minted by this catalogue.
    pub fn stop_by_id(&self, id: StopId) -> &Stop {
        &self.stops[id.0]
    }

    /// Bus record for an id minted by this catalogue.
    pub fn bus_by_id(&self, id: BusId) -> &Bus {
        &self.buses[id.0]
    }

    /// Names of the buses whose route serves the given stop, in name
    /// order.
    ///
    /// `None` means the stop itself is unknown; a stop with no service
    /// yields `Some` of an empty set. The two cases are deliberately
    /// distinct.
    pub fn buses_at_stop(&self, name: &str) -> Option<BTreeSet<&str>> {
        let (id, _) = self.stop(name)?;
        let served = match self.stop_buses.get(&id) {
            Some(ids) => ids
                .iter()
                .map(|bus_id| self.buses[bus_id.0].name.as_str())
                .collect(),
            None => BTreeSet::new(),
        };
        Some(served)
    }

    /// Stops in name-ascending order.
    pub fn sorted_stops(&self) -> impl Iterator<Item = (StopId, &Stop)> {
        self.stop_names.values().map(|id| (*id, &self.stops[id.0]))
    }

    /// Buses in name-ascending order.
    pub fn sorted_buses(&self) -> impl Iterator<Item = (BusId, &Bus)> {
        self.bus_names.values().map(|id| (*id, &self.buses[id.0]))
    }

    /// All stops in arena (insertion) order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// All buses in arena (insertion) order.
    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }
}
