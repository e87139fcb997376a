//! Transit network catalogue and route planner.
//!
//! A two-phase tool: the build phase ingests a JSON description of
//! stops, buses and road distances, builds the routing graph and
//! writes a binary snapshot; the query phase loads the snapshot and
//! answers statistics, shortest-route and map requests.

pub mod catalogue;
pub mod distances;
pub mod geo;
pub mod render;
pub mod requests;
pub mod routing;
pub mod snapshot;
pub mod stats;
