//! Routing parameters shared by graph construction and queries.

use serde::{Deserialize, Serialize};

/// Settings that define the time model of the route graph.
///
/// Both values are baked into edge weights at build time, so changing
/// them requires rebuilding the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Minutes a passenger waits at a stop before boarding any bus.
    pub bus_wait_time: f64,

    /// Bus velocity in km/h.
    pub bus_velocity: f64,
}

impl RoutingSettings {
    pub fn new(bus_wait_time: f64, bus_velocity: f64) -> Self {
        Self {
            bus_wait_time,
            bus_velocity,
        }
    }

    /// Velocity in metres per minute, the unit edge weights are
    /// computed in.
    pub fn velocity_metres_per_minute(&self) -> f64 {
        self.bus_velocity * 1000.0 / 60.0
    }

    /// Minutes needed to ride `metres` at the configured velocity.
    pub fn ride_minutes(&self, metres: f64) -> f64 {
        metres / self.velocity_metres_per_minute()
    }
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            bus_wait_time: 6.0,
            bus_velocity: 40.0,
        }
    }
}
