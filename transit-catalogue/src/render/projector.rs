//! Fits geographic coordinates into the map's pixel viewport.

use crate::geo::Coordinates;
use crate::render::svg::Point;

/// Spans smaller than this collapse to a single pixel column or row.
const COORD_EPSILON: f64 = 1e-6;

/// A linear latitude/longitude to pixel mapping.
///
/// The scale is chosen once, from the bounding box of every point the
/// map will show, so that everything fits inside the viewport minus
/// its padding. Latitude grows northwards but pixel `y` grows
/// downwards, so the vertical axis is flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereProjector {
    padding: f64,
    min_lng: f64,
    max_lat: f64,
    zoom: f64,
}

impl SphereProjector {
    pub fn new(points: &[Coordinates], width: f64, height: f64, padding: f64) -> Self {
        let mut projector = Self {
            padding,
            min_lng: 0.0,
            max_lat: 0.0,
            zoom: 0.0,
        };
        let Some(first) = points.first() else {
            return projector;
        };

        let mut min_lng = first.longitude;
        let mut max_lng = first.longitude;
        let mut min_lat = first.latitude;
        let mut max_lat = first.latitude;
        for point in &points[1..] {
            min_lng = min_lng.min(point.longitude);
            max_lng = max_lng.max(point.longitude);
            min_lat = min_lat.min(point.latitude);
            max_lat = max_lat.max(point.latitude);
        }
        projector.min_lng = min_lng;
        projector.max_lat = max_lat;

        let lng_span = max_lng - min_lng;
        let lat_span = max_lat - min_lat;
        let width_zoom =
            (lng_span.abs() > COORD_EPSILON).then(|| (width - 2.0 * padding) / lng_span);
        let height_zoom =
            (lat_span.abs() > COORD_EPSILON).then(|| (height - 2.0 * padding) / lat_span);
        projector.zoom = match (width_zoom, height_zoom) {
            (Some(by_width), Some(by_height)) => by_width.min(by_height),
            (Some(by_width), None) => by_width,
            (None, Some(by_height)) => by_height,
            (None, None) => 0.0,
        };
        projector
    }

    pub fn project(&self, point: Coordinates) -> Point {
        Point {
            x: (point.longitude - self.min_lng) * self.zoom + self.padding,
            y: (self.max_lat - point.latitude) * self.zoom + self.padding,
        }
    }
}
