//! Draws the network as an SVG map.
//!
//! Four layers, painted in order so later ones sit on top: route
//! polylines, route name labels, stop circles, stop name labels. Only
//! stops served by at least one bus appear; buses take colours from
//! the palette in name order, skipping buses with no route.

mod projector;
mod svg;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::geo::Coordinates;

pub use projector::SphereProjector;
pub use svg::{
    Circle, Color, Document, PathProps, Point, Polyline, Shape, StrokeLineCap, StrokeLineJoin,
    Text,
};

/// Visual parameters of the map, as supplied by the input document.
///
/// Offsets are `[dx, dy]` pairs in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: u32,
    pub bus_label_offset: [f64; 2],
    pub stop_label_font_size: u32,
    pub stop_label_offset: [f64; 2],
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            padding: 50.0,
            line_width: 14.0,
            stop_radius: 5.0,
            bus_label_font_size: 20,
            bus_label_offset: [7.0, 15.0],
            stop_label_font_size: 20,
            stop_label_offset: [7.0, -3.0],
            underlayer_color: Color::Rgba(255, 255, 255, 0.85),
            underlayer_width: 3.0,
            color_palette: vec![
                Color::Name("green".to_owned()),
                Color::Rgb(255, 160, 0),
                Color::Name("red".to_owned()),
            ],
        }
    }
}

/// Renders a catalogue into an SVG string.
pub struct MapRenderer<'a> {
    settings: &'a RenderSettings,
}

impl<'a> MapRenderer<'a> {
    pub fn new(settings: &'a RenderSettings) -> Self {
        Self { settings }
    }

    pub fn render(&self, catalogue: &Catalogue) -> String {
        let served = served_stops(catalogue);
        let points: Vec<Coordinates> = served.values().copied().collect();
        let projector = SphereProjector::new(
            &points,
            self.settings.width,
            self.settings.height,
            self.settings.padding,
        );

        let mut document = Document::new();
        self.draw_route_lines(&mut document, catalogue, &projector);
        self.draw_route_labels(&mut document, catalogue, &projector);
        self.draw_stop_circles(&mut document, &served, &projector);
        self.draw_stop_labels(&mut document, &served, &projector);
        document.to_string()
    }

    fn draw_route_lines(
        &self,
        document: &mut Document,
        catalogue: &Catalogue,
        projector: &SphereProjector,
    ) {
        let routed = catalogue
            .sorted_buses()
            .filter(|(_, bus)| !bus.route.is_empty());
        for (index, (_, bus)) in routed.enumerate() {
            let mut points: Vec<Point> = bus
                .route
                .iter()
                .map(|&stop_id| projector.project(catalogue.stop_by_id(stop_id).coordinates))
                .collect();
            if !bus.is_roundtrip {
                // Retrace back towards the first stop.
                let back: Vec<Point> = points[..points.len() - 1].iter().rev().copied().collect();
                points.extend(back);
            }
            document.push(Polyline {
                points,
                props: PathProps {
                    fill: Some(Color::none()),
                    stroke: Some(self.palette_color(index)),
                    stroke_width: Some(self.settings.line_width),
                    stroke_linecap: Some(StrokeLineCap::Round),
                    stroke_linejoin: Some(StrokeLineJoin::Round),
                },
            });
        }
    }

    fn draw_route_labels(
        &self,
        document: &mut Document,
        catalogue: &Catalogue,
        projector: &SphereProjector,
    ) {
        let routed = catalogue
            .sorted_buses()
            .filter(|(_, bus)| !bus.route.is_empty());
        for (index, (_, bus)) in routed.enumerate() {
            let color = self.palette_color(index);
            let first = bus.route[0];
            let project =
                |stop_id| projector.project(catalogue.stop_by_id(stop_id).coordinates);

            self.push_bus_label(document, project(first), &bus.name, color.clone());
            if !bus.is_roundtrip {
                let last = bus.route[bus.route.len() - 1];
                if last != first {
                    self.push_bus_label(document, project(last), &bus.name, color);
                }
            }
        }
    }

    fn draw_stop_circles(
        &self,
        document: &mut Document,
        served: &BTreeMap<&str, Coordinates>,
        projector: &SphereProjector,
    ) {
        for &coordinates in served.values() {
            document.push(Circle {
                center: projector.project(coordinates),
                radius: self.settings.stop_radius,
                props: PathProps {
                    fill: Some(Color::Name("white".to_owned())),
                    ..PathProps::default()
                },
            });
        }
    }

    fn draw_stop_labels(
        &self,
        document: &mut Document,
        served: &BTreeMap<&str, Coordinates>,
        projector: &SphereProjector,
    ) {
        for (&name, &coordinates) in served {
            let template = Text {
                position: projector.project(coordinates),
                offset: Point {
                    x: self.settings.stop_label_offset[0],
                    y: self.settings.stop_label_offset[1],
                },
                font_size: self.settings.stop_label_font_size,
                font_family: Some("Verdana".to_owned()),
                font_weight: None,
                data: name.to_owned(),
                props: self.underlayer_props(),
            };
            document.push(template.clone());
            document.push(Text {
                props: PathProps {
                    fill: Some(Color::Name("black".to_owned())),
                    ..PathProps::default()
                },
                ..template
            });
        }
    }

    fn push_bus_label(&self, document: &mut Document, at: Point, name: &str, color: Color) {
        let template = Text {
            position: at,
            offset: Point {
                x: self.settings.bus_label_offset[0],
                y: self.settings.bus_label_offset[1],
            },
            font_size: self.settings.bus_label_font_size,
            font_family: Some("Verdana".to_owned()),
            font_weight: Some("bold".to_owned()),
            data: name.to_owned(),
            props: self.underlayer_props(),
        };
        document.push(template.clone());
        document.push(Text {
            props: PathProps {
                fill: Some(color),
                ..PathProps::default()
            },
            ..template
        });
    }

    fn underlayer_props(&self) -> PathProps {
        PathProps {
            fill: Some(self.settings.underlayer_color.clone()),
            stroke: Some(self.settings.underlayer_color.clone()),
            stroke_width: Some(self.settings.underlayer_width),
            stroke_linecap: Some(StrokeLineCap::Round),
            stroke_linejoin: Some(StrokeLineJoin::Round),
        }
    }

    fn palette_color(&self, index: usize) -> Color {
        match self.settings.color_palette.as_slice() {
            [] => Color::none(),
            palette => palette[index % palette.len()].clone(),
        }
    }
}

/// Every stop on some bus route, keyed by name so iteration follows
/// label order.
fn served_stops(catalogue: &Catalogue) -> BTreeMap<&str, Coordinates> {
    let mut served = BTreeMap::new();
    for (_, bus) in catalogue.sorted_buses() {
        for &stop_id in &bus.route {
            let stop = catalogue.stop_by_id(stop_id);
            served.insert(stop.name.as_str(), stop.coordinates);
        }
    }
    served
}
