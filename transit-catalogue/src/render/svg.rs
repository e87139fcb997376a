//! A small SVG document writer covering the shapes the map needs.
//!
//! Shapes are plain structs rendered through [`std::fmt::Display`];
//! the document collects them and prints one per line inside the
//! `<svg>` envelope.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A stroke or fill colour as it appears in the output attribute.
///
/// The settings document writes colours untagged: a CSS name, an
/// `[r, g, b]` triple or an `[r, g, b, opacity]` quadruple. Untagged
/// reads need a self-describing input, so the serde impls keep that
/// shape for human-readable formats and use a tagged twin for binary
/// ones.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    Name(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl Color {
    /// The explicit "no paint" colour.
    pub fn none() -> Self {
        Color::Name("none".to_owned())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::none()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Name(name) => f.write_str(name),
            Color::Rgb(r, g, b) => write!(f, "rgb({r},{g},{b})"),
            Color::Rgba(r, g, b, opacity) => write!(f, "rgba({r},{g},{b},{opacity})"),
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            match self {
                Color::Name(name) => serializer.serialize_str(name),
                Color::Rgb(r, g, b) => (r, g, b).serialize(serializer),
                Color::Rgba(r, g, b, opacity) => (r, g, b, opacity).serialize(serializer),
            }
        } else {
            TaggedColor::from(self).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(ColorVisitor)
        } else {
            TaggedColor::deserialize(deserializer).map(Color::from)
        }
    }
}

struct ColorVisitor;

impl<'de> Visitor<'de> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a colour name or an rgb/rgba component array")
    }

    fn visit_str<E>(self, value: &str) -> Result<Color, E>
    where
        E: de::Error,
    {
        Ok(Color::Name(value.to_owned()))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Color, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let red = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let green = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let blue = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;
        match seq.next_element()? {
            Some(opacity) => Ok(Color::Rgba(red, green, blue, opacity)),
            None => Ok(Color::Rgb(red, green, blue)),
        }
    }
}

/// Tagged twin of [`Color`] for formats that are not self-describing.
#[derive(Serialize, Deserialize)]
enum TaggedColor {
    Name(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl From<&Color> for TaggedColor {
    fn from(color: &Color) -> Self {
        match color {
            Color::Name(name) => TaggedColor::Name(name.clone()),
            Color::Rgb(r, g, b) => TaggedColor::Rgb(*r, *g, *b),
            Color::Rgba(r, g, b, opacity) => TaggedColor::Rgba(*r, *g, *b, *opacity),
        }
    }
}

impl From<TaggedColor> for Color {
    fn from(color: TaggedColor) -> Self {
        match color {
            TaggedColor::Name(name) => Color::Name(name),
            TaggedColor::Rgb(r, g, b) => Color::Rgb(r, g, b),
            TaggedColor::Rgba(r, g, b, opacity) => Color::Rgba(r, g, b, opacity),
        }
    }
}

/// A point in the document's pixel coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeLineCap {
    Butt,
    Round,
    Square,
}

impl fmt::Display for StrokeLineCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineCap::Butt => "butt",
            StrokeLineCap::Round => "round",
            StrokeLineCap::Square => "square",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeLineJoin {
    Arcs,
    Bevel,
    Miter,
    MiterClip,
    Round,
}

impl fmt::Display for StrokeLineJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineJoin::Arcs => "arcs",
            StrokeLineJoin::Bevel => "bevel",
            StrokeLineJoin::Miter => "miter",
            StrokeLineJoin::MiterClip => "miter-clip",
            StrokeLineJoin::Round => "round",
        })
    }
}

/// Paint attributes shared by every shape; unset fields are omitted
/// from the output entirely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathProps {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f64>,
    pub stroke_linecap: Option<StrokeLineCap>,
    pub stroke_linejoin: Option<StrokeLineJoin>,
}

impl fmt::Display for PathProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fill) = &self.fill {
            write!(f, " fill=\"{fill}\"")?;
        }
        if let Some(stroke) = &self.stroke {
            write!(f, " stroke=\"{stroke}\"")?;
        }
        if let Some(width) = self.stroke_width {
            write!(f, " stroke-width=\"{width}\"")?;
        }
        if let Some(linecap) = self.stroke_linecap {
            write!(f, " stroke-linecap=\"{linecap}\"")?;
        }
        if let Some(linejoin) = self.stroke_linejoin {
            write!(f, " stroke-linejoin=\"{linejoin}\"")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    pub props: PathProps,
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{}/>",
            self.center.x, self.center.y, self.radius, self.props
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub props: PathProps,
}

impl fmt::Display for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<polyline points=\"")?;
        for (index, point) in self.points.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{},{}", point.x, point.y)?;
        }
        write!(f, "\"{}/>", self.props)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub position: Point,
    /// Offset relative to `position`, rendered as `dx`/`dy`.
    pub offset: Point,
    pub font_size: u32,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub data: String,
    pub props: PathProps,
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<text{} x=\"{}\" y=\"{}\" dx=\"{}\" dy=\"{}\" font-size=\"{}\"",
            self.props, self.position.x, self.position.y, self.offset.x, self.offset.y,
            self.font_size
        )?;
        if let Some(family) = &self.font_family {
            write!(f, " font-family=\"{family}\"")?;
        }
        if let Some(weight) = &self.font_weight {
            write!(f, " font-weight=\"{weight}\"")?;
        }
        write!(f, ">{}</text>", Escaped(&self.data))
    }
}

/// Text content with the five XML special characters escaped.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                other => fmt::Write::write_char(f, other)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polyline(Polyline),
    Text(Text),
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Polyline> for Shape {
    fn from(polyline: Polyline) -> Self {
        Shape::Polyline(polyline)
    }
}

impl From<Text> for Shape {
    fn from(text: Text) -> Self {
        Shape::Text(text)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circle(circle) => circle.fmt(f),
            Shape::Polyline(polyline) => polyline.fmt(f),
            Shape::Text(text) => text.fmt(f),
        }
    }
}

/// An ordered collection of shapes; later pushes paint over earlier
/// ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    shapes: Vec<Shape>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: impl Into<Shape>) {
        self.shapes.push(shape.into());
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n")?;
        f.write_str("<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n")?;
        for shape in &self.shapes {
            writeln!(f, "  {shape}")?;
        }
        f.write_str("</svg>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_forms_render_as_css() {
        assert_eq!(Color::none().to_string(), "none");
        assert_eq!(Color::Name("red".to_owned()).to_string(), "red");
        assert_eq!(Color::Rgb(255, 160, 0).to_string(), "rgb(255,160,0)");
        assert_eq!(
            Color::Rgba(255, 255, 255, 0.85).to_string(),
            "rgba(255,255,255,0.85)"
        );
    }

    #[test]
    fn color_deserializes_from_all_three_forms() {
        let name: Color = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(name, Color::Name("green".to_owned()));

        let rgb: Color = serde_json::from_str("[255, 160, 0]").unwrap();
        assert_eq!(rgb, Color::Rgb(255, 160, 0));

        let rgba: Color = serde_json::from_str("[255, 255, 255, 0.85]").unwrap();
        assert_eq!(rgba, Color::Rgba(255, 255, 255, 0.85));
    }

    #[test]
    fn colors_survive_a_binary_round_trip() {
        let palette = vec![
            Color::Name("green".to_owned()),
            Color::Rgb(255, 160, 0),
            Color::Rgba(255, 255, 255, 0.85),
        ];

        let bytes =
            bincode::serde::encode_to_vec(&palette, bincode::config::standard()).unwrap();
        let (decoded, read): (Vec<Color>, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();

        assert_eq!(read, bytes.len());
        assert_eq!(decoded, palette);
    }

    #[test]
    fn bare_circle_omits_paint_attributes() {
        let circle = Circle {
            center: Point { x: 20.0, y: 21.5 },
            radius: 10.0,
            props: PathProps::default(),
        };
        assert_eq!(circle.to_string(), "<circle cx=\"20\" cy=\"21.5\" r=\"10\"/>");
    }

    #[test]
    fn paint_attributes_keep_a_fixed_order() {
        let polyline = Polyline {
            points: vec![Point { x: 50.0, y: 150.0 }, Point { x: 150.0, y: 50.0 }],
            props: PathProps {
                fill: Some(Color::none()),
                stroke: Some(Color::Rgb(255, 160, 0)),
                stroke_width: Some(14.0),
                stroke_linecap: Some(StrokeLineCap::Round),
                stroke_linejoin: Some(StrokeLineJoin::Round),
            },
        };
        assert_eq!(
            polyline.to_string(),
            "<polyline points=\"50,150 150,50\" fill=\"none\" stroke=\"rgb(255,160,0)\" \
             stroke-width=\"14\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>"
        );
    }

    #[test]
    fn text_escapes_markup_and_places_fonts_last() {
        let text = Text {
            position: Point { x: 50.0, y: 150.0 },
            offset: Point { x: 7.0, y: 15.0 },
            font_size: 20,
            font_family: Some("Verdana".to_owned()),
            font_weight: Some("bold".to_owned()),
            data: "Fish & <Chips>".to_owned(),
            props: PathProps {
                fill: Some(Color::Rgba(255, 255, 255, 0.85)),
                ..PathProps::default()
            },
        };
        assert_eq!(
            text.to_string(),
            "<text fill=\"rgba(255,255,255,0.85)\" x=\"50\" y=\"150\" dx=\"7\" dy=\"15\" \
             font-size=\"20\" font-family=\"Verdana\" font-weight=\"bold\">\
             Fish &amp; &lt;Chips&gt;</text>"
        );
    }

    #[test]
    fn document_frames_shapes_one_per_line() {
        let mut document = Document::new();
        document.push(Circle {
            center: Point { x: 1.0, y: 2.0 },
            radius: 3.0,
            props: PathProps::default(),
        });
        document.push(Text {
            data: "hi".to_owned(),
            ..Text::default()
        });

        assert_eq!(
            document.to_string(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n  \
             <circle cx=\"1\" cy=\"2\" r=\"3\"/>\n  \
             <text x=\"0\" y=\"0\" dx=\"0\" dy=\"0\" font-size=\"0\">hi</text>\n\
             </svg>"
        );
    }

    #[test]
    fn empty_document_is_just_the_envelope() {
        assert_eq!(
            Document::new().to_string(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n\
             </svg>"
        );
    }
}
