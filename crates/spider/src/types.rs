use std::collections::BTreeMap;

use geo::BoundingRect;
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon, Rect};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpiderError};

/// One record of the vector dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Position of the feature in its source
    pub index: usize,
    pub geometry: FeatureGeometry,
    /// Attribute table, values already rendered as strings
    pub attributes: BTreeMap<String, String>,
}

impl Feature {
    pub fn new(index: usize, geometry: FeatureGeometry) -> Self {
        Self {
            index,
            geometry,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    /// Look up an attribute by field name
    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }
}

/// The geometry kinds a feature can carry.
///
/// Renderers match on this exhaustively, so a new kind has to be handled
/// everywhere it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl FeatureGeometry {
    /// Name of the geometry kind, as used in log lines and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Axis-aligned bounding box of the geometry.
    ///
    /// An empty polygon collapses to a zero-sized box at the origin.
    pub fn envelope(&self) -> Rect<f64> {
        let empty = || Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 });
        match self {
            Self::Point(point) => point.bounding_rect(),
            Self::Polygon(polygon) => polygon.bounding_rect().unwrap_or_else(empty),
            Self::MultiPolygon(multi) => multi.bounding_rect().unwrap_or_else(empty),
        }
    }

    /// Center of the envelope
    pub fn centroid(&self) -> Coord<f64> {
        self.envelope().center()
    }

    /// Check the ring invariants the renderer relies on
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Point(point) => {
                if !(point.x().is_finite() && point.y().is_finite()) {
                    return Err(SpiderError::MalformedGeometry(
                        "point has non-finite coordinates".to_string(),
                    ));
                }
            }
            Self::Polygon(polygon) => validate_polygon(polygon)?,
            Self::MultiPolygon(multi) => {
                if multi.0.is_empty() {
                    return Err(SpiderError::MalformedGeometry(
                        "multipolygon has no parts".to_string(),
                    ));
                }
                for part in &multi.0 {
                    validate_polygon(part)?;
                }
            }
        }

        if !matches!(self, Self::Point(_)) {
            let envelope = self.envelope();
            if envelope.width() <= 0.0 && envelope.height() <= 0.0 {
                return Err(SpiderError::MalformedGeometry(format!(
                    "{} has a zero-sized envelope",
                    self.kind()
                )));
            }
        }

        Ok(())
    }
}

fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    validate_ring(polygon.exterior(), "exterior")?;
    for interior in polygon.interiors() {
        validate_ring(interior, "interior")?;
    }
    Ok(())
}

fn validate_ring(ring: &LineString<f64>, role: &str) -> Result<()> {
    if ring.0.len() < 4 {
        return Err(SpiderError::MalformedGeometry(format!(
            "{} ring has {} coordinates, at least 4 are required",
            role,
            ring.0.len()
        )));
    }
    if !ring.is_closed() {
        return Err(SpiderError::MalformedGeometry(format!("{} ring is not closed", role)));
    }
    Ok(())
}

impl TryFrom<Geometry<f64>> for FeatureGeometry {
    type Error = SpiderError;

    fn try_from(geometry: Geometry<f64>) -> Result<Self> {
        let converted = match geometry {
            Geometry::Point(point) => Self::Point(point),
            Geometry::Polygon(polygon) => Self::Polygon(polygon),
            Geometry::MultiPolygon(multi) => Self::MultiPolygon(multi),
            Geometry::Line(_) => return Err(SpiderError::UnsupportedGeometry("Line".into())),
            Geometry::LineString(_) => {
                return Err(SpiderError::UnsupportedGeometry("LineString".into()))
            }
            Geometry::MultiPoint(_) => {
                return Err(SpiderError::UnsupportedGeometry("MultiPoint".into()))
            }
            Geometry::MultiLineString(_) => {
                return Err(SpiderError::UnsupportedGeometry("MultiLineString".into()))
            }
            Geometry::GeometryCollection(_) => {
                return Err(SpiderError::UnsupportedGeometry("GeometryCollection".into()))
            }
            Geometry::Rect(_) => return Err(SpiderError::UnsupportedGeometry("Rect".into())),
            Geometry::Triangle(_) => {
                return Err(SpiderError::UnsupportedGeometry("Triangle".into()))
            }
        };
        converted.validate()?;
        Ok(converted)
    }
}

/// Geographic bounding window used for a map-service request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoWindow {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl GeoWindow {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.x_min + self.x_max) / 2.0,
            y: (self.y_min + self.y_max) / 2.0,
        }
    }

    /// A window with no area cannot be mapped to pixels
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

impl From<Rect<f64>> for GeoWindow {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Output image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for PixelSize {
    fn default() -> Self {
        Self::new(512, 512)
    }
}

/// A position in image space; y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
