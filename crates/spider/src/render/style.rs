use image::Rgba;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{Result, SpiderError};

/// Named line colors accepted on the command line and in config files.
///
/// Each color parses from its one-letter key or its full name.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
pub enum LineColor {
    #[default]
    #[serde(alias = "r")]
    #[strum(to_string = "red", serialize = "r")]
    Red,
    #[serde(alias = "g")]
    #[strum(to_string = "green", serialize = "g")]
    Green,
    #[serde(alias = "b")]
    #[strum(to_string = "blue", serialize = "b")]
    Blue,
    #[serde(alias = "y")]
    #[strum(to_string = "yellow", serialize = "y")]
    Yellow,
    #[serde(alias = "k")]
    #[strum(to_string = "black", serialize = "k")]
    Black,
    #[serde(alias = "w")]
    #[strum(to_string = "white", serialize = "w")]
    White,
}

impl LineColor {
    /// Parse a color key, failing with a configuration error for unknown keys
    pub fn from_key(key: &str) -> Result<Self> {
        key.parse().map_err(|_| {
            SpiderError::Configuration(format!(
                "unknown line color '{}', expected one of {:?}",
                key,
                <Self as VariantNames>::VARIANTS
            ))
        })
    }

    pub fn rgba(self) -> Rgba<u8> {
        match self {
            Self::Red => Rgba([255, 0, 0, 255]),
            Self::Green => Rgba([0, 128, 0, 255]),
            Self::Blue => Rgba([0, 0, 255, 255]),
            Self::Yellow => Rgba([255, 255, 0, 255]),
            Self::Black => Rgba([0, 0, 0, 255]),
            Self::White => Rgba([255, 255, 255, 255]),
        }
    }
}

/// How feature outlines are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub line_color: LineColor,
    /// Stroke width in pixels
    pub line_width: u32,
}

impl RenderStyle {
    /// Marker radius used for point features regardless of line width
    pub const POINT_RADIUS: f64 = 5.0;

    pub fn new(line_color: LineColor, line_width: u32) -> Self {
        Self {
            line_color,
            line_width,
        }
    }

    /// Radius of the marker drawn on every polygon vertex
    pub fn vertex_radius(&self) -> f64 {
        f64::from(self.line_width.saturating_sub(1) / 2)
    }

    pub fn color(&self) -> Rgba<u8> {
        self.line_color.rgba()
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::new(LineColor::Red, 3)
    }
}
