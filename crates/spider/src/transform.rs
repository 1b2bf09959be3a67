//! Geographic to pixel coordinate mapping.

use geo_types::{Coord, LineString};

use crate::types::{GeoWindow, PixelPoint, PixelSize};

/// Affine mapping from a geographic window onto an image of known size.
///
/// The per-pixel extents are computed once and reused for every vertex of a
/// feature. `pixel_height` is negative: geographic y grows upward while image
/// rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTransform {
    x_min: f64,
    y_max: f64,
    pixel_width: f64,
    pixel_height: f64,
}

impl PixelTransform {
    pub fn new(window: &GeoWindow, size: PixelSize) -> Self {
        Self {
            x_min: window.x_min,
            y_max: window.y_max,
            pixel_width: (window.x_max - window.x_min) / f64::from(size.width),
            pixel_height: (window.y_min - window.y_max) / f64::from(size.height),
        }
    }

    /// Ground size of one pixel column
    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    /// Ground size of one pixel row, always negative
    pub fn pixel_height(&self) -> f64 {
        self.pixel_height
    }

    pub fn to_pixel(&self, coord: Coord<f64>) -> PixelPoint {
        PixelPoint::new(
            (coord.x - self.x_min) / self.pixel_width,
            (coord.y - self.y_max) / self.pixel_height,
        )
    }

    /// Map every vertex of a ring, closing point included
    pub fn ring_to_pixels(&self, ring: &LineString<f64>) -> Vec<PixelPoint> {
        ring.coords().map(|&coord| self.to_pixel(coord)).collect()
    }
}

/// Map a single coordinate without keeping the transform around
pub fn to_pixel(coord: Coord<f64>, window: &GeoWindow, size: PixelSize) -> PixelPoint {
    PixelTransform::new(window, size).to_pixel(coord)
}
