use std::{fmt, path::Path};

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};

use crate::{
    error::{Result, SpiderError},
    traits::Canvas,
    types::PixelPoint,
};

/// TrueType font used for timestamp text
#[derive(Clone)]
pub struct TimestampFont {
    font: FontArc,
    size: f32,
}

impl TimestampFont {
    pub fn new(font: FontArc, size: f32) -> Self {
        Self { font, size }
    }

    /// Load a font file from disk
    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| SpiderError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(font, size))
    }

    pub fn size(&self) -> f32 {
        self.size
    }
}

impl fmt::Debug for TimestampFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampFont").field("size", &self.size).finish_non_exhaustive()
    }
}

/// Canvas backed by an RGBA raster, drawn with imageproc
pub struct ImageCanvas {
    image: RgbaImage,
    font: Option<TimestampFont>,
}

impl ImageCanvas {
    pub fn new(image: RgbaImage) -> Self {
        Self { image, font: None }
    }

    pub fn with_font(mut self, font: Option<TimestampFont>) -> Self {
        self.font = font;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl Canvas for ImageCanvas {
    fn outline_ring(&mut self, ring: &[PixelPoint], color: Rgba<u8>) {
        if ring.len() < 2 {
            return;
        }
        for segment in ring.windows(2) {
            draw_line_segment_mut(&mut self.image, as_f32(segment[0]), as_f32(segment[1]), color);
        }
        // Rings from geometries are already closed; this only matters for open input
        let (first, last) = (ring[0], ring[ring.len() - 1]);
        if first != last {
            draw_line_segment_mut(&mut self.image, as_f32(last), as_f32(first), color);
        }
    }

    fn stroke_path(&mut self, path: &[PixelPoint], color: Rgba<u8>, width: u32) {
        for segment in path.windows(2) {
            draw_thick_segment(&mut self.image, segment[0], segment[1], color, width);
        }
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Rgba<u8>) {
        draw_filled_circle_mut(&mut self.image, as_i32(center), radius.round() as i32, color);
    }

    fn draw_text(&mut self, origin: PixelPoint, text: &str, color: Rgba<u8>) -> Result<()> {
        let font = self.font.as_ref().ok_or_else(|| {
            SpiderError::Configuration("timestamp text requested without a font".to_string())
        })?;
        let (x, y) = as_i32(origin);
        draw_text_mut(&mut self.image, color, x, y, PxScale::from(font.size), &font.font, text);
        Ok(())
    }
}

/// Draw a segment of the given width by stamping filled circles along it
fn draw_thick_segment(
    image: &mut RgbaImage,
    start: PixelPoint,
    end: PixelPoint,
    color: Rgba<u8>,
    width: u32,
) {
    if width <= 1 {
        draw_line_segment_mut(image, as_f32(start), as_f32(end), color);
        return;
    }

    let radius = (width / 2).max(1) as i32;
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();

    if length < 1e-3 {
        draw_filled_circle_mut(image, as_i32(start), radius, color);
        return;
    }

    let step = (f64::from(radius) * 0.5).max(0.5);
    let steps = (length / step).ceil() as i32;
    for i in 0..=steps {
        let t = (f64::from(i) * step / length).min(1.0);
        let point = PixelPoint::new(start.x + t * dx, start.y + t * dy);
        draw_filled_circle_mut(image, as_i32(point), radius, color);
    }
}

fn as_f32(point: PixelPoint) -> (f32, f32) {
    (point.x as f32, point.y as f32)
}

fn as_i32(point: PixelPoint) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}
