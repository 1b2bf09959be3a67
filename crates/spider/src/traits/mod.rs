use std::time::Duration;

use image::Rgba;
use crate::{error::Result, types::{Feature, PixelPoint}};

/// Trait for remote services that answer a request string with raw bytes
pub trait Fetcher {
    /// Perform one request; no retrying happens at this level
    fn fetch(&self, request: &str) -> Result<Vec<u8>>;
}

/// Trait for blocking waits between retry attempts
pub trait Sleeper {
    fn sleep(&self, delay: Duration);
}

/// Trait for vector datasets that can be read feature by feature
pub trait VectorSource {
    /// Number of features in the dataset
    fn feature_count(&self) -> usize;

    /// Read the feature at `index` (0-based, source order)
    fn feature_at(&self, index: usize) -> Result<Feature>;
}

/// Trait for drawing surfaces the overlay renderer paints on
pub trait Canvas {
    /// Draw a 1 px closed outline through every vertex of `ring`
    fn outline_ring(&mut self, ring: &[PixelPoint], color: Rgba<u8>);

    /// Draw a connected line through `path` with the given stroke width
    fn stroke_path(&mut self, path: &[PixelPoint], color: Rgba<u8>, width: u32);

    /// Draw a filled circle
    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Rgba<u8>);

    /// Draw a line of text with its top-left corner at `origin`
    fn draw_text(&mut self, origin: PixelPoint, text: &str, color: Rgba<u8>) -> Result<()>;
}
