pub mod style;

pub use style::{LineColor, RenderStyle};

use geo_types::{LineString, Polygon};
use image::Rgba;

use crate::{
    error::Result,
    traits::Canvas,
    transform::PixelTransform,
    types::{FeatureGeometry, PixelPoint, PixelSize},
};

/// Timestamp text is drawn in white
pub const TIMESTAMP_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Relative position of the timestamp's top-left corner
pub const TIMESTAMP_ANCHOR: (f64, f64) = (0.36, 0.94);

/// Counts of what a render call put on the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rings: usize,
    pub markers: usize,
}

/// Draws feature geometries onto a canvas
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayRenderer {
    style: RenderStyle,
}

impl OverlayRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Draw `geometry` onto `canvas` using the feature's pixel transform
    pub fn render<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        geometry: &FeatureGeometry,
        transform: &PixelTransform,
    ) -> RenderStats {
        let mut stats = RenderStats::default();

        match geometry {
            FeatureGeometry::Point(point) => {
                let center = transform.to_pixel(point.0);
                canvas.fill_circle(center, RenderStyle::POINT_RADIUS, self.style.color());
                stats.markers += 1;
            }
            FeatureGeometry::Polygon(polygon) => {
                for ring in rings_holes_first(polygon) {
                    self.outlined_ring(canvas, &transform.ring_to_pixels(ring), &mut stats);
                }
            }
            FeatureGeometry::MultiPolygon(multi) => {
                // Parts are stroked without the 1 px outline
                for part in &multi.0 {
                    let part_rings = std::iter::once(part.exterior()).chain(part.interiors());
                    for ring in part_rings {
                        self.stroked_ring(canvas, &transform.ring_to_pixels(ring), &mut stats);
                    }
                }
            }
        }

        stats
    }

    /// Draw a line of timestamp text near the bottom of an image of `size`
    pub fn draw_timestamp<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        text: &str,
        size: PixelSize,
    ) -> Result<()> {
        let origin = PixelPoint::new(
            TIMESTAMP_ANCHOR.0 * f64::from(size.width),
            TIMESTAMP_ANCHOR.1 * f64::from(size.height),
        );
        canvas.draw_text(origin, text, TIMESTAMP_COLOR)
    }

    fn outlined_ring<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        ring: &[PixelPoint],
        stats: &mut RenderStats,
    ) {
        canvas.outline_ring(ring, self.style.color());
        self.stroked_ring(canvas, ring, stats);
    }

    fn stroked_ring<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        ring: &[PixelPoint],
        stats: &mut RenderStats,
    ) {
        let color = self.style.color();
        canvas.stroke_path(ring, color, self.style.line_width);
        for &vertex in ring {
            canvas.fill_circle(vertex, self.style.vertex_radius(), color);
        }
        stats.rings += 1;
        stats.markers += ring.len();
    }
}

/// Interior rings in order, then the exterior ring
fn rings_holes_first(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    polygon.interiors().iter().chain(std::iter::once(polygon.exterior()))
}
