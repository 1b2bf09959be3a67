//! Geographic request windows around features.

use geo_types::Rect;

use crate::types::{FeatureGeometry, GeoWindow};

/// Horizontal padding around point features, in map units
pub const POINT_MARGIN_X: f64 = 0.002;
/// Vertical padding around point features, in map units
pub const POINT_MARGIN_Y: f64 = 0.0015;

/// Compute the window to request from the map service for `geometry`.
///
/// Points get a fixed absolute margin. Polygons and multipolygons are
/// squared about their envelope center and then grown by a quarter of the
/// edge length on every side, so the feature sits in the middle half of the
/// image whatever its aspect ratio.
pub fn compute_window(geometry: &FeatureGeometry) -> GeoWindow {
    let envelope = geometry.envelope();
    match geometry {
        FeatureGeometry::Point(_) => pad(envelope.into(), POINT_MARGIN_X, POINT_MARGIN_Y),
        FeatureGeometry::Polygon(_) | FeatureGeometry::MultiPolygon(_) => {
            let square = square_envelope(envelope);
            let edge_length = square.width();
            pad(square, edge_length / 4.0, edge_length / 4.0)
        }
    }
}

/// Square an envelope about its center, using the longer side as edge length.
///
/// Only the shorter axis moves; the longer one is kept as is.
pub fn square_envelope(envelope: Rect<f64>) -> GeoWindow {
    let center = envelope.center();
    let width = envelope.width();
    let height = envelope.height();
    let mut window = GeoWindow::from(envelope);

    if width > height {
        window.y_min = center.y - width / 2.0;
        window.y_max = center.y + width / 2.0;
    } else {
        window.x_min = center.x - height / 2.0;
        window.x_max = center.x + height / 2.0;
    }
    window
}

/// Grow a window outward.
///
/// The envelope of a rectangle buffered by `d` is the rectangle moved out
/// by `d` on every side, so the buffer reduces to plain padding.
fn pad(window: GeoWindow, dx: f64, dy: f64) -> GeoWindow {
    GeoWindow::new(
        window.x_min - dx,
        window.y_min - dy,
        window.x_max + dx,
        window.y_max + dy,
    )
}
