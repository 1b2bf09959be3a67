//! # Picture Spider
//!
//! Produces one annotated map image per feature of a vector dataset. For each
//! feature a square geographic window is fitted around the geometry, the map
//! image for that window is requested from a WMS-style service, and the
//! feature's outline (or point marker) is drawn on top in a chosen colour.
//! An optional second service supplies a timestamp text per feature.
//!
//! ## Core Features
//!
//! - **Windowing**: square, buffered map extents for points, polygons and multipolygons
//! - **Retrying Fetcher**: blocking HTTP with exponential backoff
//! - **Overlay Rendering**: outlines, thick strokes and vertex markers on a trait-based canvas
//! - **Configuration**: TOML/JSON config files with a generated JSON schema
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spider::{GeoJsonSource, Pipeline, SpiderConfig};
//!
//! let config = SpiderConfig::new(
//!     "parcels.geojson",
//!     "http://maps.example.com/wms?LAYERS={}&BBOX={},{},{},{}&WIDTH={}&HEIGHT={}",
//!     "out",
//! );
//! let source = GeoJsonSource::open(&config.vector_path)?;
//! let pipeline = Pipeline::builder(config).build()?;
//! let summary = pipeline.run(&source)?;
//! println!("wrote {} images", summary.written.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod window;
pub mod transform;
pub mod request;
pub mod fetch;
pub mod render;
pub mod canvas;
pub mod io;
pub mod config;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use error::{Result, SpiderError};
pub use types::{Feature, FeatureGeometry, GeoWindow, PixelPoint, PixelSize};
pub use traits::{Canvas, Fetcher, Sleeper, VectorSource};
pub use window::compute_window;
pub use transform::PixelTransform;
pub use request::RequestTemplate;
pub use fetch::{HttpFetcher, RetryPolicy, RetryingFetcher};
pub use render::{LineColor, OverlayRenderer, RenderStyle};
pub use canvas::{ImageCanvas, TimestampFont};
pub use io::GeoJsonSource;
pub use config::{NamingMode, OutputFormat, SpiderConfig};
pub use pipeline::{builder::PipelineBuilder, Pipeline, RunSummary};
