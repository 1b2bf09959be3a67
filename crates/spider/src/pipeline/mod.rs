pub mod builder;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{DynamicImage, RgbaImage};
use tracing::{debug, info};

use crate::{
    canvas::{ImageCanvas, TimestampFont},
    config::{OutputFormat, SpiderConfig},
    error::{Result, SpiderError},
    fetch::RetryingFetcher,
    render::{OverlayRenderer, RenderStats},
    request::RequestTemplate,
    traits::{Canvas, Fetcher, Sleeper, VectorSource},
    transform::PixelTransform,
    types::Feature,
    window::compute_window,
};

/// Files written by a completed run, in feature order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
}

/// Turns every feature of a vector source into an annotated map image.
///
/// Features are processed one after another; the first error stops the run
/// and leaves the images already written in place.
pub struct Pipeline {
    config: SpiderConfig,
    map_template: RequestTemplate,
    timestamp_template: Option<RequestTemplate>,
    fetcher: RetryingFetcher<Arc<dyn Fetcher>, Arc<dyn Sleeper>>,
    timestamp_fetcher: RetryingFetcher<Arc<dyn Fetcher>, Arc<dyn Sleeper>>,
    renderer: OverlayRenderer,
    font: Option<TimestampFont>,
}

impl Pipeline {
    /// Create a new pipeline builder for `config`
    pub fn builder(config: SpiderConfig) -> builder::PipelineBuilder {
        builder::PipelineBuilder::new(config)
    }

    pub fn config(&self) -> &SpiderConfig {
        &self.config
    }

    /// Process every feature of `source` in index order
    pub fn run(&self, source: &dyn VectorSource) -> Result<RunSummary> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let count = source.feature_count();
        info!(features = count, output_dir = %self.config.output_dir.display(), "starting run");

        let mut summary = RunSummary::default();
        for index in 0..count {
            let feature = source.feature_at(index)?;
            let path = self.process_feature(&feature)?;
            summary.written.push(path);
        }

        info!(written = summary.written.len(), "run finished");
        Ok(summary)
    }

    /// Fetch, annotate and write the image for one feature
    pub fn process_feature(&self, feature: &Feature) -> Result<PathBuf> {
        let image = self.render_feature(feature)?;
        let path = self.output_path(feature)?;
        save_image(image, &path, self.config.output_format)?;
        info!(index = feature.index, kind = feature.geometry.kind(), path = %path.display(), "wrote image");
        Ok(path)
    }

    /// Fetch the map image for `feature` and draw its overlay
    pub fn render_feature(&self, feature: &Feature) -> Result<RgbaImage> {
        let size = self.config.size;
        let window = compute_window(&feature.geometry);
        if window.is_degenerate() {
            return Err(SpiderError::MalformedGeometry(format!(
                "feature {} produces an empty window {:?}",
                feature.index, window
            )));
        }

        let request = self.map_template.map_request(&self.config.layer, &window, size)?;
        debug!(index = feature.index, ?window, %request, "requesting map image");
        let bytes = self.fetcher.fetch(&request)?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();

        let transform = PixelTransform::new(&window, size);
        let mut canvas = ImageCanvas::new(image).with_font(self.font.clone());
        let stats = self.annotate(feature, &transform, &mut canvas)?;
        debug!(index = feature.index, rings = stats.rings, markers = stats.markers, "drew overlay");

        Ok(canvas.into_image())
    }

    /// Draw the geometry and, when enabled, the timestamp onto `canvas`
    pub fn annotate<C: Canvas + ?Sized>(
        &self,
        feature: &Feature,
        transform: &PixelTransform,
        canvas: &mut C,
    ) -> Result<RenderStats> {
        let stats = self.renderer.render(canvas, &feature.geometry, transform);

        if let Some(template) = &self.timestamp_template {
            let centroid = feature.geometry.centroid();
            let request = template.timestamp_request(centroid.y, centroid.x)?;
            let bytes = self.timestamp_fetcher.fetch(&request)?;
            let text = String::from_utf8_lossy(&bytes);
            let text = text.trim_end_matches(['\r', '\n']);
            debug!(index = feature.index, text, "drawing timestamp");
            self.renderer.draw_timestamp(canvas, text, self.config.size)?;
        }

        Ok(stats)
    }

    /// Output file for `feature` under the configured directory
    pub fn output_path(&self, feature: &Feature) -> Result<PathBuf> {
        let stem = self.config.naming.file_stem(feature)?;
        Ok(self
            .config
            .output_dir
            .join(format!("{}.{}", stem, self.config.output_format.extension())))
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: layer {}, {}x{} px, {} line {} px, timestamp {}, {} attempts per fetch",
            self.config.layer,
            self.config.size.width,
            self.config.size.height,
            self.config.line_color,
            self.config.line_width,
            if self.timestamp_template.is_some() { "on" } else { "off" },
            self.fetcher.policy().max_attempts,
        )
    }
}

fn save_image(image: RgbaImage, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Png => image.save_with_format(path, format.image_format())?,
        // JPEG has no alpha channel
        OutputFormat::Jpeg => DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save_with_format(path, format.image_format())?,
    }
    Ok(())
}
