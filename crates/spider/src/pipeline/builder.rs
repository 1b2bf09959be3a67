use std::sync::Arc;

use tracing::debug;

use crate::{
    canvas::TimestampFont,
    config::SpiderConfig,
    error::{Result, SpiderError},
    fetch::{HttpFetcher, RetryingFetcher, ThreadSleeper},
    pipeline::Pipeline,
    render::OverlayRenderer,
    traits::{Fetcher, Sleeper},
};

/// Builder for creating pipelines with a fluent API.
///
/// Unset collaborators default to a blocking HTTP fetcher and a real thread
/// sleep. The configuration is validated and the timestamp font loaded in
/// [`PipelineBuilder::build`], before any feature is touched.
pub struct PipelineBuilder {
    config: SpiderConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    timestamp_fetcher: Option<Arc<dyn Fetcher>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    font: Option<TimestampFont>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new(config: SpiderConfig) -> Self {
        Self {
            config,
            fetcher: None,
            timestamp_fetcher: None,
            sleeper: None,
            font: None,
        }
    }

    /// Set the fetcher used for map requests (wrapped in retry)
    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Set a separate fetcher for timestamp requests; defaults to the map fetcher
    pub fn with_timestamp_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        self.timestamp_fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Set what waits between retry attempts
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Use an already loaded timestamp font instead of the configured path
    pub fn with_font(mut self, font: TimestampFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Validate the configuration and assemble the pipeline
    pub fn build(self) -> Result<Pipeline> {
        self.config.validate()?;

        let font = match (self.config.timestamp_enabled(), self.font) {
            (false, _) => None,
            (true, Some(font)) => Some(font),
            (true, None) => {
                let path = self.config.font_path.as_ref().ok_or_else(|| {
                    SpiderError::Configuration("timestamp overlay needs a font path".to_string())
                })?;
                debug!(path = %path.display(), size = self.config.font_size, "loading timestamp font");
                Some(TimestampFont::load(path, self.config.font_size)?)
            }
        };

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()?),
        };
        let timestamp_fetcher = self.timestamp_fetcher.unwrap_or_else(|| fetcher.clone());
        let sleeper: Arc<dyn Sleeper> = self.sleeper.unwrap_or_else(|| Arc::new(ThreadSleeper));

        Ok(Pipeline {
            map_template: self.config.map_template(),
            timestamp_template: self.config.timestamp_template(),
            fetcher: RetryingFetcher::with_sleeper(
                fetcher,
                self.config.retry.clone(),
                sleeper.clone(),
            ),
            timestamp_fetcher: RetryingFetcher::with_sleeper(
                timestamp_fetcher,
                self.config.retry.clone(),
                sleeper,
            ),
            renderer: OverlayRenderer::new(self.config.render_style()),
            font,
            config: self.config,
        })
    }
}
