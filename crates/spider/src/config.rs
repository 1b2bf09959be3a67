use std::path::{Path, PathBuf};

use image::ImageFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    error::{Result, SpiderError},
    fetch::RetryPolicy,
    render::{LineColor, RenderStyle},
    request::RequestTemplate,
    types::{Feature, PixelSize},
};

/// How output files are named
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NamingMode {
    /// `0007.png`: zero-padded feature index
    #[default]
    Index,
    /// `<value>_before.png`: value of an attribute field
    Attribute { field: String },
}

impl NamingMode {
    /// File name without extension for `feature`
    pub fn file_stem(&self, feature: &Feature) -> Result<String> {
        match self {
            Self::Index => Ok(format!("{:04}", feature.index)),
            Self::Attribute { field } => {
                let value = feature.attribute(field).ok_or_else(|| {
                    SpiderError::Configuration(format!(
                        "feature {} has no attribute '{}'",
                        feature.index, field
                    ))
                })?;
                if value.contains(['/', '\\', '\0']) {
                    return Err(SpiderError::Configuration(format!(
                        "attribute '{}' of feature {} is not a valid file name: '{}'",
                        field, feature.index, value
                    )));
                }
                Ok(format!("{}_before", value))
            }
        }
    }
}

/// Encoding of the written images
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema, Display, EnumString
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    #[strum(serialize = "jpeg", serialize = "jpg")]
    Jpeg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

fn default_layer() -> String {
    "WGS84".to_string()
}

fn default_credential() -> String {
    "admin".to_string()
}

fn default_line_width() -> u32 {
    3
}

fn default_font_size() -> f32 {
    24.0
}

/// Everything one run needs, fixed before the first feature is processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpiderConfig {
    /// Vector file with the features to photograph (GeoJSON)
    pub vector_path: PathBuf,
    /// Map request with slots for layer, xMin, yMin, xMax, yMax, width, height
    pub request_template: String,
    /// Directory the images are written to; created when missing
    pub output_dir: PathBuf,
    /// Map layer name
    #[serde(default = "default_layer")]
    pub layer: String,
    /// Service account, carried but not sent by the fetcher
    #[serde(default = "default_credential")]
    pub account: String,
    /// Service password, carried but not sent by the fetcher
    #[serde(default = "default_credential")]
    pub password: String,
    /// Requested and rendered image size
    #[serde(default)]
    pub size: PixelSize,
    #[serde(default)]
    pub line_color: LineColor,
    /// Outline width in pixels
    #[serde(default = "default_line_width")]
    #[schemars(range(min = 1))]
    pub line_width: u32,
    /// Timestamp request with slots for latitude and longitude; empty disables the overlay
    #[serde(default)]
    pub timestamp_template: String,
    #[serde(default)]
    pub naming: NamingMode,
    /// TrueType font for the timestamp overlay
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl SpiderConfig {
    /// Minimal configuration; everything else takes its default
    pub fn new(
        vector_path: impl Into<PathBuf>,
        request_template: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            vector_path: vector_path.into(),
            request_template: request_template.into(),
            output_dir: output_dir.into(),
            layer: default_layer(),
            account: default_credential(),
            password: default_credential(),
            size: PixelSize::default(),
            line_color: LineColor::default(),
            line_width: default_line_width(),
            timestamp_template: String::new(),
            naming: NamingMode::default(),
            font_path: None,
            font_size: default_font_size(),
            output_format: OutputFormat::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Load from a `.toml` or `.json` file, picked by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(SpiderError::Configuration(format!(
                "unsupported config file '{}', use .toml or .json",
                path.display()
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON schema of the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SpiderConfig)
    }

    /// Reject configurations that would fail halfway through a run
    pub fn validate(&self) -> Result<()> {
        if self.request_template.trim().is_empty() {
            return Err(SpiderError::Configuration("request template is empty".to_string()));
        }
        if self.size.width == 0 || self.size.height == 0 {
            return Err(SpiderError::Configuration(format!(
                "image size must be positive, got {}x{}",
                self.size.width, self.size.height
            )));
        }
        if self.line_width == 0 {
            return Err(SpiderError::Configuration("line width must be at least 1".to_string()));
        }
        if let NamingMode::Attribute { field } = &self.naming {
            if field.trim().is_empty() {
                return Err(SpiderError::Configuration(
                    "attribute naming needs a field name".to_string(),
                ));
            }
        }
        if self.timestamp_enabled() && !(self.font_size > 0.0) {
            return Err(SpiderError::Configuration(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        self.retry.validate()
    }

    pub fn timestamp_enabled(&self) -> bool {
        !self.timestamp_template.trim().is_empty()
    }

    pub fn map_template(&self) -> RequestTemplate {
        RequestTemplate::new(self.request_template.as_str())
    }

    pub fn timestamp_template(&self) -> Option<RequestTemplate> {
        self.timestamp_enabled()
            .then(|| RequestTemplate::new(self.timestamp_template.as_str()))
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle::new(self.line_color, self.line_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::point;

    use crate::types::FeatureGeometry;

    fn feature(index: usize) -> Feature {
        Feature::new(index, FeatureGeometry::Point(point!(x: 0.0, y: 0.0)))
            .with_attribute("ID", "B-17")
    }

    #[test]
    fn test_toml_defaults() {
        let config = SpiderConfig::from_toml(
            r#"
            vector_path = "parcels.geojson"
            request_template = "http://host/wms?LAYERS={}&BBOX={},{},{},{}&WIDTH={}&HEIGHT={}"
            output_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.layer, "WGS84");
        assert_eq!(config.account, "admin");
        assert_eq!(config.line_width, 3);
        assert_eq!(config.line_color, LineColor::Red);
        assert_eq!(config.naming, NamingMode::Index);
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(!config.timestamp_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_full() {
        let config = SpiderConfig::from_toml(
            r#"
            vector_path = "parcels.geojson"
            request_template = "http://host/wms?{}"
            output_dir = "out"
            line_color = "b"
            line_width = 5
            size = { width = 800, height = 600 }
            timestamp_template = "http://time/?lat={}&lon={}"
            font_path = "fonts/DejaVuSans.ttf"
            output_format = "jpeg"

            [naming]
            mode = "attribute"
            field = "ID"

            [retry]
            max_attempts = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.line_color, LineColor::Blue);
        assert_eq!(config.size, PixelSize::new(800, 600));
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.backoff, 2.0);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert!(config.timestamp_template().is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_retry_delay_is_rejected() {
        let config = SpiderConfig::from_toml(
            r#"
            vector_path = "parcels.geojson"
            request_template = "http://host/wms?{}"
            output_dir = "out"

            [retry]
            initial_delay_secs = 1e20
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(SpiderError::Configuration(_))));
    }

    #[test]
    fn test_unknown_color_fails_to_load() {
        let result = SpiderConfig::from_json(
            r#"{"vector_path": "a", "request_template": "{}", "output_dir": "o", "line_color": "q"}"#,
        );
        assert!(matches!(result, Err(SpiderError::Serialization(_))));
    }

    #[test]
    fn test_validation_errors() {
        let base = SpiderConfig::new("a.geojson", "http://host/{}", "out");

        let mut config = base.clone();
        config.size = PixelSize::new(0, 10);
        assert!(matches!(config.validate(), Err(SpiderError::Configuration(_))));

        let mut config = base.clone();
        config.timestamp_template = "http://time/{}/{}".to_string();
        config.font_size = 0.0;
        assert!(matches!(config.validate(), Err(SpiderError::Configuration(_))));
        config.font_size = 24.0;
        assert!(config.validate().is_ok());

        let mut config = base.clone();
        config.naming = NamingMode::Attribute { field: " ".to_string() };
        assert!(config.validate().is_err());

        let mut config = base;
        config.request_template = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(NamingMode::Index.file_stem(&feature(7)).unwrap(), "0007");
        assert_eq!(NamingMode::Index.file_stem(&feature(12345)).unwrap(), "12345");

        let by_id = NamingMode::Attribute { field: "ID".to_string() };
        assert_eq!(by_id.file_stem(&feature(0)).unwrap(), "B-17_before");

        let by_missing = NamingMode::Attribute { field: "NAME".to_string() };
        assert!(by_missing.file_stem(&feature(0)).is_err());
    }

    #[test]
    fn test_attribute_names_cannot_leave_the_output_dir() {
        let by_id = NamingMode::Attribute { field: "ID".to_string() };
        for value in ["../escape", "a/b", "..\\escape", "/etc/passwd"] {
            let named = feature(0).with_attribute("ID", value);
            assert!(
                matches!(by_id.file_stem(&named), Err(SpiderError::Configuration(_))),
                "{} should be rejected",
                value
            );
        }
        // Dots alone stay inside the directory once suffixed
        let named = feature(0).with_attribute("ID", "..");
        assert_eq!(by_id.file_stem(&named).unwrap(), ".._before");
    }

    #[test]
    fn test_unsupported_config_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "x: 1").unwrap();
        assert!(matches!(
            SpiderConfig::from_file(&path),
            Err(SpiderError::Configuration(_))
        ));
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = SpiderConfig::new("a.geojson", "http://host/{}", "out");
        std::fs::write(&path, config.to_json().unwrap()).unwrap();
        assert_eq!(SpiderConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = serde_json::to_value(SpiderConfig::schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("request_template"));
        assert!(properties.contains_key("retry"));
    }
}
