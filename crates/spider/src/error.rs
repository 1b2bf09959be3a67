use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpiderError {
    #[error("{message} (gave up after {attempts} attempts)")]
    TransientFetch { attempts: u32, message: String },

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid request template: {0}")]
    Template(String),

    #[error("Failed to load font: {0}")]
    Font(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SpiderError>;
