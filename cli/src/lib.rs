use std::path::PathBuf;

use clap::Args;
use spider::{LineColor, NamingMode, PixelSize, SpiderConfig, SpiderError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Spider(#[from] SpiderError),
    #[error("--size takes exactly two values, got {0}")]
    InvalidSize(usize),
    #[error("--n must be 0 or 1, got {0}")]
    InvalidNameFlag(u8),
    #[error("--n 1 needs an attribute field given with --nf")]
    MissingNameField,
}

/// Command-line surface of a single run
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Vector file with the features to photograph (GeoJSON)
    pub vec: PathBuf,
    /// Map request string; layer, bounds and size are substituted for `{}`
    pub req: String,
    /// Destination directory for the pictures
    pub out: PathBuf,
    /// Map layer
    #[arg(default_value = "WGS84")]
    pub lay: String,
    /// Account
    #[arg(default_value = "admin")]
    pub acc: String,
    /// Password
    #[arg(default_value = "admin")]
    pub pw: String,
    /// Picture size in pixels
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub size: Option<Vec<u32>>,
    /// Line width in pixels
    #[arg(long = "lw", default_value_t = 3)]
    pub line_width: u32,
    /// Line colour key (r, g, b, y, k, w)
    #[arg(long = "lc", default_value = "r")]
    pub line_color: String,
    /// Timestamp request string with `{}` for latitude and longitude
    #[arg(long = "t", default_value = "")]
    pub timestamp: String,
    /// Image name flag: 1 names files after the --nf attribute
    #[arg(long = "n", default_value_t = 0)]
    pub name_flag: u8,
    /// Attribute used for file names
    #[arg(long = "nf", default_value = "")]
    pub name_field: String,
    /// TrueType font for the timestamp
    #[arg(long = "f")]
    pub font: Option<PathBuf>,
    /// Font size of the timestamp
    #[arg(long = "fs", default_value_t = 24.0)]
    pub font_size: f32,
}

impl RunArgs {
    /// Build the run configuration; unknown colours and bad flags fail here
    pub fn into_config(self) -> Result<SpiderConfig, CliError> {
        let mut config = SpiderConfig::new(self.vec, self.req, self.out);
        config.layer = self.lay;
        config.account = self.acc;
        config.password = self.pw;

        if let Some(size) = self.size {
            match size.as_slice() {
                [width, height] => config.size = PixelSize::new(*width, *height),
                other => return Err(CliError::InvalidSize(other.len())),
            }
        }

        config.line_width = self.line_width;
        config.line_color = LineColor::from_key(&self.line_color)?;
        config.timestamp_template = self.timestamp;
        config.naming = match self.name_flag {
            0 => NamingMode::Index,
            1 if self.name_field.trim().is_empty() => return Err(CliError::MissingNameField),
            1 => NamingMode::Attribute {
                field: self.name_field,
            },
            other => return Err(CliError::InvalidNameFlag(other)),
        };
        config.font_path = self.font;
        config.font_size = self.font_size;

        config.validate()?;
        Ok(config)
    }
}
