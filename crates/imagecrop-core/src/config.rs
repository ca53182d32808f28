//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! output_dir = "/var/cache/imagecrop"
//! file_prefix = "image_crop_"
//! filter = "lanczos3"
//! preserve_metadata = true
//!
//! [output_format]
//! format = "jpeg"
//! quality = 100
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::encode::OutputFormat;

/// Prefix of every file the engine writes.
pub const DEFAULT_FILE_PREFIX: &str = "image_crop_";

/// Errors raised while loading or validating a [`CropConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Directory for cropped and sampled files. `None` means the system temp directory.
    pub output_dir: Option<PathBuf>,
    /// File name prefix for written images.
    pub file_prefix: String,
    /// Container and quality of written images.
    pub output_format: OutputFormat,
    /// Resampling filter for scaled crops and sampling.
    pub filter: FilterType,
    /// Copy the source EXIF block into JPEG output.
    pub preserve_metadata: bool,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            output_format: OutputFormat::default(),
            filter: FilterType::Bilinear,
            preserve_metadata: true,
        }
    }
}

impl CropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CropConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_prefix.is_empty() {
            return Err(ConfigError::Invalid("file_prefix must not be empty".to_string()));
        }
        if self
            .file_prefix
            .contains(|c: char| std::path::is_separator(c) || c == '\0')
        {
            return Err(ConfigError::Invalid(format!(
                "file_prefix must be a plain file name, got {:?}",
                self.file_prefix
            )));
        }
        if let OutputFormat::Jpeg { quality } = self.output_format {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Invalid(format!(
                    "JPEG quality must be within 1-100, got {}",
                    quality
                )));
            }
        }
        Ok(())
    }

    /// Output directory, falling back to the system temp directory.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
