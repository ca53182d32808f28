//! The crop engine: decode → transform → encode over a [`FileStore`].
//!
//! `ImageCrop` holds only immutable configuration and a store handle, so one
//! instance can serve concurrent calls.

use std::sync::Arc;

use thiserror::Error;

use crate::config::CropConfig;
use crate::decode::{self, DecodeError, ImageOptions};
use crate::encode::{self, EncodeError, OutputFormat};
use crate::store::{FileStore, StoreError};
use crate::transform::{self, Area, TransformError};

/// Errors from any stage of the pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a byte-level pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

pub struct ImageCrop {
    config: CropConfig,
    store: Arc<dyn FileStore>,
}

impl ImageCrop {
    pub fn new(config: CropConfig, store: Arc<dyn FileStore>) -> Self {
        Self { config, store }
    }

    /// Engine writing into the configured output directory on the local filesystem.
    #[cfg(feature = "fs")]
    pub fn with_filesystem(config: CropConfig) -> Self {
        let store = crate::store::FsStore::new(config.resolved_output_dir());
        Self::new(config, Arc::new(store))
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Oriented dimensions of the image at `path`.
    pub fn image_options(&self, path: &str) -> Result<ImageOptions, EngineError> {
        let bytes = self.store.read(path)?;
        Ok(self.options_from_bytes(&bytes)?)
    }

    /// Crop the image at `path` and write the result to a new file.
    ///
    /// Returns the path of the written file.
    pub fn crop_image(&self, path: &str, area: &Area, scale: f64) -> Result<String, EngineError> {
        let source = self.store.read(path)?;
        let encoded = self.crop_bytes(&source, area, scale)?;
        let output = self.write(&encoded)?;

        tracing::info!(
            source = path,
            output = %output,
            width = encoded.width,
            height = encoded.height,
            "cropped image"
        );
        Ok(output)
    }

    /// Downscale the image at `path` to cover `max_width x max_height` and
    /// write the result to a new file.
    ///
    /// Returns the path of the written file.
    pub fn sample_image(
        &self,
        path: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<String, EngineError> {
        let source = self.store.read(path)?;
        let encoded = self.sample_bytes(&source, max_width, max_height)?;
        let output = self.write(&encoded)?;

        tracing::info!(
            source = path,
            output = %output,
            width = encoded.width,
            height = encoded.height,
            "sampled image"
        );
        Ok(output)
    }

    pub fn options_from_bytes(&self, bytes: &[u8]) -> Result<ImageOptions, DecodeError> {
        decode::read_image_options(bytes)
    }

    /// Decode, crop and encode in memory.
    pub fn crop_bytes(
        &self,
        source: &[u8],
        area: &Area,
        scale: f64,
    ) -> Result<EncodedImage, EngineError> {
        // Reject bad arguments before paying for a decode
        area.validate()?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TransformError::InvalidScale(scale).into());
        }

        let image = decode::decode_image(source)?;
        let cropped = transform::crop(&image, area, scale, self.config.filter)?;
        self.encode(source, &cropped)
    }

    /// Decode, sample and encode in memory.
    pub fn sample_bytes(
        &self,
        source: &[u8],
        max_width: u32,
        max_height: u32,
    ) -> Result<EncodedImage, EngineError> {
        if max_width == 0 || max_height == 0 {
            return Err(DecodeError::InvalidDimensions {
                width: max_width,
                height: max_height,
            }
            .into());
        }

        let image = decode::decode_image(source)?;
        let sampled = decode::sample_image(&image, max_width, max_height, self.config.filter)?;
        self.encode(source, &sampled)
    }

    fn encode(
        &self,
        source: &[u8],
        image: &decode::DecodedImage,
    ) -> Result<EncodedImage, EngineError> {
        let format = self.config.output_format;
        let mut bytes = encode::encode(image, format)?;

        if self.config.preserve_metadata && matches!(format, OutputFormat::Jpeg { .. }) {
            bytes = encode::carry_metadata(source, bytes);
        }

        Ok(EncodedImage {
            width: image.width,
            height: image.height,
            format,
            bytes,
        })
    }

    fn write(&self, encoded: &EncodedImage) -> Result<String, StoreError> {
        self.store.write_new(
            &self.config.file_prefix,
            encoded.format.extension(),
            &encoded.bytes,
        )
    }
}

impl std::fmt::Debug for ImageCrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCrop")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
