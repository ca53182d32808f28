//! Encoding stage of the crop pipeline.
//!
//! This module provides functionality for:
//! - Encoding RGB pixel buffers to JPEG with configurable quality
//! - Encoding RGB pixel buffers to lossless PNG
//! - Carrying the source photo's EXIF block into JPEG output
//!
//! # Examples
//!
//! ```ignore
//! use imagecrop::encode::{encode, OutputFormat};
//!
//! let bytes = encode(&image, OutputFormat::Jpeg { quality: 90 }).unwrap();
//! ```

mod jpeg;
mod metadata;
mod png;
mod types;

pub use jpeg::encode_jpeg;
pub use metadata::carry_metadata;
#[cfg(test)]
pub(crate) use metadata::{build_tiff_with_orientation, insert_exif_segment};
pub use png::encode_png;
pub use types::{EncodeError, OutputFormat};

use crate::decode::DecodedImage;

/// Encode a decoded image in the requested container format.
pub fn encode(image: &DecodedImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    let bytes = match format {
        OutputFormat::Jpeg { quality } => {
            encode_jpeg(&image.pixels, image.width, image.height, quality)?
        }
        OutputFormat::Png => encode_png(&image.pixels, image.width, image.height)?,
    };

    tracing::debug!(
        width = image.width,
        height = image.height,
        format = format.extension(),
        bytes = bytes.len(),
        "encoded image"
    );
    Ok(bytes)
}
