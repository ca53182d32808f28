//! Image cropping with optional output scaling.
//!
//! Crop regions are normalized (0.0 to 1.0) so they stay independent of the
//! decoded pixel dimensions, which may differ from what the UI measured once
//! EXIF orientation or sampling has been applied.
//!
//! # Example
//!
//! ```ignore
//! // Keep the center half of the image at 50% size
//! let area = Area::new(0.25, 0.25, 0.75, 0.75);
//! let cropped = crop(&image, &area, 0.5, FilterType::Bilinear)?;
//! ```

use super::{Area, TransformError, MAX_OUTPUT_BYTES};
use crate::decode::{self, DecodedImage, FilterType};

/// Crop `area` out of `image` and scale the result by `scale`.
///
/// The source rectangle is `area` mapped onto the image with floored edges.
/// The output is `round(src_width * scale) x round(src_height * scale)`, never
/// smaller than 1x1. A scale of exactly 1 copies pixels without resampling.
///
/// # Errors
///
/// - `TransformError::InvalidArea` if `area` does not validate
/// - `TransformError::InvalidScale` if `scale` is not finite and positive
/// - `TransformError::EmptyImage` if the source has no pixels
/// - `TransformError::OutputTooLarge` if the scaled output exceeds [`MAX_OUTPUT_BYTES`]
pub fn crop(
    image: &DecodedImage,
    area: &Area,
    scale: f64,
    filter: FilterType,
) -> Result<DecodedImage, TransformError> {
    area.validate()?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(TransformError::InvalidScale(scale));
    }
    if image.is_empty() {
        return Err(TransformError::EmptyImage);
    }

    let (x, y, width, height) = area.to_pixels(image.width, image.height);
    let out_width = ((width as f64 * scale).round() as u32).max(1);
    let out_height = ((height as f64 * scale).round() as u32).max(1);
    let out_bytes = (out_width as u64)
        .saturating_mul(out_height as u64)
        .saturating_mul(3);
    if out_bytes > MAX_OUTPUT_BYTES {
        return Err(TransformError::OutputTooLarge {
            width: out_width,
            height: out_height,
        });
    }

    let region = copy_region(image, x, y, width, height);

    tracing::debug!(
        x,
        y,
        width,
        height,
        out_width,
        out_height,
        "cropping region"
    );

    if (out_width, out_height) == (width, height) {
        return Ok(region);
    }

    decode::resize(&region, out_width, out_height, filter)
        .map_err(|e| TransformError::Resample(e.to_string()))
}

/// Apply crop to an image using normalized left/top and size.
///
/// Lenient counterpart of [`crop`]: coordinates outside `[0, 1]` are clamped
/// instead of rejected, and the output is at least 1x1.
///
/// # Arguments
///
/// * `image` - Source image to crop
/// * `left` - Left edge of crop region (0.0 to 1.0)
/// * `top` - Top edge of crop region (0.0 to 1.0)
/// * `width` - Width of crop region (0.0 to 1.0)
/// * `height` - Height of crop region (0.0 to 1.0)
pub fn apply_crop(
    image: &DecodedImage,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> DecodedImage {
    if image.is_empty() || Area::from_ltwh(left, top, width, height).is_full() {
        return image.clone();
    }

    let left = left.clamp(0.0, 1.0);
    let top = top.clamp(0.0, 1.0);
    let area = Area::from_ltwh(left, top, width.clamp(0.0, 1.0), height.clamp(0.0, 1.0));
    let (x, y, w, h) = area.to_pixels(image.width, image.height);

    copy_region(image, x, y, w, h)
}

/// Copy a pixel rectangle that is known to lie inside the image.
fn copy_region(image: &DecodedImage, x: u32, y: u32, width: u32, height: u32) -> DecodedImage {
    if x == 0 && y == 0 && width == image.width && height == image.height {
        return image.clone();
    }

    let src_stride = image.width as usize * 3;
    let row_len = width as usize * 3;
    let mut output = Vec::with_capacity(row_len * height as usize);

    for row in y..y + height {
        let start = row as usize * src_stride + x as usize * 3;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    DecodedImage::new(width, height, output)
}
