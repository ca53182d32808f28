//! Resampling: exact resize, fit-within resize, and cover-sampling of large photos.
//!
//! All functions return new `DecodedImage` instances without modifying the input.
//!
//! Sampling happens in two steps. A power-of-two block average first shrinks
//! the image cheaply (the equivalent of decoding at a reduced sample size),
//! then a filtered resize lands on the exact size that still covers the
//! requested box.

use super::{DecodeError, DecodedImage, FilterType, ImageOptions};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is zero.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbImage".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Resize an image so its longest edge is at most `max_edge`, preserving aspect ratio.
///
/// Images that already fit are returned unchanged.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: max_edge,
            height: max_edge,
        });
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(image.width, image.height, max_edge);
    resize(image, new_width, new_height, filter)
}

/// Largest power-of-two sample size that keeps the halved image at least as
/// large as the requested box on both axes.
///
/// Always returns at least 1.
pub fn calculate_sample_size(width: u32, height: u32, max_width: u32, max_height: u32) -> u32 {
    let mut sample_size = 1u32;

    if height > max_height || width > max_width {
        let half_height = height / 2;
        let half_width = width / 2;

        while sample_size < (1 << 30)
            && half_height / sample_size >= max_height.max(1)
            && half_width / sample_size >= max_width.max(1)
        {
            sample_size *= 2;
        }
    }

    sample_size
}

/// Dimensions of the smallest aspect-preserving scale of `width x height`
/// that still covers `max_width x max_height`.
///
/// Returns the input unchanged unless it is larger than the box on both axes.
pub fn calculate_cover_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if !ImageOptions::new(width, height).exceeds(max_width, max_height) {
        return (width, height);
    }

    let ratio = (max_width as f64 / width as f64).max(max_height as f64 / height as f64);
    let new_width = (width as f64 * ratio).round() as u32;
    let new_height = (height as f64 * ratio).round() as u32;

    (new_width.clamp(1, width), new_height.clamp(1, height))
}

/// Downscale an image so it covers `max_width x max_height` with as few pixels
/// as possible. Smaller images are returned unchanged; nothing is upscaled.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either maximum is zero.
pub fn sample_image(
    image: &DecodedImage,
    max_width: u32,
    max_height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_width == 0 || max_height == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: max_width,
            height: max_height,
        });
    }

    if !image.options().exceeds(max_width, max_height) {
        return Ok(image.clone());
    }

    let (target_width, target_height) =
        calculate_cover_dimensions(image.width, image.height, max_width, max_height);

    let sample_size = calculate_sample_size(image.width, image.height, max_width, max_height);
    let reduced = downsample(image, sample_size);

    tracing::debug!(
        from_width = image.width,
        from_height = image.height,
        sample_size,
        target_width,
        target_height,
        "sampling image"
    );

    resize(&reduced, target_width, target_height, filter)
}

/// Average `factor x factor` blocks into single pixels.
///
/// Edge blocks that run past the image are averaged over the pixels they do cover.
fn downsample(image: &DecodedImage, factor: u32) -> DecodedImage {
    if factor <= 1 {
        return image.clone();
    }

    let out_width = image.width.div_ceil(factor).max(1);
    let out_height = image.height.div_ceil(factor).max(1);
    let src_stride = image.width as usize * 3;
    let mut output = Vec::with_capacity(out_width as usize * out_height as usize * 3);

    for by in 0..out_height {
        let y0 = by * factor;
        let y1 = (y0 + factor).min(image.height);
        for bx in 0..out_width {
            let x0 = bx * factor;
            let x1 = (x0 + factor).min(image.width);

            let mut sum = [0u64; 3];
            for y in y0..y1 {
                let row = y as usize * src_stride;
                for x in x0..x1 {
                    let idx = row + x as usize * 3;
                    sum[0] += image.pixels[idx] as u64;
                    sum[1] += image.pixels[idx + 1] as u64;
                    sum[2] += image.pixels[idx + 2] as u64;
                }
            }

            let count = ((y1 - y0) as u64 * (x1 - x0) as u64).max(1);
            output.extend(sum.iter().map(|s| ((s + count / 2) / count) as u8));
        }
    }

    DecodedImage::new(out_width, out_height, output)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
