//! WASM bindings for crop and rotation.

use crate::decode::byte_engine;
use crate::types::{filter_from_u8, js_error, JsDecodedImage};
use imagecrop::transform::{self, Area};
use wasm_bindgen::prelude::*;

/// Crop encoded image bytes by a normalized area and scale the result.
///
/// Edges are fractions of the oriented image in `[0, 1]`; the output is the
/// cropped region times `scale`, encoded as full-quality JPEG with the source
/// EXIF block carried over.
///
/// # Example (TypeScript)
///
/// ```typescript
/// // Center half of the photo at half resolution
/// const jpeg = crop_image(bytes, 0.25, 0.25, 0.75, 0.75, 0.5);
/// ```
#[wasm_bindgen]
pub fn crop_image(
    bytes: &[u8],
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    scale: f64,
) -> Result<Vec<u8>, JsValue> {
    byte_engine()
        .crop_bytes(bytes, &Area::new(left, top, right, bottom), scale)
        .map(|encoded| encoded.bytes)
        .map_err(js_error)
}

/// Crop a decoded image by normalized left/top and size. Out-of-range values are clamped.
#[wasm_bindgen]
pub fn apply_crop(
    image: &JsDecodedImage,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> JsDecodedImage {
    let result = transform::apply_crop(&image.to_decoded(), left, top, width, height);
    JsDecodedImage::from_decoded(result)
}

/// Rotate a decoded image around its center, expanding the canvas to fit.
///
/// `angle_degrees` is counter-clockwise. `filter`: 0=Nearest, 1=Bilinear, 2=Lanczos3.
#[wasm_bindgen]
pub fn apply_rotation(image: &JsDecodedImage, angle_degrees: f64, filter: u8) -> JsDecodedImage {
    let result = transform::apply_rotation(&image.to_decoded(), angle_degrees, filter_from_u8(filter));
    JsDecodedImage::from_decoded(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> JsDecodedImage {
        let pixels: Vec<u8> = (0..(width * height * 3) as usize)
            .map(|i| (i % 256) as u8)
            .collect();
        JsDecodedImage::from_rgb(width, height, pixels).unwrap()
    }

    #[test]
    fn test_rotation_90_degrees() {
        let result = apply_rotation(&test_image(100, 50), 90.0, 1);
        assert_eq!((result.width(), result.height()), (50, 100));
    }

    #[test]
    fn test_rotation_45_degrees_expands() {
        let result = apply_rotation(&test_image(100, 100), 45.0, 2);
        assert!(result.width() > 100 && result.height() > 100);
    }

    #[test]
    fn test_crop_center() {
        let result = apply_crop(&test_image(100, 100), 0.25, 0.25, 0.5, 0.5);
        assert_eq!((result.width(), result.height()), (50, 50));
    }

    #[test]
    fn test_empty_image_passes_through() {
        let empty = test_image(0, 0);
        assert_eq!(apply_crop(&empty, 0.25, 0.25, 0.5, 0.5).byte_length(), 0);
        assert_eq!(apply_rotation(&empty, 45.0, 1).byte_length(), 0);
    }

    #[test]
    fn test_crop_non_square() {
        let result = apply_crop(&test_image(200, 100), 0.0, 0.0, 0.5, 1.0);
        assert_eq!((result.width(), result.height()), (100, 100));
    }
}
