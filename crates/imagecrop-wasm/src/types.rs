//! WASM-compatible wrapper types for image data.
//!
//! These types wrap the core ImageCrop types and handle the conversion
//! between Rust and JavaScript data representations.

use imagecrop::decode::{DecodedImage, FilterType, ImageOptions};
use wasm_bindgen::prelude::*;

/// A decoded RGB image held in WASM memory.
///
/// `pixels()` copies the buffer out to a JavaScript `Uint8Array`, so keep
/// images on the WASM side until the pixels are actually needed.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create an image from RGB pixel data (3 bytes per pixel, row-major order).
    ///
    /// Throws if `pixels` is not exactly `width * height * 3` bytes long.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsDecodedImage, JsValue> {
        Self::from_rgb(width, height, pixels).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Copy of the RGB pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsDecodedImage {
    /// Wrap an RGB buffer after checking its length against the dimensions.
    pub(crate) fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, String> {
        let expected = (width as u64).saturating_mul(height as u64).saturating_mul(3);
        if pixels.len() as u64 != expected {
            return Err(format!(
                "Pixel buffer of {} bytes does not match {}x{} RGB ({} bytes)",
                pixels.len(),
                width,
                height,
                expected
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Clone into a core image for the pipeline functions.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Oriented image dimensions, as returned by `getImageOptions`.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsImageOptions {
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl JsImageOptions {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl From<ImageOptions> for JsImageOptions {
    fn from(options: ImageOptions) -> Self {
        Self {
            width: options.width,
            height: options.height,
        }
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// Error message for JavaScript callers.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_decoded_image_creation() {
        let img = JsDecodedImage::from_rgb(100, 50, vec![0u8; 100 * 50 * 3]).unwrap();
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 15000);
    }

    #[test]
    fn test_mismatched_buffer_rejected() {
        assert!(JsDecodedImage::from_rgb(10, 10, vec![0u8; 299]).is_err());
        assert!(JsDecodedImage::from_rgb(10, 10, vec![0u8; 301]).is_err());
        assert!(JsDecodedImage::from_rgb(0, 10, vec![0u8; 3]).is_err());
        assert!(JsDecodedImage::from_rgb(u32::MAX, u32::MAX, vec![]).is_err());
    }

    #[test]
    fn test_empty_image_accepted() {
        let img = JsDecodedImage::from_rgb(0, 0, vec![]).unwrap();
        assert!(img.to_decoded().is_empty());
    }

    #[test]
    fn test_decoded_roundtrip() {
        let decoded = DecodedImage {
            width: 2,
            height: 1,
            pixels: vec![255, 128, 64, 32, 16, 8],
        };
        let js_img = JsDecodedImage::from_decoded(decoded.clone());
        assert_eq!(js_img.pixels(), decoded.pixels);
        assert_eq!(js_img.to_decoded(), decoded);
    }

    #[test]
    fn test_image_options_conversion() {
        let options = JsImageOptions::from(ImageOptions::new(640, 480));
        assert_eq!((options.width(), options.height()), (640, 480));
    }

    #[test]
    fn test_filter_from_u8() {
        assert_eq!(filter_from_u8(0), FilterType::Nearest);
        assert_eq!(filter_from_u8(1), FilterType::Bilinear);
        assert_eq!(filter_from_u8(2), FilterType::Lanczos3);
        // Unknown values default to Bilinear
        assert_eq!(filter_from_u8(3), FilterType::Bilinear);
        assert_eq!(filter_from_u8(255), FilterType::Bilinear);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_constructor_rejects_short_buffer() {
        assert!(JsDecodedImage::new(4, 4, vec![0u8; 10]).is_err());
        assert!(JsDecodedImage::new(4, 4, vec![0u8; 48]).is_ok());
    }
}
