//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a JPEG or PNG image from bytes, orientation applied
//! - [`get_image_options`] - Oriented dimensions without decoding the pixels
//! - [`sample_image`] - Downscale encoded bytes to cover a preview box
//! - [`resize`] - Resize a decoded image to exact dimensions
//!
//! # Example
//!
//! ```typescript
//! import { get_image_options, sample_image } from '@imagecrop/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const { width, height } = get_image_options(bytes);
//! const preview = sample_image(bytes, 1024, 1024); // JPEG bytes
//! ```

use crate::types::{filter_from_u8, js_error, JsDecodedImage, JsImageOptions};
use imagecrop::{decode, CropConfig, ImageCrop, MemoryStore};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

/// Decode a JPEG or PNG image, applying its EXIF orientation.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Read the oriented width and height of an encoded image.
///
/// Only the container header is parsed.
#[wasm_bindgen]
pub fn get_image_options(bytes: &[u8]) -> Result<JsImageOptions, JsValue> {
    decode::read_image_options(bytes)
        .map(JsImageOptions::from)
        .map_err(js_error)
}

/// Downscale encoded image bytes so they still cover `maximum_width x maximum_height`.
///
/// Returns full-quality JPEG bytes with the source EXIF block carried over.
/// Images that are not larger than the box on both axes keep their size.
///
/// # Example
///
/// ```typescript
/// const preview = sample_image(bytes, 1080, 1080);
/// const url = URL.createObjectURL(new Blob([preview], { type: 'image/jpeg' }));
/// ```
#[wasm_bindgen]
pub fn sample_image(
    bytes: &[u8],
    maximum_width: u32,
    maximum_height: u32,
) -> Result<Vec<u8>, JsValue> {
    byte_engine()
        .sample_bytes(bytes, maximum_width, maximum_height)
        .map(|encoded| encoded.bytes)
        .map_err(js_error)
}

/// Resize an image to exact dimensions.
///
/// `filter`: 0=Nearest (fastest), 1=Bilinear (default), 2=Lanczos3 (best quality)
#[wasm_bindgen]
pub fn resize(
    image: &JsDecodedImage,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize(&image.to_decoded(), width, height, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Engine for the byte-level entry points, which never touch its store.
pub(crate) fn byte_engine() -> ImageCrop {
    ImageCrop::new(CropConfig::default(), Arc::new(MemoryStore::new()))
}

/// Tests for decode bindings.
///
/// Functions returning `Result<T, JsValue>` only work on wasm32 targets, so
/// native tests go through the core helpers the bindings wrap.
#[cfg(test)]
mod tests {
    use super::*;

    fn test_png(width: u32, height: u32) -> Vec<u8> {
        imagecrop::encode::encode_png(&vec![90u8; (width * height * 3) as usize], width, height)
            .unwrap()
    }

    #[test]
    fn test_byte_engine_samples() {
        let encoded = byte_engine().sample_bytes(&test_png(200, 100), 50, 50).unwrap();
        assert_eq!((encoded.width, encoded.height), (100, 50));
        assert_eq!(&encoded.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_byte_engine_options() {
        let options = byte_engine().options_from_bytes(&test_png(31, 17)).unwrap();
        assert_eq!(JsImageOptions::from(options).width(), 31);
    }
}
