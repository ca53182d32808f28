//! Image encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_image } from '@imagecrop/wasm';
//!
//! const jpeg = encode_image(image, { format: 'jpeg', quality: 90 });
//! const png = encode_image(image, { format: 'png' });
//! ```

use crate::types::{js_error, JsDecodedImage};
use imagecrop::encode::{self, OutputFormat};
use wasm_bindgen::prelude::*;

/// Encode a decoded image.
///
/// `format` is `{ format: 'jpeg', quality }` or `{ format: 'png' }`;
/// `undefined` selects full-quality JPEG.
#[wasm_bindgen]
pub fn encode_image(image: &JsDecodedImage, format: JsValue) -> Result<Vec<u8>, JsValue> {
    let format = parse_format(format)?;
    encode::encode(&image.to_decoded(), format).map_err(js_error)
}

/// Encode RGB pixel data (3 bytes per pixel, row-major) to JPEG.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(js_error)
}

fn parse_format(format: JsValue) -> Result<OutputFormat, JsValue> {
    if format.is_undefined() || format.is_null() {
        return Ok(OutputFormat::default());
    }
    serde_wasm_bindgen::from_value(format)
        .map_err(|e| JsValue::from_str(&format!("Invalid output format: {}", e)))
}
