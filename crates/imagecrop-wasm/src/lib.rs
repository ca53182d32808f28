//! ImageCrop WASM - WebAssembly bindings for the image_crop engine
//!
//! # Module Structure
//!
//! - `channel` - The `image_crop` method channel over an in-memory file store
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Decoding, image options and preview sampling
//! - `transform` - Cropping and rotation
//! - `encode` - JPEG and PNG encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { crop_image, get_image_options } from '@imagecrop/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const { width, height } = get_image_options(bytes);
//! const jpeg = crop_image(bytes, 0.1, 0.1, 0.9, 0.9, 1.0);
//! ```

use wasm_bindgen::prelude::*;

mod channel;
mod decode;
mod encode;
mod transform;
mod types;

pub use channel::JsImageCrop;
pub use decode::{decode_image, get_image_options, resize, sample_image};
pub use encode::{encode_image, encode_jpeg};
pub use transform::{apply_crop, apply_rotation, crop_image};
pub use types::{JsDecodedImage, JsImageOptions};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    imagecrop::VERSION.to_string()
}

/// Name of the method channel served by [`JsImageCrop`].
#[wasm_bindgen]
pub fn channel_name() -> String {
    imagecrop::CHANNEL_NAME.to_string()
}
