//! The `image_crop` method channel, hosted in the browser.
//!
//! Channel calls exchange file paths. Here the "files" live in an in-memory
//! store: JavaScript puts source bytes under a path, invokes a method, and
//! takes the result file back out.
//!
//! ```typescript
//! const channel = new JsImageCrop();
//! channel.put_file('photo.jpg', bytes);
//! const out = channel.invoke('cropImage', {
//!   path: 'photo.jpg', left: 0.1, top: 0.1, right: 0.9, bottom: 0.9, scale: 1.0,
//! });
//! const jpeg = channel.take_file(out);
//! ```

use std::sync::Arc;

use imagecrop::{
    ChannelRegistry, CropConfig, ImageCrop, ImageCropPlugin, MemoryStore, MethodOutcome,
    PluginError, CHANNEL_NAME,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct JsImageCrop {
    registry: ChannelRegistry,
    store: Arc<MemoryStore>,
}

#[wasm_bindgen]
impl JsImageCrop {
    /// Create a channel host. `config` uses the same keys as the TOML config;
    /// `undefined` selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsImageCrop, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            CropConfig::default()
        } else {
            let config: CropConfig = serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
            config
                .validate()
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            config
        };
        Ok(Self::with_config(config))
    }

    /// Store `bytes` under `path`, replacing any previous file.
    pub fn put_file(&self, path: &str, bytes: Vec<u8>) {
        self.store.insert(path, bytes);
    }

    /// Remove the file at `path` and return its bytes.
    pub fn take_file(&self, path: &str) -> Option<Vec<u8>> {
        self.store.take(path)
    }

    #[wasm_bindgen(getter)]
    pub fn file_count(&self) -> usize {
        self.store.len()
    }

    /// Invoke a channel method.
    ///
    /// Resolves to the method's result. Failures throw an `Error` carrying a
    /// `code` property (`INVALID`, `IO` or `NOT_IMPLEMENTED`).
    pub fn invoke(&self, method: &str, arguments: JsValue) -> Result<JsValue, JsValue> {
        let arguments: serde_json::Value = serde_wasm_bindgen::from_value(arguments)
            .map_err(|e| to_js_error(&PluginError::invalid(e.to_string())))?;

        let outcome = self.registry.invoke(CHANNEL_NAME, method, arguments);
        if let MethodOutcome::Error(e) = &outcome {
            web_sys::console::warn_1(&JsValue::from_str(&format!("{}: {}", method, e)));
        }

        let result = outcome.into_result().map_err(|e| to_js_error(&e))?;
        result
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsImageCrop {
    pub(crate) fn with_config(config: CropConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(ImageCrop::new(config, store.clone()));

        let mut registry = ChannelRegistry::new();
        ImageCropPlugin::register(&mut registry, engine);
        Self { registry, store }
    }
}

fn to_js_error(err: &PluginError) -> JsValue {
    let error = js_sys::Error::new(&err.message);
    // Setting a property on a fresh Error object cannot fail
    let _ = js_sys::Reflect::set(&error, &JsValue::from_str("code"), &JsValue::from_str(&err.code));
    error.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_registers_channel() {
        let host = JsImageCrop::with_config(CropConfig::default());
        assert_eq!(host.registry.channels(), vec![CHANNEL_NAME]);
        assert_eq!(host.file_count(), 0);
    }

    #[test]
    fn test_put_and_take_file() {
        let host = JsImageCrop::with_config(CropConfig::default());
        host.put_file("a.jpg", vec![1, 2, 3]);

        assert_eq!(host.file_count(), 1);
        assert_eq!(host.take_file("a.jpg"), Some(vec![1, 2, 3]));
        assert_eq!(host.take_file("a.jpg"), None);
    }

    #[test]
    fn test_registry_crops_stored_file() {
        let host = JsImageCrop::with_config(CropConfig::default());
        let png = imagecrop::encode::encode_png(&vec![200u8; 20 * 10 * 3], 20, 10).unwrap();
        host.put_file("src.png", png);

        let outcome = host.registry.invoke(
            CHANNEL_NAME,
            "cropImage",
            serde_json::json!({"path": "src.png", "left": 0.0, "top": 0.0, "right": 0.5, "bottom": 1.0}),
        );

        let path = outcome.into_result().unwrap();
        let jpeg = host.take_file(path.as_str().unwrap()).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }
}
