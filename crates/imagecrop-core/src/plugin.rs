//! Method-channel front end for the crop engine.
//!
//! A host hands each incoming call to a [`MethodCallHandler`] registered under
//! a channel name. [`ImageCropPlugin`] is the handler for [`CHANNEL_NAME`]: it
//! parses the call, forwards it to [`ImageCrop`] and maps the result or the
//! error onto a [`MethodOutcome`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{EngineError, ImageCrop};
use crate::transform::Area;

/// Channel the plugin listens on.
pub const CHANNEL_NAME: &str = "plugins.lykhonis.com/image_crop";

/// A raw call as it arrives from the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInvocation {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodInvocation {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CropImageArgs {
    pub path: String,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl CropImageArgs {
    pub fn area(&self) -> Area {
        Area::new(self.left, self.top, self.right, self.bottom)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleImageArgs {
    pub path: String,
    pub maximum_width: u32,
    pub maximum_height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathArgs {
    pub path: String,
}

/// A recognized, fully parsed channel call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodCall {
    CropImage(CropImageArgs),
    SampleImage(SampleImageArgs),
    GetImageOptions(PathArgs),
    RequestPermissions,
}

impl MethodCall {
    /// Parse a call by method name.
    ///
    /// Returns `Ok(None)` for methods this channel does not implement.
    pub fn parse(method: &str, arguments: &Value) -> Result<Option<Self>, PluginError> {
        let call = match method {
            "cropImage" => MethodCall::CropImage(parse_args(method, arguments)?),
            "sampleImage" => MethodCall::SampleImage(parse_args(method, arguments)?),
            "getImageOptions" => MethodCall::GetImageOptions(parse_args(method, arguments)?),
            "requestPermissions" => MethodCall::RequestPermissions,
            _ => return Ok(None),
        };
        Ok(Some(call))
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            MethodCall::CropImage(_) => "cropImage",
            MethodCall::SampleImage(_) => "sampleImage",
            MethodCall::GetImageOptions(_) => "getImageOptions",
            MethodCall::RequestPermissions => "requestPermissions",
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    method: &str,
    arguments: &Value,
) -> Result<T, PluginError> {
    T::deserialize(arguments)
        .map_err(|e| PluginError::invalid(format!("Invalid arguments for {}: {}", method, e)))
}

/// Error reported back over the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct PluginError {
    pub code: String,
    pub message: String,
}

impl PluginError {
    /// Bad arguments, or an image that could not be processed.
    pub const INVALID: &'static str = "INVALID";
    /// The source could not be read or the result could not be written.
    pub const IO: &'static str = "IO";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID, message)
    }
}

impl From<EngineError> for PluginError {
    fn from(err: EngineError) -> Self {
        let code = match err {
            EngineError::Store(_) => Self::IO,
            _ => Self::INVALID,
        };
        Self::new(code, err.to_string())
    }
}

/// What a handler answers to a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodOutcome {
    Success { result: Value },
    Error(PluginError),
    NotImplemented,
}

impl MethodOutcome {
    pub fn success(result: impl Into<Value>) -> Self {
        MethodOutcome::Success {
            result: result.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodOutcome::Success { .. })
    }

    /// Convert into a `Result`, treating an unimplemented method as an error.
    pub fn into_result(self) -> Result<Value, PluginError> {
        match self {
            MethodOutcome::Success { result } => Ok(result),
            MethodOutcome::Error(e) => Err(e),
            MethodOutcome::NotImplemented => {
                Err(PluginError::new("NOT_IMPLEMENTED", "Method not implemented"))
            }
        }
    }
}

impl From<Result<Value, PluginError>> for MethodOutcome {
    fn from(result: Result<Value, PluginError>) -> Self {
        match result {
            Ok(result) => MethodOutcome::Success { result },
            Err(e) => MethodOutcome::Error(e),
        }
    }
}

/// Receives calls for one channel.
pub trait MethodCallHandler: Send + Sync {
    fn handle(&self, call: &MethodInvocation) -> MethodOutcome;
}

/// Host side of plugin registration.
pub trait PluginRegistrar {
    fn add_method_call_delegate(&mut self, channel: &str, handler: Box<dyn MethodCallHandler>);
}

/// Handler for [`CHANNEL_NAME`], backed by an [`ImageCrop`] engine.
#[derive(Debug, Clone)]
pub struct ImageCropPlugin {
    engine: Arc<ImageCrop>,
}

impl ImageCropPlugin {
    pub fn new(engine: Arc<ImageCrop>) -> Self {
        Self { engine }
    }

    /// Register a plugin instance on `registrar` under [`CHANNEL_NAME`].
    pub fn register(registrar: &mut dyn PluginRegistrar, engine: Arc<ImageCrop>) {
        registrar.add_method_call_delegate(CHANNEL_NAME, Box::new(Self::new(engine)));
        tracing::debug!(channel = CHANNEL_NAME, "registered image crop plugin");
    }

    pub fn engine(&self) -> &ImageCrop {
        &self.engine
    }

    fn dispatch(&self, call: MethodCall) -> Result<Value, PluginError> {
        match call {
            MethodCall::CropImage(args) => {
                let path = self.engine.crop_image(&args.path, &args.area(), args.scale)?;
                Ok(Value::String(path))
            }
            MethodCall::SampleImage(args) => {
                let path = self.engine.sample_image(
                    &args.path,
                    args.maximum_width,
                    args.maximum_height,
                )?;
                Ok(Value::String(path))
            }
            MethodCall::GetImageOptions(args) => {
                let options = self.engine.image_options(&args.path)?;
                serde_json::to_value(options).map_err(|e| PluginError::invalid(e.to_string()))
            }
            MethodCall::RequestPermissions => Ok(Value::Bool(true)),
        }
    }
}

impl MethodCallHandler for ImageCropPlugin {
    fn handle(&self, call: &MethodInvocation) -> MethodOutcome {
        let parsed = match MethodCall::parse(&call.method, &call.arguments) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                tracing::debug!(method = %call.method, "method not implemented");
                return MethodOutcome::NotImplemented;
            }
            Err(e) => return MethodOutcome::Error(e),
        };

        let method = parsed.method_name();
        let outcome = MethodOutcome::from(self.dispatch(parsed));
        if let MethodOutcome::Error(e) = &outcome {
            tracing::warn!(method, code = %e.code, message = %e.message, "method call failed");
        }
        outcome
    }
}

/// In-process registrar that routes calls by channel name.
#[derive(Default)]
pub struct ChannelRegistry {
    handlers: HashMap<String, Box<dyn MethodCallHandler>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a call to the handler for `channel`.
    pub fn invoke(&self, channel: &str, method: &str, arguments: Value) -> MethodOutcome {
        match self.handlers.get(channel) {
            Some(handler) => handler.handle(&MethodInvocation::new(method, arguments)),
            None => {
                tracing::debug!(channel, "no handler registered");
                MethodOutcome::NotImplemented
            }
        }
    }

    /// Registered channel names, sorted.
    pub fn channels(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PluginRegistrar for ChannelRegistry {
    fn add_method_call_delegate(&mut self, channel: &str, handler: Box<dyn MethodCallHandler>) {
        self.handlers.insert(channel.to_string(), handler);
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.channels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CropConfig;
    use crate::decode::decode_image;
    use crate::store::MemoryStore;
    use crate::test_support::{encode_test_jpeg, encode_test_png};
    use serde_json::json;

    fn registry_with(files: &[(&str, Vec<u8>)]) -> (ChannelRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (name, bytes) in files {
            store.insert(*name, bytes.clone());
        }
        let engine = Arc::new(ImageCrop::new(CropConfig::default(), store.clone()));

        let mut registry = ChannelRegistry::new();
        ImageCropPlugin::register(&mut registry, engine);
        (registry, store)
    }

    #[test]
    fn test_register_uses_channel_name() {
        let (registry, _) = registry_with(&[]);
        assert_eq!(registry.channels(), vec![CHANNEL_NAME]);
    }

    #[test]
    fn test_crop_image_call() {
        let (registry, store) = registry_with(&[("photo.jpg", encode_test_jpeg(64, 48))]);

        let outcome = registry.invoke(
            CHANNEL_NAME,
            "cropImage",
            json!({"path": "photo.jpg", "left": 0.25, "top": 0.0, "right": 0.75, "bottom": 1.0, "scale": 0.5}),
        );

        let path = outcome.into_result().unwrap();
        let path = path.as_str().unwrap();
        let img = decode_image(&store.get(path).unwrap()).unwrap();
        assert_eq!((img.width, img.height), (16, 24));
    }

    #[test]
    fn test_crop_image_scale_defaults_to_one() {
        let (registry, store) = registry_with(&[("photo.png", encode_test_png(20, 10))]);

        let result = registry
            .invoke(
                CHANNEL_NAME,
                "cropImage",
                json!({"path": "photo.png", "left": 0.0, "top": 0.0, "right": 1.0, "bottom": 1.0}),
            )
            .into_result()
            .unwrap();

        let img = decode_image(&store.get(result.as_str().unwrap()).unwrap()).unwrap();
        assert_eq!((img.width, img.height), (20, 10));
    }

    #[test]
    fn test_sample_image_call() {
        let (registry, _) = registry_with(&[("big.png", encode_test_png(300, 200))]);

        let outcome = registry.invoke(
            CHANNEL_NAME,
            "sampleImage",
            json!({"path": "big.png", "maximumWidth": 60, "maximumHeight": 60}),
        );

        let path = outcome.into_result().unwrap();
        assert!(path.as_str().unwrap().starts_with("image_crop_"));
    }

    #[test]
    fn test_get_image_options_call() {
        let (registry, _) = registry_with(&[("a.png", encode_test_png(12, 7))]);

        let outcome = registry.invoke(CHANNEL_NAME, "getImageOptions", json!({"path": "a.png"}));
        assert_eq!(outcome, MethodOutcome::success(json!({"width": 12, "height": 7})));
    }

    #[test]
    fn test_request_permissions_granted() {
        let (registry, _) = registry_with(&[]);
        let outcome = registry.invoke(CHANNEL_NAME, "requestPermissions", Value::Null);
        assert_eq!(outcome, MethodOutcome::success(true));
    }

    #[test]
    fn test_unknown_method_not_implemented() {
        let (registry, _) = registry_with(&[]);
        assert_eq!(
            registry.invoke(CHANNEL_NAME, "rotateImage", json!({})),
            MethodOutcome::NotImplemented
        );
    }

    #[test]
    fn test_unknown_channel_not_implemented() {
        let (registry, _) = registry_with(&[]);
        assert_eq!(
            registry.invoke("other/channel", "cropImage", json!({})),
            MethodOutcome::NotImplemented
        );
    }

    #[test]
    fn test_missing_arguments_are_invalid() {
        let (registry, _) = registry_with(&[]);
        let outcome = registry.invoke(CHANNEL_NAME, "sampleImage", json!({"path": "a.jpg"}));

        match outcome {
            MethodOutcome::Error(e) => {
                assert_eq!(e.code, PluginError::INVALID);
                assert!(e.message.contains("sampleImage"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_area_is_invalid() {
        let (registry, _) = registry_with(&[("a.jpg", encode_test_jpeg(8, 8))]);
        let outcome = registry.invoke(
            CHANNEL_NAME,
            "cropImage",
            json!({"path": "a.jpg", "left": 0.9, "top": 0.0, "right": 0.1, "bottom": 1.0}),
        );
        assert!(matches!(outcome, MethodOutcome::Error(ref e) if e.code == PluginError::INVALID));
    }

    #[test]
    fn test_oversized_crop_is_invalid() {
        let (registry, store) = registry_with(&[("a.jpg", encode_test_jpeg(8, 8))]);
        let outcome = registry.invoke(
            CHANNEL_NAME,
            "cropImage",
            json!({"path": "a.jpg", "left": 0.0, "top": 0.0, "right": 1.0, "bottom": 1.0, "scale": 1e9}),
        );
        assert!(matches!(outcome, MethodOutcome::Error(ref e) if e.code == PluginError::INVALID));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let (registry, _) = registry_with(&[]);
        let outcome = registry.invoke(CHANNEL_NAME, "getImageOptions", json!({"path": "gone.jpg"}));
        assert!(matches!(outcome, MethodOutcome::Error(ref e) if e.code == PluginError::IO));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(MethodOutcome::success("out.jpg")).unwrap();
        assert_eq!(json, json!({"status": "success", "result": "out.jpg"}));

        let json = serde_json::to_value(MethodOutcome::Error(PluginError::invalid("bad"))).unwrap();
        assert_eq!(json, json!({"status": "error", "code": "INVALID", "message": "bad"}));

        let json = serde_json::to_value(MethodOutcome::NotImplemented).unwrap();
        assert_eq!(json, json!({"status": "notImplemented"}));
    }

    #[test]
    fn test_parse_known_methods() {
        let call = MethodCall::parse("getImageOptions", &json!({"path": "x"})).unwrap();
        assert_eq!(
            call,
            Some(MethodCall::GetImageOptions(PathArgs {
                path: "x".to_string()
            }))
        );
        assert_eq!(MethodCall::parse("nope", &Value::Null).unwrap(), None);
    }

    #[test]
    fn test_parse_bad_arguments_is_invalid() {
        let err = MethodCall::parse("sampleImage", &json!({"path": "x", "maximumWidth": "wide"}))
            .unwrap_err();
        assert_eq!(err.code, PluginError::INVALID);
        assert!(err.message.contains("sampleImage"));
    }
}
