//! ImageCrop Core - crop and sample engine behind the `image_crop` method channel
//!
//! This crate decodes JPEG and PNG photos, crops them by a normalized area,
//! downsamples them for previews, and encodes the result into a new file
//! while carrying the source EXIF metadata.
//!
//! The pipeline is stateless: bytes → [`decode`] → [`transform`] → [`encode`]
//! → bytes. [`ImageCrop`] wires it to a [`FileStore`], and
//! [`ImageCropPlugin`] exposes it over the method channel.

pub mod config;
pub mod decode;
pub mod encode;
pub mod engine;
pub mod plugin;
pub mod store;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, CropConfig};
pub use decode::{DecodeError, DecodedImage, FilterType, ImageOptions, Orientation};
pub use encode::{EncodeError, OutputFormat};
pub use engine::{EncodedImage, EngineError, ImageCrop};
pub use plugin::{
    ChannelRegistry, ImageCropPlugin, MethodCall, MethodCallHandler, MethodInvocation,
    MethodOutcome, PluginError, PluginRegistrar, CHANNEL_NAME,
};
#[cfg(feature = "fs")]
pub use store::FsStore;
pub use store::{FileStore, MemoryStore, StoreError};
pub use transform::{Area, TransformError};

/// Crate version, as reported by the CLI and the WASM bindings.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
