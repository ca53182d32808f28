//! Image decoding stage of the crop pipeline.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG byte streams into RGB pixel buffers
//! - Reading EXIF orientation and applying it during decode
//! - Reading oriented image dimensions without a full decode
//! - Resampling, including cover-sampling of large photos for previews
//!
//! # Examples
//!
//! ```ignore
//! use imagecrop::decode::{decode_image, read_image_options};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let options = read_image_options(&bytes).unwrap();
//! let image = decode_image(&bytes).unwrap();
//! assert_eq!((image.width, image.height), (options.width, options.height));
//! ```

mod decoder;
mod sample;
mod types;

pub(crate) use decoder::apply_orientation;
pub use decoder::{
    decode_image, decode_image_no_orientation, detect_format, get_orientation, read_image_options,
};
pub use sample::{
    calculate_cover_dimensions, calculate_sample_size, resize, resize_to_fit, sample_image,
};
pub use types::{DecodeError, DecodedImage, FilterType, ImageOptions, Orientation};
