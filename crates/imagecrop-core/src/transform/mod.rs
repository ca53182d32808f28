//! Geometric transforms: crop, scale, rotation and orientation.
//!
//! Every transform takes a `DecodedImage` by reference and returns a new one.
//!
//! # Coordinate System
//!
//! - Crop coordinates are normalized (0.0 to 1.0) relative to image dimensions
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Origin is top-left corner

mod crop;
mod rotation;
mod types;

pub use crop::{apply_crop, crop};
pub use rotation::{apply_orientation, apply_rotation, compute_rotated_bounds};
pub use types::{Area, TransformError, MAX_OUTPUT_BYTES};
