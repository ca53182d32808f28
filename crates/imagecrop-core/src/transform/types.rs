//! Crop rectangle and transform errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest RGB8 buffer a transform may allocate, matching the default
/// allocation limit of `image::ImageReader`.
pub const MAX_OUTPUT_BYTES: u64 = 512 * 1024 * 1024;

/// Error types for geometric transforms.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// The crop rectangle is empty, inverted, non-finite or outside `[0, 1]`.
    #[error("Invalid crop area: left={left}, top={top}, right={right}, bottom={bottom}")]
    InvalidArea {
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
    },

    /// Scale must be a finite positive number.
    #[error("Invalid scale: {0}")]
    InvalidScale(f64),

    /// The scaled output would exceed [`MAX_OUTPUT_BYTES`].
    #[error("Output of {width}x{height} pixels exceeds the allocation limit")]
    OutputTooLarge { width: u32, height: u32 },

    /// The source image has no pixels.
    #[error("Source image is empty")]
    EmptyImage,

    /// Resampling failed.
    #[error("Resampling failed: {0}")]
    Resample(String),
}

/// A crop rectangle in normalized coordinates.
///
/// `(0, 0)` is the top-left corner and `(1, 1)` the bottom-right corner of the
/// oriented source image. Edges are given as positions, not sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for Area {
    fn default() -> Self {
        Self::FULL
    }
}

impl Area {
    /// The whole image.
    pub const FULL: Area = Area {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build an area from its top-left corner and normalized size.
    pub fn from_ltwh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Check that every edge is finite, inside `[0, 1]`, and the rectangle is non-empty.
    pub fn validate(&self) -> Result<(), TransformError> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        let valid = in_unit(self.left)
            && in_unit(self.top)
            && in_unit(self.right)
            && in_unit(self.bottom)
            && self.left < self.right
            && self.top < self.bottom;

        if valid {
            Ok(())
        } else {
            Err(TransformError::InvalidArea {
                left: self.left,
                top: self.top,
                right: self.right,
                bottom: self.bottom,
            })
        }
    }

    /// Pixel rectangle `(x, y, width, height)` covered by this area on a
    /// `width x height` image. Edges are floored; the result is clamped to the
    /// image and is never smaller than 1x1.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let to_px = |v: f64, extent: u32| ((v.clamp(0.0, 1.0) * extent as f64).floor() as u32).min(extent);

        let x0 = to_px(self.left, width).min(width.saturating_sub(1));
        let y0 = to_px(self.top, height).min(height.saturating_sub(1));
        let x1 = to_px(self.right, width).max(x0 + 1).min(width.max(1));
        let y1 = to_px(self.bottom, height).max(y0 + 1).min(height.max(1));

        (x0, y0, x1 - x0, y1 - y0)
    }

    /// True when the area covers the whole image.
    pub fn is_full(&self) -> bool {
        self.left <= 0.0 && self.top <= 0.0 && self.right >= 1.0 && self.bottom >= 1.0
    }
}
