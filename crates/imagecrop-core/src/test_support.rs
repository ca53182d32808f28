//! Shared fixtures for unit tests.

use crate::decode::DecodedImage;
use crate::encode::{build_tiff_with_orientation, encode_jpeg, encode_png, insert_exif_segment};

/// Gradient image: red follows x, green follows y, blue is constant.
pub fn gradient_image(width: u32, height: u32) -> DecodedImage {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push(((x * 255) / width.max(1)) as u8);
            pixels.push(((y * 255) / height.max(1)) as u8);
            pixels.push(128);
        }
    }
    DecodedImage::new(width, height, pixels)
}

pub fn encode_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = gradient_image(width, height);
    encode_jpeg(&img.pixels, width, height, 95).unwrap()
}

pub fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = gradient_image(width, height);
    encode_png(&img.pixels, width, height).unwrap()
}

/// Attach an EXIF block carrying only `orientation` to a JPEG stream.
pub fn with_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let tiff = build_tiff_with_orientation(&[], orientation, false).unwrap();
    insert_exif_segment(jpeg, &tiff).unwrap()
}
