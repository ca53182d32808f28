//! Image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, ImageOptions, Orientation};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// The format is sniffed from the leading bytes; JPEG and PNG are supported.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a supported image.
/// Returns `DecodeError::CorruptedFile` if the image data is corrupted.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = decode_dynamic(bytes)?;

    let oriented = apply_orientation(img, orientation);
    let decoded = DecodedImage::from_rgb_image(oriented.into_rgb8());

    tracing::debug!(
        width = decoded.width,
        height = decoded.height,
        ?orientation,
        "decoded image"
    );
    Ok(decoded)
}

/// Decode an image from bytes without applying EXIF orientation.
///
/// Use this when the caller handles orientation separately.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = decode_dynamic(bytes)?;
    Ok(DecodedImage::from_rgb_image(img.into_rgb8()))
}

/// Read the oriented dimensions of an image without decoding its pixels.
///
/// Only the container header is parsed, so this stays cheap for large photos.
pub fn read_image_options(bytes: &[u8]) -> Result<ImageOptions, DecodeError> {
    let reader = guessed_reader(bytes)?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let (width, height) = extract_orientation(bytes).orient_dimensions(width, height);
    Ok(ImageOptions::new(width, height))
}

/// Extract EXIF orientation value from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or the value
/// cannot be read.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

/// Detect a supported container format from the leading bytes.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Some(format),
        _ => None,
    }
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    let format = detect_format(bytes).ok_or(DecodeError::InvalidFormat)?;
    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format);
    Ok(reader)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    guessed_reader(bytes)?
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
pub(crate) fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encode_test_jpeg, encode_test_png, with_orientation};

    #[test]
    fn test_decode_jpeg() {
        let bytes = encode_test_jpeg(16, 8);
        let img = decode_image(&bytes).unwrap();

        assert_eq!(img.width, 16);
        assert_eq!(img.height, 8);
        assert_eq!(img.pixels.len(), 16 * 8 * 3);
    }

    #[test]
    fn test_decode_png_is_lossless() {
        let bytes = encode_test_png(4, 3);
        let img = decode_image(&bytes).unwrap();

        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img, crate::test_support::gradient_image(4, 3));
    }

    #[test]
    fn test_decode_no_orientation_keeps_stored_layout() {
        let bytes = with_orientation(&encode_test_jpeg(20, 10), 6);
        let img = decode_image_no_orientation(&bytes).unwrap();
        assert_eq!((img.width, img.height), (20, 10));
    }

    #[test]
    fn test_decode_applies_orientation() {
        let bytes = with_orientation(&encode_test_jpeg(20, 10), 6);
        let img = decode_image(&bytes).unwrap();
        assert_eq!((img.width, img.height), (10, 20));
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(decode_image(&[]).is_err());
    }

    #[test]
    fn test_decode_truncated_jpeg() {
        let bytes = encode_test_jpeg(32, 32);
        assert!(decode_image(&bytes[..20]).is_err());
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = encode_test_png(32, 32);
        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_read_image_options() {
        let bytes = encode_test_png(30, 12);
        assert_eq!(read_image_options(&bytes).unwrap(), ImageOptions::new(30, 12));
    }

    #[test]
    fn test_read_image_options_swaps_for_rotated_exif() {
        let bytes = with_orientation(&encode_test_jpeg(30, 12), 8);
        assert_eq!(read_image_options(&bytes).unwrap(), ImageOptions::new(12, 30));
    }

    #[test]
    fn test_read_image_options_rejects_garbage() {
        assert!(matches!(
            read_image_options(b"not an image"),
            Err(DecodeError::InvalidFormat)
        ));
    }

    #[test]
    fn test_orientation_extraction_no_exif() {
        assert_eq!(get_orientation(&encode_test_jpeg(2, 2)), Orientation::Normal);
    }

    #[test]
    fn test_orientation_extraction_invalid_data() {
        assert_eq!(get_orientation(&[0x00, 0x01, 0x02]), Orientation::Normal);
    }

    #[test]
    fn test_orientation_extraction_from_exif() {
        let bytes = with_orientation(&encode_test_jpeg(2, 2), 3);
        assert_eq!(get_orientation(&bytes), Orientation::Rotate180);
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&encode_test_jpeg(1, 1)), Some(ImageFormat::Jpeg));
        assert_eq!(detect_format(&encode_test_png(1, 1)), Some(ImageFormat::Png));
        assert_eq!(detect_format(b"GIF89a"), None);
    }

    #[test]
    fn test_apply_orientation_rotate180() {
        let pixels = vec![
            255, 0, 0, // Red (left)
            0, 255, 0, // Green (right)
        ];
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_raw(2, 1, pixels).unwrap());

        let result = apply_orientation(img, Orientation::Rotate180).into_rgb8();

        assert_eq!(result.dimensions(), (2, 1));
        assert_eq!(result.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_transpose_swaps() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(3, 1));
        let result = apply_orientation(img, Orientation::Transpose);
        assert_eq!((result.width(), result.height()), (1, 3));
    }
}
