//! Carrying EXIF metadata from the source photo into the encoded JPEG.
//!
//! The output pixels are already upright, so the copied block always says
//! `Orientation = 1`. Tags describing the stored pixel layout (dimensions,
//! strip and thumbnail offsets) no longer match the new image and are dropped.

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};

use super::EncodeError;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// Largest payload a single JPEG segment can carry (length field is u16 and counts itself).
const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// Tags that describe the old pixel layout and must not be copied.
const LAYOUT_TAGS: &[Tag] = &[
    Tag::Orientation,
    Tag::ImageWidth,
    Tag::ImageLength,
    Tag::PixelXDimension,
    Tag::PixelYDimension,
    Tag::StripOffsets,
    Tag::StripByteCounts,
    Tag::RowsPerStrip,
    Tag::TileOffsets,
    Tag::TileByteCounts,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::MakerNote,
];

/// Copy the primary EXIF fields of `source` into `encoded_jpeg`.
///
/// Returns `encoded_jpeg` untouched when the source carries no EXIF or the
/// block cannot be rebuilt; the image itself is never lost over metadata.
pub fn carry_metadata(source: &[u8], encoded_jpeg: Vec<u8>) -> Vec<u8> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(source)) {
        Ok(exif) => exif,
        Err(_) => return encoded_jpeg,
    };

    let fields: Vec<&Field> = exif
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY && !LAYOUT_TAGS.contains(&f.tag))
        .collect();

    let result = build_tiff(&fields, exif.little_endian())
        .and_then(|tiff| insert_exif_segment(&encoded_jpeg, &tiff));

    match result {
        Ok(with_exif) => {
            tracing::debug!(fields = fields.len(), "carried EXIF metadata");
            with_exif
        }
        Err(e) => {
            tracing::warn!(error = %e, "dropping EXIF metadata");
            encoded_jpeg
        }
    }
}

/// Serialize `fields` plus an upright orientation into a TIFF-structured EXIF block.
pub(crate) fn build_tiff(fields: &[&Field], little_endian: bool) -> Result<Vec<u8>, EncodeError> {
    build_tiff_with_orientation(fields, 1, little_endian)
}

pub(crate) fn build_tiff_with_orientation(
    fields: &[&Field],
    orientation: u16,
    little_endian: bool,
) -> Result<Vec<u8>, EncodeError> {
    let orientation = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation]),
    };

    let mut writer = Writer::new();
    writer.push_field(&orientation);
    for field in fields {
        writer.push_field(field);
    }

    let mut buffer = Cursor::new(Vec::new());
    writer
        .write(&mut buffer, little_endian)
        .map_err(|e| EncodeError::Metadata(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Insert an APP1 Exif segment holding `tiff` into a JPEG stream.
///
/// The segment goes after a leading JFIF APP0 segment when there is one,
/// otherwise directly after SOI.
pub(crate) fn insert_exif_segment(jpeg: &[u8], tiff: &[u8]) -> Result<Vec<u8>, EncodeError> {
    if jpeg.len() < 4 || jpeg[..2] != SOI {
        return Err(EncodeError::Metadata("not a JPEG stream".to_string()));
    }

    let payload_len = EXIF_HEADER.len() + tiff.len();
    if payload_len > MAX_SEGMENT_PAYLOAD {
        return Err(EncodeError::Metadata(format!(
            "EXIF block too large: {} bytes",
            payload_len
        )));
    }

    let mut insert_at = 2;
    if jpeg[2] == 0xFF && jpeg[3] == APP0 && jpeg.len() >= 6 {
        let app0_len = u16::from_be_bytes([jpeg[4], jpeg[5]]) as usize;
        if 4 + app0_len <= jpeg.len() {
            insert_at = 4 + app0_len;
        }
    }

    let segment_len = (payload_len + 2) as u16;
    let mut output = Vec::with_capacity(jpeg.len() + payload_len + 4);
    output.extend_from_slice(&jpeg[..insert_at]);
    output.extend_from_slice(&[0xFF, APP1]);
    output.extend_from_slice(&segment_len.to_be_bytes());
    output.extend_from_slice(EXIF_HEADER);
    output.extend_from_slice(tiff);
    output.extend_from_slice(&jpeg[insert_at..]);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_image, get_orientation, Orientation};
    use crate::test_support::{encode_test_jpeg, with_orientation};

    fn read_exif(bytes: &[u8]) -> exif::Exif {
        Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .unwrap()
    }

    fn source_with_make(orientation: u16) -> Vec<u8> {
        let make = Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"Acme".to_vec()]),
        };
        let width = Field {
            tag: Tag::PixelXDimension,
            ifd_num: In::PRIMARY,
            value: Value::Long(vec![4000]),
        };
        let tiff = build_tiff_with_orientation(&[&make, &width], orientation, true).unwrap();
        insert_exif_segment(&encode_test_jpeg(8, 4), &tiff).unwrap()
    }

    #[test]
    fn test_carry_copies_fields_and_resets_orientation() {
        let source = source_with_make(6);
        let output = carry_metadata(&source, encode_test_jpeg(4, 8));

        let exif = read_exif(&output);
        let make = exif.get_field(Tag::Make, In::PRIMARY).unwrap();
        assert!(matches!(&make.value, Value::Ascii(v) if v[0] == b"Acme"));
        assert_eq!(get_orientation(&output), Orientation::Normal);
        assert!(exif.get_field(Tag::PixelXDimension, In::PRIMARY).is_none());
    }

    #[test]
    fn test_carry_without_source_exif_is_noop() {
        let encoded = encode_test_jpeg(4, 4);
        let output = carry_metadata(&encode_test_jpeg(2, 2), encoded.clone());
        assert_eq!(output, encoded);
    }

    #[test]
    fn test_carry_onto_non_jpeg_is_noop() {
        let source = source_with_make(1);
        let output = carry_metadata(&source, b"plain".to_vec());
        assert_eq!(output, b"plain".to_vec());
    }

    #[test]
    fn test_output_still_decodes() {
        let source = with_orientation(&encode_test_jpeg(6, 3), 8);
        let output = carry_metadata(&source, encode_test_jpeg(6, 3));

        let img = decode_image(&output).unwrap();
        assert_eq!((img.width, img.height), (6, 3));
    }

    #[test]
    fn test_insert_after_app0() {
        let jpeg = encode_test_jpeg(2, 2);
        // The image crate writes a JFIF APP0 segment right after SOI
        assert_eq!(jpeg[3], APP0);
        let app0_end = 4 + u16::from_be_bytes([jpeg[4], jpeg[5]]) as usize;

        let output = insert_exif_segment(&jpeg, &[0x49, 0x49, 0x2A, 0x00]).unwrap();
        assert_eq!(&output[app0_end..app0_end + 2], &[0xFF, APP1]);
        assert_eq!(&output[app0_end + 4..app0_end + 10], EXIF_HEADER);
    }

    #[test]
    fn test_insert_rejects_oversized_block() {
        let jpeg = encode_test_jpeg(2, 2);
        let huge = vec![0u8; MAX_SEGMENT_PAYLOAD];
        assert!(matches!(
            insert_exif_segment(&jpeg, &huge),
            Err(EncodeError::Metadata(_))
        ));
    }
}
