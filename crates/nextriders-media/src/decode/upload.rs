//! Upload decoding with format sniffing and EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, Orientation, SourceImage};

/// Decode an uploaded image of any supported format.
///
/// The format is sniffed from the leading bytes, never from a file name, so
/// a PNG uploaded as `photo.jpg` decodes correctly. The EXIF orientation is
/// read and recorded but not applied; see [`apply_orientation`].
///
/// # Errors
///
/// Returns `DecodeError::Empty` for zero-length input,
/// `DecodeError::InvalidFormat` if no decoder recognizes the bytes, and
/// `DecodeError::CorruptedFile` if the recognized decoder fails.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;
    let image = reader.decode().map_err(map_image_error)?;

    Ok(SourceImage {
        image,
        format,
        orientation: get_orientation(bytes),
    })
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        ImageError::Limits(e) => DecodeError::ImageTooLarge(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

/// Extract EXIF orientation from upload bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
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

/// Apply an EXIF orientation transformation to an image.
pub fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
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
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode_as(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png_rgba() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 128]));
        let bytes = encode_as(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let source = decode_image(&bytes).unwrap();
        assert_eq!(source.format, ImageFormat::Png);
        assert_eq!(source.dimensions(), (3, 2));
        assert!(source.image.color().has_alpha());
        assert_eq!(source.orientation, Orientation::Normal);
    }

    #[test]
    fn test_decode_jpeg() {
        let img = RgbImage::from_pixel(8, 8, Rgb([200, 100, 50]));
        let bytes = encode_as(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg);

        let source = decode_image(&bytes).unwrap();
        assert_eq!(source.format, ImageFormat::Jpeg);
        assert_eq!(source.dimensions(), (8, 8));
    }

    #[test]
    fn test_decode_ignores_misleading_content() {
        // BMP bytes are sniffed from the header regardless of caller naming
        let img = RgbImage::from_pixel(5, 4, Rgb([1, 2, 3]));
        let bytes = encode_as(DynamicImage::ImageRgb8(img), ImageFormat::Bmp);

        let source = decode_image(&bytes).unwrap();
        assert_eq!(source.format, ImageFormat::Bmp);
        assert_eq!(source.dimensions(), (5, 4));
    }

    #[test]
    fn test_decode_gif_webp_tiff() {
        let rgba = RgbaImage::from_fn(6, 5, |x, y| Rgba([x as u8 * 40, y as u8 * 50, 90, 255]));
        for format in [ImageFormat::Gif, ImageFormat::WebP, ImageFormat::Tiff] {
            let bytes = encode_as(DynamicImage::ImageRgba8(rgba.clone()), format);

            let source = decode_image(&bytes).unwrap();
            assert_eq!(source.format, format);
            assert_eq!(source.dimensions(), (6, 5));
        }
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_decode_garbage_bytes() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let img = RgbImage::from_pixel(16, 16, Rgb([9, 9, 9]));
        let bytes = encode_as(DynamicImage::ImageRgb8(img), ImageFormat::Png);

        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_extraction_invalid_data() {
        assert_eq!(get_orientation(&[0x00, 0x01, 0x02]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_normal() {
        let pixels = vec![
            255, 0, 0, // Red
            0, 255, 0, // Green
            0, 0, 255, // Blue
            255, 255, 0, // Yellow
        ];
        let img = DynamicImage::ImageRgb8(RgbImage::from_raw(2, 2, pixels).unwrap());

        let result = apply_orientation(img, Orientation::Normal).into_rgb8();
        assert_eq!(result.dimensions(), (2, 2));
        assert_eq!(result.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        let pixels = vec![255, 0, 0, 0, 255, 0];
        let img = DynamicImage::ImageRgb8(RgbImage::from_raw(2, 1, pixels).unwrap());

        let result = apply_orientation(img, Orientation::Rotate90CW).into_rgb8();
        assert_eq!(result.dimensions(), (1, 2));
        assert_eq!(result.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let pixels = vec![255, 0, 0, 0, 255, 0];
        let img = DynamicImage::ImageRgb8(RgbImage::from_raw(2, 1, pixels).unwrap());

        let result = apply_orientation(img, Orientation::FlipHorizontal).into_rgb8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 0, 0]);
    }
}
