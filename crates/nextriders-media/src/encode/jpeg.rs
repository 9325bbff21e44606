//! Baseline JPEG encoding for stored listing photos.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::decode::RgbRaster;

/// Largest width or height a JPEG frame header can hold.
pub const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero or beyond what a JPEG frame header can hold
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be within 1..=65535")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality, clamped to 1-100
///
/// The output is a baseline, unsubsampled JFIF stream with the standard
/// Huffman tables and no metadata. Identical inputs give identical bytes.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if !frame_dimension_ok(width) || !frame_dimension_ok(height) {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn frame_dimension_ok(value: u32) -> bool {
    (1..=MAX_JPEG_DIMENSION).contains(&value)
}

/// Encode an [`RgbRaster`] to JPEG bytes.
pub fn encode_raster(raster: &RgbRaster, quality: u8) -> Result<Vec<u8>, EncodeError> {
    encode_jpeg(raster.pixels(), raster.width(), raster.height(), quality)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
