//! Core types for upload decoding and raster handling.

use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Error types for upload decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The upload contained no bytes at all.
    #[error("Empty upload")]
    Empty,

    /// The bytes are not in any recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The format was recognized but the data is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image dimensions exceed the decoder's allocation limits.
    #[error("Image too large to decode: {0}")]
    ImageTooLarge(String),
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded upload, still in whatever color mode the source used.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Decoded pixels in the source color mode.
    pub image: DynamicImage,
    /// Format sniffed from the upload bytes.
    pub format: ImageFormat,
    /// EXIF orientation found in the upload, `Normal` when absent.
    pub orientation: Orientation,
}

impl SourceImage {
    /// Width and height as stored in the file.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// An opaque 8-bit RGB raster, the only input the JPEG encoder accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbRaster {
    image: RgbImage,
}

impl RgbRaster {
    /// Wrap an existing RGB buffer.
    pub fn from_rgb_image(image: RgbImage) -> Self {
        Self { image }
    }

    /// Build a raster from raw row-major RGB bytes.
    ///
    /// Returns `None` when `pixels.len() != width * height * 3`.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, pixels).map(Self::from_rgb_image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Row-major RGB bytes (3 bytes per pixel).
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.image
    }
}
