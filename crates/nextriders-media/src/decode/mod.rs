//! Upload decoding and raster resizing.
//!
//! This module provides functionality for:
//! - Decoding uploads of any common format (JPEG, PNG, GIF, WebP, BMP, TIFF)
//! - Reading and applying EXIF orientation
//! - Capping the long edge of a raster and shrinking it uniformly
//!
//! # Examples
//!
//! ```ignore
//! use nextriders_media::decode::decode_image;
//!
//! let bytes = std::fs::read("upload.png").unwrap();
//! let source = decode_image(&bytes).unwrap();
//! println!("Decoded {:?} {}x{}", source.format, source.image.width(), source.image.height());
//! ```

mod resize;
mod types;
mod upload;

pub use resize::{
    cap_long_edge, capped_dimensions, resize, shrink, shrunk_dimensions, RESAMPLE_FILTER,
};
pub use types::{DecodeError, Orientation, RgbRaster, SourceImage};
pub use upload::{apply_orientation, decode_image, get_orientation};
