//! JPEG encoding for stored listing photos.
//!
//! Encoding goes through the `image` crate's baseline JPEG encoder, the same
//! codec family that decodes uploads, so every stored photo reads back
//! through `image::load_from_memory`. Repeated encodes of the same raster at
//! the same quality are byte-identical.
//!
//! # Examples
//!
//! ```ignore
//! use nextriders_media::encode::encode_jpeg;
//!
//! let pixels = vec![128u8; 100 * 100 * 3]; // Gray image
//! let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 80).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, encode_raster, EncodeError, MAX_JPEG_DIMENSION};
