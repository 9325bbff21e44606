//! NextRiders Media - listing photo processing
//!
//! This crate turns raw listing photo uploads into stored JPEG assets:
//! decoding any common format, flattening transparency onto white, capping
//! resolution, and searching for the best quality that fits the byte ceiling.
//!
//! It performs no I/O. Callers hand in bytes and get bytes back; naming and
//! persisting the result is their concern.

pub mod compress;
pub mod decode;
pub mod encode;
pub mod normalize;

pub use compress::{
    compress, compress_upload, CompressError, CompressedImage, CompressionPolicy, EncodeAttempt,
    PolicyError,
};
pub use decode::{DecodeError, Orientation, RgbRaster};
pub use encode::EncodeError;
pub use normalize::Normalization;
