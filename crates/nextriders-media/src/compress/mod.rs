//! Adaptive compression of uploaded listing photos.
//!
//! Turns arbitrary upload bytes into a JPEG that fits a byte ceiling:
//!
//! 1. Decode (format sniffed from content)
//! 2. Optionally apply EXIF orientation
//! 3. Normalize to opaque RGB (transparency composited on white)
//! 4. Cap the long edge at `max_dimension`
//! 5. Run the quality/size search
//!
//! The whole pipeline is synchronous, allocation-only and free of shared
//! state, so concurrent callers need no coordination. It is CPU-bound; run
//! it off any latency-sensitive thread.
//!
//! # Examples
//!
//! ```ignore
//! use nextriders_media::compress::compress_upload;
//!
//! let upload = std::fs::read("IMG_0042.png").unwrap();
//! let stored = compress_upload(&upload, None).unwrap();
//! if !stored.within_budget() {
//!     log::warn!("stored oversized photo: {} bytes", stored.len());
//! }
//! std::fs::write("0.jpg", stored.data()).unwrap();
//! ```

mod policy;
mod search;

pub use policy::{CompressionPolicy, PolicyError, DEFAULT_MAX_BYTES, DEFAULT_MAX_DIMENSION};
pub use search::{search, EncodeAttempt, SearchResult};

use image::ImageFormat;
use log::debug;
use thiserror::Error;

use crate::decode::{apply_orientation, cap_long_edge, decode_image, DecodeError, Orientation};
use crate::encode::EncodeError;
use crate::normalize::Normalization;

/// Errors from the compression pipeline.
///
/// An over-budget result is not an error; see [`CompressedImage::within_budget`].
#[derive(Debug, Error)]
pub enum CompressError {
    /// The upload is not a readable image. A client error, not retryable.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The encoder failed on a valid raster.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The policy is unusable.
    #[error("invalid compression policy: {0}")]
    Policy(#[from] PolicyError),
}

/// A stored-ready JPEG and how it was produced.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    data: Vec<u8>,
    max_bytes: usize,
    /// Format sniffed from the upload.
    pub source_format: ImageFormat,
    /// Upload dimensions as stored in the file, before orientation.
    pub source_width: u32,
    pub source_height: u32,
    /// Orientation tag found in the upload.
    pub orientation: Orientation,
    /// Strategy used to reach RGB.
    pub normalization: Normalization,
    /// Output dimensions.
    pub width: u32,
    pub height: u32,
    /// Quality of the returned encode.
    pub quality: u8,
    pub shrinks: u32,
    /// Every encode performed, in order.
    pub attempts: Vec<EncodeAttempt>,
}

impl CompressedImage {
    /// The JPEG bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the output fits the ceiling it was compressed against.
    pub fn within_budget(&self) -> bool {
        self.data.len() <= self.max_bytes
    }

    /// The ceiling the search targeted.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

/// Compress an upload with the default policy and an optional ceiling override.
pub fn compress_upload(
    bytes: &[u8],
    max_bytes: Option<usize>,
) -> Result<CompressedImage, CompressError> {
    let policy = max_bytes
        .map(CompressionPolicy::with_max_bytes)
        .unwrap_or_default();
    compress(bytes, &policy)
}

/// Compress an upload under an explicit policy.
///
/// # Errors
///
/// `CompressError::Policy` if the policy fails validation (checked before
/// decoding), `CompressError::Decode` for unreadable input, and
/// `CompressError::Encode` if the encoder fails.
pub fn compress(bytes: &[u8], policy: &CompressionPolicy) -> Result<CompressedImage, CompressError> {
    policy.validate()?;

    let source = decode_image(bytes)?;
    let (source_width, source_height) = source.dimensions();
    debug!(
        "decoded {:?} upload: {}x{} {:?}, {} bytes",
        source.format,
        source_width,
        source_height,
        source.image.color(),
        bytes.len()
    );

    let image = if policy.auto_orient {
        apply_orientation(source.image, source.orientation)
    } else {
        source.image
    };

    let normalization = Normalization::classify(&image);
    let raster = normalization.apply(image);
    let raster = cap_long_edge(&raster, policy.max_dimension);

    let result = search(raster, policy)?;

    Ok(CompressedImage {
        data: result.data,
        max_bytes: policy.max_bytes,
        source_format: source.format,
        source_width,
        source_height,
        orientation: source.orientation,
        normalization,
        width: result.width,
        height: result.height,
        quality: result.quality,
        shrinks: result.shrinks,
        attempts: result.attempts,
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
