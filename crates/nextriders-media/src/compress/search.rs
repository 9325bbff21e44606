//! The bounded quality/size search.
//!
//! Quality is lowered first since it is the cheaper lever. Once quality has
//! fallen to the resize threshold and the output still does not fit, the
//! raster is shrunk and quality restarts at the reset value. Every encode
//! starts from the current raster, never from a previous JPEG.

use log::{debug, warn};

use super::CompressionPolicy;
use crate::decode::{shrink, RgbRaster};
use crate::encode::{encode_raster, EncodeError};

/// One encoder pass, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeAttempt {
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    /// Encoded length in bytes.
    pub bytes: usize,
}

/// Result of a search: the last encode plus the trail that led to it.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub data: Vec<u8>,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub shrinks: u32,
    pub attempts: Vec<EncodeAttempt>,
}

/// Find the highest-quality encoding of `raster` that fits `policy.max_bytes`.
///
/// Never fails for size. When quality reaches `policy.min_quality` with the
/// output still over the ceiling, the last encode is returned as is.
///
/// # Errors
///
/// Only encoder failures propagate.
pub fn search(raster: RgbRaster, policy: &CompressionPolicy) -> Result<SearchResult, EncodeError> {
    let mut raster = raster;
    let mut attempts = Vec::new();
    let mut shrinks = 0u32;

    let mut quality = policy.initial_quality;
    let mut data = encode_attempt(&raster, quality, &mut attempts)?;

    while data.len() > policy.max_bytes && quality > policy.min_quality {
        quality = quality
            .saturating_sub(policy.quality_step)
            .max(policy.min_quality);
        data = encode_attempt(&raster, quality, &mut attempts)?;

        if quality <= policy.resize_quality_threshold
            && data.len() > policy.max_bytes
            && shrinks < policy.max_shrinks
        {
            let (from_width, from_height) = raster.dimensions();
            raster = shrink(&raster, policy.shrink_factor);
            shrinks += 1;
            debug!(
                "shrunk {}x{} -> {}x{} (shrink {}), quality reset to {}",
                from_width,
                from_height,
                raster.width(),
                raster.height(),
                shrinks,
                policy.reset_quality
            );

            quality = policy.reset_quality;
            data = encode_attempt(&raster, quality, &mut attempts)?;
        }
    }

    if data.len() > policy.max_bytes {
        warn!(
            "size constraint unmet: {} bytes > {} byte ceiling at quality {} ({}x{}), returning best effort",
            data.len(),
            policy.max_bytes,
            quality,
            raster.width(),
            raster.height()
        );
    }

    Ok(SearchResult {
        data,
        quality,
        width: raster.width(),
        height: raster.height(),
        shrinks,
        attempts,
    })
}

fn encode_attempt(
    raster: &RgbRaster,
    quality: u8,
    attempts: &mut Vec<EncodeAttempt>,
) -> Result<Vec<u8>, EncodeError> {
    let data = encode_raster(raster, quality)?;
    debug!(
        "encoded {}x{} at quality {}: {} bytes",
        raster.width(),
        raster.height(),
        quality,
        data.len()
    );
    attempts.push(EncodeAttempt {
        quality,
        width: raster.width(),
        height: raster.height(),
        bytes: data.len(),
    });
    Ok(data)
}
