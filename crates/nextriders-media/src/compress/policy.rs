//! Compression policy: the knobs of the quality/size search.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::MAX_JPEG_DIMENSION;

/// Default output ceiling: 500 KiB.
pub const DEFAULT_MAX_BYTES: usize = 500 * 1024;
/// Default cap on the long edge of the stored photo.
pub const DEFAULT_MAX_DIMENSION: u32 = 1600;

/// Errors raised by [`CompressionPolicy::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("max_bytes must be greater than zero")]
    ZeroCeiling,

    #[error("max_dimension must be greater than zero")]
    ZeroDimension,

    #[error("max_dimension must be at most 65535, got {0}")]
    DimensionTooLarge(u32),

    #[error("quality_step must be greater than zero")]
    ZeroStep,

    #[error("{name} must be within 1..=100, got {value}")]
    QualityOutOfRange { name: &'static str, value: u8 },

    #[error("shrink_factor must be strictly between 0 and 1, got {0}")]
    InvalidShrinkFactor(f64),

    #[error("quality settings must satisfy min_quality < initial_quality and resize_quality_threshold < reset_quality")]
    InconsistentQualities,
}

/// Settings for the adaptive quality/size search.
///
/// Passed by value into the compressor; there is no global configuration.
/// Deserializes from partial documents, missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionPolicy {
    /// Byte ceiling for the encoded output (inclusive).
    pub max_bytes: usize,
    /// Maximum long-edge length in pixels before the search starts.
    pub max_dimension: u32,
    /// Quality of the first encode.
    pub initial_quality: u8,
    /// Quality decrement per search step.
    pub quality_step: u8,
    /// Once quality drops to or below this and the output is still too big,
    /// the raster is shrunk.
    pub resize_quality_threshold: u8,
    /// Quality restored right after a shrink.
    pub reset_quality: u8,
    /// Uniform scale applied to both edges on each shrink.
    pub shrink_factor: f64,
    /// The search stops once quality reaches this value.
    pub min_quality: u8,
    /// Upper bound on shrinks per image.
    pub max_shrinks: u32,
    /// Apply the EXIF orientation tag before normalizing.
    pub auto_orient: bool,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            initial_quality: 80,
            quality_step: 5,
            resize_quality_threshold: 20,
            reset_quality: 50,
            shrink_factor: 0.8,
            min_quality: 10,
            max_shrinks: 8,
            auto_orient: false,
        }
    }
}

impl CompressionPolicy {
    /// Default policy with a different byte ceiling.
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Check that the settings describe a terminating, meaningful search.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_bytes == 0 {
            return Err(PolicyError::ZeroCeiling);
        }
        if self.max_dimension == 0 {
            return Err(PolicyError::ZeroDimension);
        }
        if self.max_dimension > MAX_JPEG_DIMENSION {
            return Err(PolicyError::DimensionTooLarge(self.max_dimension));
        }
        if self.quality_step == 0 {
            return Err(PolicyError::ZeroStep);
        }

        for (name, value) in [
            ("initial_quality", self.initial_quality),
            ("resize_quality_threshold", self.resize_quality_threshold),
            ("reset_quality", self.reset_quality),
            ("min_quality", self.min_quality),
        ] {
            if !(1..=100).contains(&value) {
                return Err(PolicyError::QualityOutOfRange { name, value });
            }
        }

        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(PolicyError::InvalidShrinkFactor(self.shrink_factor));
        }

        if self.min_quality >= self.initial_quality
            || self.resize_quality_threshold >= self.reset_quality
        {
            return Err(PolicyError::InconsistentQualities);
        }

        Ok(())
    }

    /// Upper bound on the number of encodes a single search can perform.
    ///
    /// One initial encode, the steps down to the resize threshold, per shrink
    /// one reset encode plus the steps back down to the threshold, and the
    /// final steps from the threshold to `min_quality`.
    pub fn max_encode_attempts(&self) -> u32 {
        let step = u32::from(self.quality_step.max(1));
        let steps_between = |from: u8, to: u8| u32::from(from.saturating_sub(to)).div_ceil(step);

        let to_threshold = steps_between(self.initial_quality, self.resize_quality_threshold).max(1);
        let to_floor = steps_between(self.resize_quality_threshold, self.min_quality);
        let per_shrink = 1 + steps_between(self.reset_quality, self.resize_quality_threshold);

        (1 + to_threshold + to_floor).saturating_add(self.max_shrinks.saturating_mul(per_shrink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_values() {
        let policy = CompressionPolicy::default();
        assert_eq!(policy.max_bytes, 512_000);
        assert_eq!(policy.max_dimension, 1600);
        assert_eq!(policy.initial_quality, 80);
        assert_eq!(policy.quality_step, 5);
        assert_eq!(policy.resize_quality_threshold, 20);
        assert_eq!(policy.reset_quality, 50);
        assert_eq!(policy.shrink_factor, 0.8);
        assert_eq!(policy.min_quality, 10);
        assert!(!policy.auto_orient);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_with_max_bytes() {
        let policy = CompressionPolicy::with_max_bytes(1024);
        assert_eq!(policy.max_bytes, 1024);
        assert_eq!(policy.max_dimension, DEFAULT_MAX_DIMENSION);
    }

    #[test]
    fn test_default_attempt_bound() {
        // 80 + 14 steps to 10, plus 8 shrinks of (50 + 6 steps to 20)
        assert_eq!(CompressionPolicy::default().max_encode_attempts(), 71);
    }

    #[test]
    fn test_attempt_bound_without_shrinks() {
        let mut policy = CompressionPolicy::default();
        policy.max_shrinks = 0;
        assert_eq!(policy.max_encode_attempts(), 15);
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let policy = CompressionPolicy::with_max_bytes(0);
        assert_eq!(policy.validate(), Err(PolicyError::ZeroCeiling));
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let mut policy = CompressionPolicy::default();
        policy.max_dimension = 0;
        assert_eq!(policy.validate(), Err(PolicyError::ZeroDimension));
    }

    #[test]
    fn test_validate_rejects_dimension_beyond_jpeg_frame() {
        let mut policy = CompressionPolicy::default();
        policy.max_dimension = 65_535;
        assert_eq!(policy.validate(), Ok(()));

        policy.max_dimension = 65_536;
        assert_eq!(policy.validate(), Err(PolicyError::DimensionTooLarge(65_536)));
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let mut policy = CompressionPolicy::default();
        policy.quality_step = 0;
        assert_eq!(policy.validate(), Err(PolicyError::ZeroStep));
    }

    #[test]
    fn test_validate_rejects_quality_out_of_range() {
        let mut policy = CompressionPolicy::default();
        policy.initial_quality = 101;
        assert_eq!(
            policy.validate(),
            Err(PolicyError::QualityOutOfRange {
                name: "initial_quality",
                value: 101
            })
        );
    }

    #[test]
    fn test_validate_rejects_shrink_factor() {
        for factor in [0.0, 1.0, 1.5, -0.2, f64::NAN] {
            let mut policy = CompressionPolicy::default();
            policy.shrink_factor = factor;
            assert!(matches!(
                policy.validate(),
                Err(PolicyError::InvalidShrinkFactor(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_inconsistent_qualities() {
        let mut policy = CompressionPolicy::default();
        policy.reset_quality = 20;
        assert_eq!(policy.validate(), Err(PolicyError::InconsistentQualities));

        let mut policy = CompressionPolicy::default();
        policy.min_quality = 80;
        assert_eq!(policy.validate(), Err(PolicyError::InconsistentQualities));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let policy: CompressionPolicy =
            serde_json::from_str(r#"{"max_bytes": 204800, "auto_orient": true}"#).unwrap();
        assert_eq!(policy.max_bytes, 204_800);
        assert!(policy.auto_orient);
        assert_eq!(policy.initial_quality, 80);
        assert_eq!(policy.max_dimension, 1600);
    }
}
