//! Downsample factor selection ahead of a full decode.
//!
//! A decoder that supports subsampling produces an image of roughly
//! `intrinsic / factor` pixels per side. Picking the factor before decoding
//! bounds peak memory for very large sources.
//!
//! Two conventions exist and callers may rely on either, so the policy is an
//! explicit parameter:
//!
//! - [`SamplePolicy::PowerOfTwo`]: halve until both sides fit. Always yields a
//!   power of two, which block-based decoders handle natively.
//! - [`SamplePolicy::NearestRatio`]: rounded ratio of source to target, only
//!   engaged for sources above a fixed size threshold.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sources at or below both of these dimensions are never subsampled under
/// [`SamplePolicy::NearestRatio`].
const RATIO_THRESHOLD_HEIGHT: i32 = 400;
const RATIO_THRESHOLD_WIDTH: i32 = 450;

/// Strategy for computing the downsample factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SamplePolicy {
    /// Repeated halving; the factor is always a power of two.
    #[default]
    PowerOfTwo,
    /// `min(round(h / target_h), round(w / target_w))` above a size threshold.
    NearestRatio,
}

/// Integer downsample factor, always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleSize(u32);

impl SampleSize {
    /// No subsampling.
    pub const ONE: SampleSize = SampleSize(1);

    /// Create a factor, clamping zero up to one.
    pub fn new(factor: u32) -> Self {
        Self(factor.max(1))
    }

    #[inline]
    pub fn factor(self) -> u32 {
        self.0
    }

    pub fn is_power_of_two(self) -> bool {
        self.0.is_power_of_two()
    }

    /// Dimensions a subsampling decoder yields for a `width x height` source.
    ///
    /// Partial blocks at the right/bottom edges still produce a pixel, so each
    /// side is rounded up.
    pub fn apply(self, width: u32, height: u32) -> (u32, u32) {
        (width.div_ceil(self.0), height.div_ceil(self.0))
    }
}

impl Default for SampleSize {
    fn default() -> Self {
        Self::ONE
    }
}

/// Calculate the downsample factor for decoding an image of intrinsic size
/// `intrinsic_w x intrinsic_h` into a `target_w x target_h` box.
///
/// A non-positive target dimension means "no constraint" and yields a factor
/// of 1.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if either intrinsic dimension is not
/// positive.
///
/// # Example
///
/// ```ignore
/// let size = calculate(4000, 3000, 1080, 1920, SamplePolicy::PowerOfTwo)?;
/// assert_eq!(size.factor(), 4);
/// ```
pub fn calculate(
    intrinsic_w: i32,
    intrinsic_h: i32,
    target_w: i32,
    target_h: i32,
    policy: SamplePolicy,
) -> Result<SampleSize> {
    if intrinsic_w <= 0 || intrinsic_h <= 0 {
        return Err(Error::invalid(format!(
            "intrinsic dimensions must be positive, got {intrinsic_w}x{intrinsic_h}"
        )));
    }
    if target_w <= 0 || target_h <= 0 {
        return Ok(SampleSize::ONE);
    }

    let size = match policy {
        SamplePolicy::PowerOfTwo => power_of_two(intrinsic_w, intrinsic_h, target_w, target_h),
        SamplePolicy::NearestRatio => nearest_ratio(intrinsic_w, intrinsic_h, target_w, target_h),
    };
    Ok(size)
}

fn power_of_two(mut w: i32, mut h: i32, target_w: i32, target_h: i32) -> SampleSize {
    let mut factor = 1u32;
    // Terminates: both sides reach 0 within 31 halvings and targets are positive.
    while w > target_w || h > target_h {
        w /= 2;
        h /= 2;
        factor <<= 1;
    }
    SampleSize(factor)
}

fn nearest_ratio(w: i32, h: i32, target_w: i32, target_h: i32) -> SampleSize {
    let over_threshold = h > RATIO_THRESHOLD_HEIGHT || w > RATIO_THRESHOLD_WIDTH;
    if !over_threshold || (h <= target_h && w <= target_w) {
        return SampleSize::ONE;
    }

    let height_ratio = (h as f64 / target_h as f64).round() as u32;
    let width_ratio = (w as f64 / target_w as f64).round() as u32;
    SampleSize::new(height_ratio.min(width_ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_of_two_portrait_target() {
        // 4000x3000 -> 2000x1500 -> 1000x750
        let size = calculate(4000, 3000, 1080, 1920, SamplePolicy::PowerOfTwo).unwrap();
        assert_eq!(size.factor(), 4);
    }

    #[test]
    fn test_power_of_two_already_fits() {
        let size = calculate(800, 600, 1024, 768, SamplePolicy::PowerOfTwo).unwrap();
        assert_eq!(size, SampleSize::ONE);
    }

    #[test]
    fn test_power_of_two_exact_fit_is_one() {
        let size = calculate(1024, 768, 1024, 768, SamplePolicy::PowerOfTwo).unwrap();
        assert_eq!(size.factor(), 1);
    }

    #[test]
    fn test_power_of_two_tiny_target() {
        // 1000 -> 500 -> 250 -> 125 -> 62 -> 31 -> 15 -> 7 -> 3 -> 1
        let size = calculate(1000, 1000, 1, 1, SamplePolicy::PowerOfTwo).unwrap();
        assert_eq!(size.factor(), 512);
    }

    #[test]
    fn test_non_positive_target_is_unconstrained() {
        for policy in [SamplePolicy::PowerOfTwo, SamplePolicy::NearestRatio] {
            assert_eq!(calculate(4000, 3000, 0, 500, policy).unwrap(), SampleSize::ONE);
            assert_eq!(calculate(4000, 3000, 500, -1, policy).unwrap(), SampleSize::ONE);
        }
    }

    #[test]
    fn test_non_positive_intrinsic_is_error() {
        assert!(matches!(
            calculate(0, 3000, 100, 100, SamplePolicy::PowerOfTwo),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            calculate(100, -5, 100, 100, SamplePolicy::NearestRatio),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_nearest_ratio_below_threshold() {
        // 440x400 is under both thresholds even though it exceeds the target
        let size = calculate(440, 400, 100, 100, SamplePolicy::NearestRatio).unwrap();
        assert_eq!(size.factor(), 1);
    }

    #[test]
    fn test_nearest_ratio_engaged() {
        // round(3000/1000)=3, round(4000/1500)=3
        let size = calculate(4000, 3000, 1500, 1000, SamplePolicy::NearestRatio).unwrap();
        assert_eq!(size.factor(), 3);
    }

    #[test]
    fn test_nearest_ratio_takes_minimum() {
        // round(2000/400)=5, round(1000/500)=2
        let size = calculate(1000, 2000, 500, 400, SamplePolicy::NearestRatio).unwrap();
        assert_eq!(size.factor(), 2);
    }

    #[test]
    fn test_nearest_ratio_fits_target() {
        let size = calculate(1000, 800, 1000, 800, SamplePolicy::NearestRatio).unwrap();
        assert_eq!(size.factor(), 1);
    }

    #[test]
    fn test_nearest_ratio_clamps_to_one() {
        // round(300/1000)=0 and round(460/400)=1 -> min is 0, clamped to 1
        let size = calculate(460, 300, 400, 1000, SamplePolicy::NearestRatio).unwrap();
        assert_eq!(size.factor(), 1);
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(SamplePolicy::default(), SamplePolicy::PowerOfTwo);
    }

    #[test]
    fn test_sample_size_apply() {
        assert_eq!(SampleSize::new(4).apply(4000, 3000), (1000, 750));
        assert_eq!(SampleSize::new(4).apply(4001, 3003), (1001, 751));
        assert_eq!(SampleSize::ONE.apply(17, 9), (17, 9));
        assert_eq!(SampleSize::new(0).factor(), 1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
