//! Fit an encoded image under a byte budget.
//!
//! Two phases, both bounded:
//! 1. Quality descent from `start_quality` toward `min_quality` in steps of
//!    `quality_step`, stopping at the first encoding that fits.
//! 2. If the floor quality still overshoots, downscale both axes by
//!    `1 / sqrt(encoded_len / max_bytes)` and run phase 1 once more.
//!
//! The encoder is called at most `2 * (ceil((start - min) / step) + 1)` times.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{Encoder, ImageFormat};
use crate::error::{Error, Result};
use crate::raster::RasterImage;
use crate::transform;

const DEFAULT_START_QUALITY: u8 = 100;
const DEFAULT_QUALITY_STEP: u8 = 10;

fn default_start_quality() -> u8 {
    DEFAULT_START_QUALITY
}

fn default_quality_step() -> u8 {
    DEFAULT_QUALITY_STEP
}

/// Byte ceiling plus the quality schedule used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionBudget {
    /// Largest acceptable encoded size in bytes.
    pub max_bytes: u64,
    /// Output container.
    #[serde(default)]
    pub format: ImageFormat,
    /// First quality tried (0-100).
    #[serde(default = "default_start_quality")]
    pub start_quality: u8,
    /// Amount the quality drops per retry.
    #[serde(default = "default_quality_step")]
    pub quality_step: u8,
    /// Lowest quality tried before falling back to downscaling.
    #[serde(default)]
    pub min_quality: u8,
}

impl CompressionBudget {
    /// Budget with the default 100 -> 0 schedule in steps of 10.
    pub fn new(max_bytes: u64, format: ImageFormat) -> Self {
        Self {
            max_bytes,
            format,
            start_quality: DEFAULT_START_QUALITY,
            quality_step: DEFAULT_QUALITY_STEP,
            min_quality: 0,
        }
    }

    /// Replace the quality schedule.
    pub fn with_qualities(mut self, start: u8, step: u8, min: u8) -> Self {
        self.start_quality = start;
        self.quality_step = step;
        self.min_quality = min;
        self
    }

    /// Check that the budget describes a finite, non-empty schedule.
    pub fn validate(&self) -> Result<()> {
        if self.max_bytes == 0 {
            return Err(Error::invalid("max_bytes must be positive"));
        }
        if self.start_quality > 100 {
            return Err(Error::invalid(format!(
                "start_quality {} exceeds 100",
                self.start_quality
            )));
        }
        if self.min_quality > self.start_quality {
            return Err(Error::invalid(format!(
                "min_quality {} exceeds start_quality {}",
                self.min_quality, self.start_quality
            )));
        }
        if self.quality_step == 0 {
            return Err(Error::invalid("quality_step must be positive"));
        }
        Ok(())
    }

    /// Upper bound on encode calls in a single quality descent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the budget fails [`validate`](Self::validate).
    pub fn max_attempts_per_pass(&self) -> Result<u32> {
        self.validate()?;
        let span = (self.start_quality - self.min_quality) as u32;
        Ok(span.div_ceil(self.quality_step as u32) + 1)
    }

    #[inline]
    fn fits(&self, encoded: &[u8]) -> bool {
        encoded.len() as u64 <= self.max_bytes
    }
}

/// Encode `image` so the result is at most `budget.max_bytes` long.
///
/// If the first encoding at `start_quality` already fits it is returned as is
/// and the encoder is called exactly once.
///
/// # Errors
///
/// - `Error::InvalidArgument` if the budget fails [`CompressionBudget::validate`]
/// - `Error::Encode` propagated unchanged from the encoder
/// - `Error::BudgetNotAchievable` if both phases overshoot
///
/// # Example
///
/// ```ignore
/// let budget = CompressionBudget::new(100_000, ImageFormat::Jpeg);
/// let jpeg = compress(image, &budget, &ImageCodec)?;
/// assert!(jpeg.len() <= 100_000);
/// ```
pub fn compress<E>(image: RasterImage, budget: &CompressionBudget, encoder: &E) -> Result<Vec<u8>>
where
    E: Encoder + ?Sized,
{
    Compression::new(budget, encoder, None).run(image)
}

/// Like [`compress`], but gives up with `Error::DeadlineExceeded` once
/// `deadline` has passed. The deadline is checked before every encode call.
pub fn compress_with_deadline<E>(
    image: RasterImage,
    budget: &CompressionBudget,
    encoder: &E,
    deadline: Instant,
) -> Result<Vec<u8>>
where
    E: Encoder + ?Sized,
{
    Compression::new(budget, encoder, Some(deadline)).run(image)
}

/// Downscaled size for the second pass; each side keeps at least one pixel.
fn fallback_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let side = |dim: u32| ((dim as f64 * factor).round() as u32).max(1);
    (side(width), side(height))
}

struct Compression<'a, E: ?Sized> {
    budget: &'a CompressionBudget,
    encoder: &'a E,
    deadline: Option<Instant>,
    attempts: u32,
}

impl<'a, E> Compression<'a, E>
where
    E: Encoder + ?Sized,
{
    fn new(budget: &'a CompressionBudget, encoder: &'a E, deadline: Option<Instant>) -> Self {
        Self {
            budget,
            encoder,
            deadline,
            attempts: 0,
        }
    }

    fn run(mut self, image: RasterImage) -> Result<Vec<u8>> {
        self.budget.validate()?;

        let first = self.descend(&image)?;
        if self.budget.fits(&first) {
            return Ok(first);
        }

        let ratio = first.len() as f64 / self.budget.max_bytes as f64;
        let factor = 1.0 / ratio.sqrt();
        let (width, height) = fallback_dimensions(image.width(), image.height(), factor);
        let scaled = transform::scale_to(&image, width, height)?;
        drop(image);
        debug!(
            ratio,
            factor,
            width = scaled.width(),
            height = scaled.height(),
            "Quality floor over budget, retrying at reduced size"
        );

        let second = self.descend(&scaled)?;
        if self.budget.fits(&second) {
            return Ok(second);
        }

        Err(Error::BudgetNotAchievable {
            max_bytes: self.budget.max_bytes,
            smallest: first.len().min(second.len()),
        })
    }

    /// Phase 1: lower quality until the encoding fits or the floor is reached.
    fn descend(&mut self, image: &RasterImage) -> Result<Vec<u8>> {
        let budget = self.budget;
        let mut quality = budget.start_quality;
        let mut encoded = self.encode(image, quality)?;

        while !budget.fits(&encoded) && quality > budget.min_quality {
            quality = quality
                .saturating_sub(budget.quality_step)
                .max(budget.min_quality);
            encoded = self.encode(image, quality)?;
        }

        Ok(encoded)
    }

    fn encode(&mut self, image: &RasterImage, quality: u8) -> Result<Vec<u8>> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded {
                    attempts: self.attempts,
                });
            }
        }

        let encoded = self.encoder.encode(image, self.budget.format, quality)?;
        self.attempts += 1;
        debug!(
            attempt = self.attempts,
            quality,
            size = encoded.len(),
            max_bytes = self.budget.max_bytes,
            "Encoded candidate"
        );
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decoder, EncodeError, ImageCodec};
    use std::cell::RefCell;
    use std::time::Duration;

    /// Records `(width, height, quality)` for every call.
    type CallLog = RefCell<Vec<(u32, u32, u8)>>;

    fn test_image(width: u32, height: u32) -> RasterImage {
        RasterImage::filled(width, height, 0xFF80_8080).unwrap()
    }

    #[test]
    fn test_first_encoding_fits() {
        let log = CallLog::default();
        let encoder = |img: &RasterImage, _: ImageFormat, q: u8| {
            log.borrow_mut().push((img.width(), img.height(), q));
            Ok::<Vec<u8>, EncodeError>(vec![0xAB; 10])
        };

        let budget = CompressionBudget::new(100, ImageFormat::Jpeg);
        let out = compress(test_image(10, 10), &budget, &encoder).unwrap();

        assert_eq!(out, vec![0xAB; 10]);
        assert_eq!(*log.borrow(), vec![(10, 10, 100)]);
    }

    #[test]
    fn test_quality_descent_stops_at_first_fit() {
        // 5_000 bytes per quality point: 500_000 at 100, 100_000 at 20
        let log = CallLog::default();
        let encoder = |img: &RasterImage, _: ImageFormat, q: u8| {
            log.borrow_mut().push((img.width(), img.height(), q));
            Ok::<Vec<u8>, EncodeError>(vec![0; 5_000 * q as usize])
        };

        let budget = CompressionBudget::new(100_000, ImageFormat::Jpeg);
        let out = compress(test_image(10, 10), &budget, &encoder).unwrap();

        assert_eq!(out.len(), 100_000);
        let qualities: Vec<u8> = log.borrow().iter().map(|c| c.2).collect();
        assert_eq!(qualities, vec![100, 90, 80, 70, 60, 50, 40, 30, 20]);
    }

    #[test]
    fn test_dimension_fallback() {
        // Size depends on pixel count: w * h * (q / 10 + 1)
        let log = CallLog::default();
        let encoder = |img: &RasterImage, _: ImageFormat, q: u8| {
            log.borrow_mut().push((img.width(), img.height(), q));
            let len = (img.width() * img.height()) as usize * (q as usize / 10 + 1);
            Ok::<Vec<u8>, EncodeError>(vec![0; len])
        };

        // At quality 0 a 100x100 image is 10_000 bytes; ratio 4 halves each side
        let budget = CompressionBudget::new(2_500, ImageFormat::Jpeg);
        let out = compress(test_image(100, 100), &budget, &encoder).unwrap();

        assert_eq!(out.len(), 2_500);
        let calls = log.borrow();
        assert_eq!(calls.len(), 22);
        assert!(calls[..11].iter().all(|c| (c.0, c.1) == (100, 100)));
        assert!(calls[11..].iter().all(|c| (c.0, c.1) == (50, 50)));
        assert_eq!(calls[10].2, 0);
        assert_eq!(calls[21].2, 0);
    }

    #[test]
    fn test_budget_not_achievable() {
        let calls = RefCell::new(0u32);
        let encoder = |_: &RasterImage, _: ImageFormat, _: u8| {
            *calls.borrow_mut() += 1;
            Ok::<Vec<u8>, EncodeError>(vec![0; 1_000])
        };

        let budget = CompressionBudget::new(100, ImageFormat::Png);
        let result = compress(test_image(20, 20), &budget, &encoder);

        assert!(matches!(
            result,
            Err(Error::BudgetNotAchievable {
                max_bytes: 100,
                smallest: 1_000
            })
        ));
        // 11 qualities per pass, two passes
        assert_eq!(*calls.borrow(), 22);
    }

    #[test]
    fn test_coarse_step_still_tries_floor() {
        let log = CallLog::default();
        let encoder = |img: &RasterImage, _: ImageFormat, q: u8| {
            log.borrow_mut().push((img.width(), img.height(), q));
            Ok::<Vec<u8>, EncodeError>(vec![0; 10 + q as usize])
        };

        let budget = CompressionBudget::new(10, ImageFormat::Jpeg).with_qualities(100, 30, 5);
        let result = compress(test_image(4, 4), &budget, &encoder);

        assert!(matches!(
            result,
            Err(Error::BudgetNotAchievable {
                max_bytes: 10,
                smallest: 15
            })
        ));
        // Step overshoots the floor, which is clamped to 5 in both passes
        let qualities: Vec<u8> = log.borrow().iter().map(|c| c.2).collect();
        assert_eq!(qualities, vec![100, 70, 40, 10, 5, 100, 70, 40, 10, 5]);
        assert_eq!(budget.max_attempts_per_pass().unwrap(), 5);
    }

    #[test]
    fn test_fallback_keeps_thin_side_at_one_pixel() {
        // 8x1 at 10 bytes per pixel; ratio 8 shrinks the 1-pixel side to round(0.35) = 0
        let log = CallLog::default();
        let encoder = |img: &RasterImage, _: ImageFormat, q: u8| {
            log.borrow_mut().push((img.width(), img.height(), q));
            Ok::<Vec<u8>, EncodeError>(vec![0; img.pixel_count() * 10])
        };

        let budget = CompressionBudget::new(10, ImageFormat::Png).with_qualities(0, 10, 0);
        let result = compress(test_image(8, 1), &budget, &encoder);

        assert!(matches!(
            result,
            Err(Error::BudgetNotAchievable {
                max_bytes: 10,
                smallest: 30
            })
        ));
        assert_eq!(*log.borrow(), vec![(8, 1, 0), (3, 1, 0)]);
    }

    #[test]
    fn test_fallback_dimensions() {
        assert_eq!(fallback_dimensions(100, 100, 0.5), (50, 50));
        assert_eq!(fallback_dimensions(8, 1, 0.35), (3, 1));
        assert_eq!(fallback_dimensions(1, 1, 0.01), (1, 1));
    }

    #[test]
    fn test_max_attempts_rejects_invalid_budget() {
        let budget = CompressionBudget::new(10, ImageFormat::Jpeg).with_qualities(50, 10, 60);
        assert!(matches!(
            budget.max_attempts_per_pass(),
            Err(Error::InvalidArgument(_))
        ));
        let budget = CompressionBudget::new(10, ImageFormat::Jpeg).with_qualities(50, 10, 0);
        assert_eq!(budget.max_attempts_per_pass().unwrap(), 6);
    }

    #[test]
    fn test_encoder_error_propagates() {
        let calls = RefCell::new(0u32);
        let encoder = |_: &RasterImage, format: ImageFormat, _: u8| {
            *calls.borrow_mut() += 1;
            Err::<Vec<u8>, _>(EncodeError::UnsupportedFormat(format))
        };

        let budget = CompressionBudget::new(1_000, ImageFormat::Png);
        let result = compress(test_image(4, 4), &budget, &encoder);

        assert!(matches!(
            result,
            Err(Error::Encode(EncodeError::UnsupportedFormat(ImageFormat::Png)))
        ));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_invalid_budgets() {
        let encoder = |_: &RasterImage, _: ImageFormat, _: u8| Ok::<Vec<u8>, EncodeError>(vec![]);
        let img = || test_image(2, 2);

        let cases = [
            CompressionBudget::new(0, ImageFormat::Jpeg),
            CompressionBudget::new(10, ImageFormat::Jpeg).with_qualities(101, 10, 0),
            CompressionBudget::new(10, ImageFormat::Jpeg).with_qualities(50, 10, 60),
            CompressionBudget::new(10, ImageFormat::Jpeg).with_qualities(100, 0, 0),
        ];
        for budget in cases {
            assert!(
                matches!(compress(img(), &budget, &encoder), Err(Error::InvalidArgument(_))),
                "{budget:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_deadline_already_passed() {
        let encoder = |_: &RasterImage, _: ImageFormat, _: u8| Ok::<Vec<u8>, EncodeError>(vec![0; 1]);
        let budget = CompressionBudget::new(10, ImageFormat::Jpeg);
        let deadline = Instant::now();

        let result = compress_with_deadline(test_image(2, 2), &budget, &encoder, deadline);
        assert!(matches!(result, Err(Error::DeadlineExceeded { attempts: 0 })));
    }

    #[test]
    fn test_distant_deadline_behaves_like_compress() {
        let encoder = |_: &RasterImage, _: ImageFormat, q: u8| Ok::<Vec<u8>, EncodeError>(vec![0; q as usize]);
        let budget = CompressionBudget::new(45, ImageFormat::Jpeg);
        let deadline = Instant::now() + Duration::from_secs(3600);

        let out = compress_with_deadline(test_image(2, 2), &budget, &encoder, deadline).unwrap();
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn test_with_image_codec() {
        // Pseudo-random noise compresses poorly, forcing real quality descent
        let mut seed = 0x1234_5678u32;
        let pixels = (0..128 * 128)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                0xFF00_0000 | (seed & 0x00FF_FFFF)
            })
            .collect();
        let img = RasterImage::new(128, 128, pixels).unwrap();

        let budget = CompressionBudget::new(20_000, ImageFormat::Jpeg);
        let out = compress(img, &budget, &ImageCodec).unwrap();

        assert!(out.len() <= 20_000);
        let decoded = ImageCodec.decode(&out).unwrap();
        assert!(decoded.width() <= 128 && decoded.height() <= 128);
    }

    #[test]
    fn test_budget_serde_defaults() {
        use serde::de::value::{Error as DeError, MapDeserializer};

        let fields = MapDeserializer::<_, DeError>::new([("maxBytes", 5_000u64)].into_iter());
        let budget = CompressionBudget::deserialize(fields).unwrap();
        assert_eq!(budget, CompressionBudget::new(5_000, ImageFormat::Jpeg));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
