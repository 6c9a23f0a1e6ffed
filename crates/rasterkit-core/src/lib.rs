//! RasterKit Core - Raster transform pipeline
//!
//! This crate provides the in-memory stages that sit between a decoder and an
//! encoder: picking a decode subsampling factor, aspect-ratio cropping, affine
//! transforms, stack blur, and fitting the encoded result under a byte budget.

pub mod blur;
pub mod codec;
pub mod encode;
pub mod error;
pub mod raster;
pub mod sample;
pub mod transform;

pub use blur::{blur_in_place, blur_shared, blurred, BlurParams, MAX_RADIUS};
pub use codec::{DecodeError, Decoder, EncodeError, Encoder, ImageCodec, ImageFormat};
pub use encode::{compress, compress_with_deadline, CompressionBudget};
pub use error::{Error, Result};
pub use raster::{pack_argb, unpack_argb, RasterImage, Rect};
pub use sample::{SamplePolicy, SampleSize};
pub use transform::{center_crop, crop_rect, AffineOp};

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterImage {
        let pixels = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| pack_argb(255, (x % 256) as u8, (y % 256) as u8, 64))
            })
            .collect();
        RasterImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let intrinsic = (800, 600);
        let sample =
            sample::calculate(intrinsic.0, intrinsic.1, 200, 200, SamplePolicy::PowerOfTwo).unwrap();
        let (w, h) = sample.apply(intrinsic.0 as u32, intrinsic.1 as u32);
        let decoded = gradient(w, h);

        let square = center_crop(&decoded, 1.0, 1.0).unwrap();
        assert_eq!(square.width(), square.height());

        let ops = [
            AffineOp::Rotate {
                degrees: 90.0,
                pivot_x: 0.0,
                pivot_y: 0.0,
            },
            AffineOp::ScaleTo {
                width: 64,
                height: 64,
            },
        ];
        let mut out = transform::apply_all(&square, &ops).unwrap();
        BlurParams::new(4).unwrap().apply(&mut out).unwrap();

        let budget = CompressionBudget::new(8 * 1024, ImageFormat::Jpeg);
        let bytes = compress(out, &budget, &ImageCodec).unwrap();
        assert!(bytes.len() <= 8 * 1024);

        let back = ImageCodec.decode(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (64, 64));
    }

    #[test]
    fn test_pipeline_errors_share_one_type() {
        let img = gradient(4, 4);
        let errors: Vec<Error> = vec![
            center_crop(&img, 0.0, 1.0).unwrap_err(),
            blurred(&img, MAX_RADIUS + 1).unwrap_err(),
            sample::calculate(0, 10, 5, 5, SamplePolicy::NearestRatio).unwrap_err(),
        ];
        assert!(errors.iter().all(|e| matches!(e, Error::InvalidArgument(_))));
    }
}
