//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a PNG or JPEG image from bytes
//! - [`calculate_sample_size`] - Downsample factor for decoding into a target box
//! - [`decode_image_to_fit`] - Decode, then reduce by the power-of-two sample size
//!
//! # Example
//!
//! ```typescript
//! import { decode_image_to_fit } from '@rasterkit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image_to_fit(bytes, 1080, 1920);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::JsRasterImage;
use rasterkit_core::codec::{Decoder, ImageCodec};
use rasterkit_core::sample::{self, SamplePolicy, SampleSize};
use rasterkit_core::{transform, RasterImage};
use wasm_bindgen::prelude::*;

/// Decode a PNG or JPEG image from bytes.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    ImageCodec
        .decode(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Calculate the downsample factor for decoding an image into a target box.
///
/// # Arguments
///
/// * `intrinsic_width`, `intrinsic_height` - Full image size
/// * `target_width`, `target_height` - Requested size; zero or negative means unconstrained
/// * `nearest_ratio` - Use the rounded-ratio policy instead of power-of-two halving
#[wasm_bindgen]
pub fn calculate_sample_size(
    intrinsic_width: i32,
    intrinsic_height: i32,
    target_width: i32,
    target_height: i32,
    nearest_ratio: bool,
) -> Result<u32, JsValue> {
    sample::calculate(
        intrinsic_width,
        intrinsic_height,
        target_width,
        target_height,
        policy_from_flag(nearest_ratio),
    )
    .map(SampleSize::factor)
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode an image and reduce it to the size a subsampling decoder would
/// produce for the given target box.
#[wasm_bindgen]
pub fn decode_image_to_fit(
    bytes: &[u8],
    target_width: i32,
    target_height: i32,
) -> Result<JsRasterImage, JsValue> {
    let full = ImageCodec
        .decode(bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    subsample(full, target_width, target_height)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn policy_from_flag(nearest_ratio: bool) -> SamplePolicy {
    if nearest_ratio {
        SamplePolicy::NearestRatio
    } else {
        SamplePolicy::PowerOfTwo
    }
}

fn subsample(
    image: RasterImage,
    target_width: i32,
    target_height: i32,
) -> rasterkit_core::Result<RasterImage> {
    let (w, h) = (image.width(), image.height());
    let size = sample::calculate(
        w.min(i32::MAX as u32) as i32,
        h.min(i32::MAX as u32) as i32,
        target_width,
        target_height,
        SamplePolicy::PowerOfTwo,
    )?;
    if size == SampleSize::ONE {
        return Ok(image);
    }
    let (out_w, out_h) = size.apply(w, h);
    transform::scale_to(&image, out_w, out_h)
}
