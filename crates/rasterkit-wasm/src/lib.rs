//! RasterKit WASM - WebAssembly bindings for RasterKit
//!
//! This crate provides WASM bindings to expose the rasterkit-core pipeline
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper type for ARGB image data
//! - `decode` - Decoding and sample-size bindings
//! - `transform` - Crop, scale, flip and rotate bindings
//! - `blur` - Stack blur bindings
//! - `encode` - Fixed-quality and budgeted encoding bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image_to_fit, center_crop, JsCompressionBudget, compress_to_budget } from '@rasterkit/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image_to_fit(bytes, 1080, 1920);
//! const square = center_crop(image, 1, 1);
//! const jpeg = compress_to_budget(square, new JsCompressionBudget(200 * 1024, "jpeg"));
//! ```

use wasm_bindgen::prelude::*;

mod blur;
mod decode;
mod encode;
mod transform;
mod types;

// Re-export public types
pub use blur::{blur_image, blur_image_in_place, max_blur_radius};
pub use decode::{calculate_sample_size, decode_image, decode_image_to_fit};
pub use encode::{compress_to_budget, encode_image, JsCompressionBudget};
pub use transform::{
    apply_affine, center_crop, crop, crop_rect, flip_horizontal, flip_vertical, rotate,
    rotated_bounds, scale, scale_to, JsRotatedBounds,
};
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
