//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_image`] - Encode a `JsRasterImage` as PNG or JPEG bytes
//! - [`compress_to_budget`] - Encode under a byte ceiling, lowering quality then size
//!
//! # Example
//!
//! ```typescript
//! import { JsCompressionBudget, compress_to_budget } from '@rasterkit/wasm';
//!
//! const budget = JsCompressionBudget.from_json({ maxBytes: 100 * 1024, format: "jpeg" });
//! const jpeg = compress_to_budget(image, budget);
//! await writable.write(new Blob([jpeg], { type: budget.mime_type }));
//! ```

use crate::types::JsRasterImage;
use rasterkit_core::codec::{Encoder, ImageCodec, ImageFormat};
use rasterkit_core::encode::{self, CompressionBudget};
use wasm_bindgen::prelude::*;

/// Compression budget wrapper for JavaScript.
#[wasm_bindgen]
pub struct JsCompressionBudget {
    inner: CompressionBudget,
}

#[wasm_bindgen]
impl JsCompressionBudget {
    /// Create a budget with the default 100 -> 0 quality schedule in steps of 10.
    ///
    /// # Errors
    /// Returns error if `format` is not `"png"` or `"jpeg"`
    #[wasm_bindgen(constructor)]
    pub fn new(max_bytes: u64, format: &str) -> Result<JsCompressionBudget, JsValue> {
        let format = parse_format(format)
            .ok_or_else(|| JsValue::from_str(&format!("Unsupported format: {}", format)))?;
        Ok(Self {
            inner: CompressionBudget::new(max_bytes, format),
        })
    }

    /// Get the byte ceiling
    #[wasm_bindgen(getter)]
    pub fn max_bytes(&self) -> u64 {
        self.inner.max_bytes
    }

    /// Set the byte ceiling
    #[wasm_bindgen(setter)]
    pub fn set_max_bytes(&mut self, value: u64) {
        self.inner.max_bytes = value;
    }

    /// Get the first quality tried
    #[wasm_bindgen(getter)]
    pub fn start_quality(&self) -> u8 {
        self.inner.start_quality
    }

    /// Set the first quality tried
    #[wasm_bindgen(setter)]
    pub fn set_start_quality(&mut self, value: u8) {
        self.inner.start_quality = value;
    }

    /// Get the quality decrement per retry
    #[wasm_bindgen(getter)]
    pub fn quality_step(&self) -> u8 {
        self.inner.quality_step
    }

    /// Set the quality decrement per retry
    #[wasm_bindgen(setter)]
    pub fn set_quality_step(&mut self, value: u8) {
        self.inner.quality_step = value;
    }

    /// Get the lowest quality tried
    #[wasm_bindgen(getter)]
    pub fn min_quality(&self) -> u8 {
        self.inner.min_quality
    }

    /// Set the lowest quality tried
    #[wasm_bindgen(setter)]
    pub fn set_min_quality(&mut self, value: u8) {
        self.inner.min_quality = value;
    }

    /// MIME type of the output container
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.format.mime_type().to_string()
    }

    /// Serialize to a plain object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Deserialize from a plain object; omitted quality fields take their defaults
    pub fn from_json(value: JsValue) -> Result<JsCompressionBudget, JsValue> {
        let inner: CompressionBudget =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }
}

impl JsCompressionBudget {
    pub(crate) fn inner(&self) -> &CompressionBudget {
        &self.inner
    }
}

/// Parse a container name as used from JavaScript.
pub(crate) fn parse_format(name: &str) -> Option<ImageFormat> {
    match name.to_ascii_lowercase().as_str() {
        "png" | "image/png" => Some(ImageFormat::Png),
        "jpeg" | "jpg" | "image/jpeg" => Some(ImageFormat::Jpeg),
        _ => None,
    }
}

/// Encode an image at a fixed quality.
///
/// # Arguments
///
/// * `image` - The image to encode
/// * `format` - `"png"` or `"jpeg"`
/// * `quality` - JPEG quality (1-100); ignored for PNG
#[wasm_bindgen]
pub fn encode_image(image: &JsRasterImage, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let format = parse_format(format)
        .ok_or_else(|| JsValue::from_str(&format!("Unsupported format: {}", format)))?;
    ImageCodec
        .encode(image.as_raster(), format, quality)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode an image so the output fits within `budget.max_bytes`.
///
/// Quality is lowered first; if the lowest quality still overshoots, the image
/// is downscaled once and the quality search repeats.
///
/// # Errors
///
/// Returns an error if the budget is invalid or cannot be met.
#[wasm_bindgen]
pub fn compress_to_budget(
    image: &JsRasterImage,
    budget: &JsCompressionBudget,
) -> Result<Vec<u8>, JsValue> {
    encode::compress(image.as_raster().clone(), budget.inner(), &ImageCodec)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}


/// WASM-specific tests that require JsValue.
///
/// These tests use functions that return `Result<T, JsValue>` and can only
/// run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn gray(width: u32, height: u32) -> JsRasterImage {
        JsRasterImage::new(width, height, vec![0xFF80_8080; (width * height) as usize]).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_encode_image_png() {
        let png = encode_image(&gray(8, 8), "png", 0).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[wasm_bindgen_test]
    fn test_encode_image_unknown_format() {
        assert!(encode_image(&gray(8, 8), "gif", 90).is_err());
    }

    #[wasm_bindgen_test]
    fn test_budget_from_json_defaults() {
        let value = serde_wasm_bindgen::to_value(&CompressionBudget::new(1_000, ImageFormat::Png))
            .unwrap();
        let budget = JsCompressionBudget::from_json(value).unwrap();
        assert_eq!(budget.max_bytes(), 1_000);
        assert_eq!(budget.mime_type(), "image/png");
    }

    #[wasm_bindgen_test]
    fn test_compress_to_budget_unachievable() {
        let budget = JsCompressionBudget::new(10, "jpeg").unwrap();
        assert!(compress_to_budget(&gray(32, 32), &budget).is_err());
    }

    #[wasm_bindgen_test]
    fn test_compress_to_budget_invalid_budget() {
        let mut budget = JsCompressionBudget::new(1_000, "jpeg").unwrap();
        budget.set_quality_step(0);
        assert!(compress_to_budget(&gray(8, 8), &budget).is_err());
    }
}
