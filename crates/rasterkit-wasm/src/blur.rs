//! Stack blur WASM bindings.

use crate::types::JsRasterImage;
use rasterkit_core::blur;
use wasm_bindgen::prelude::*;

/// Largest radius accepted by [`blur_image`] and [`blur_image_in_place`].
#[wasm_bindgen]
pub fn max_blur_radius() -> u8 {
    blur::MAX_RADIUS
}

/// Return a blurred copy of `image`. Alpha is preserved.
///
/// # Errors
///
/// Returns an error if `radius` exceeds 25.
#[wasm_bindgen]
pub fn blur_image(image: &JsRasterImage, radius: u8) -> Result<JsRasterImage, JsValue> {
    blur::blurred(image.as_raster(), radius)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Blur `image` in place, avoiding a second buffer in WASM memory.
///
/// # Example (TypeScript)
///
/// ```typescript
/// blur_image_in_place(image, 8);
/// const pixels = image.pixels();
/// ```
#[wasm_bindgen]
pub fn blur_image_in_place(image: &mut JsRasterImage, radius: u8) -> Result<(), JsValue> {
    blur::blur_in_place(image.as_raster_mut(), radius).map_err(|e| JsValue::from_str(&e.to_string()))
}
