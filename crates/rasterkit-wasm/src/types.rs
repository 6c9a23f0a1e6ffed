//! WASM-compatible wrapper types for image data.
//!
//! JavaScript sees images as a width, a height, and a `Uint32Array` of packed
//! ARGB pixels. The wrapper owns a core [`RasterImage`] so the dimension and
//! buffer-length invariants hold on both sides of the boundary.

use rasterkit_core::RasterImage;
use wasm_bindgen::prelude::*;

/// A raster image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint32Array`. Keep the image in WASM memory while
/// chaining operations and only extract pixels at the end.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsRasterImage {
    inner: RasterImage,
}

#[wasm_bindgen]
impl JsRasterImage {
    /// Create a new image from dimensions and ARGB pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - Packed ARGB pixels (`0xAARRGGBB`, row-major order)
    ///
    /// # Errors
    /// Returns error if a dimension is zero or `pixels.length != width * height`
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<JsRasterImage, JsValue> {
        RasterImage::new(width, height, pixels)
            .map(Self::from_raster)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the number of pixels (width * height)
    #[wasm_bindgen(getter)]
    pub fn pixel_count(&self) -> usize {
        self.inner.pixel_count()
    }

    /// Returns packed ARGB pixel data as Uint32Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u32> {
        self.inner.pixels().to_vec()
    }

    /// Returns RGBA bytes suitable for `ImageData`.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.inner.to_rgba8().into_raw()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsRasterImage {
    pub(crate) fn from_raster(inner: RasterImage) -> Self {
        Self { inner }
    }

    pub(crate) fn as_raster(&self) -> &RasterImage {
        &self.inner
    }

    pub(crate) fn as_raster_mut(&mut self) -> &mut RasterImage {
        &mut self.inner
    }
}
