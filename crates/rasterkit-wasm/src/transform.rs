//! WASM bindings for geometric operations.
//!
//! This module provides JavaScript bindings for aspect cropping, rescaling,
//! mirroring, and rotation. Every function returns a new image and leaves
//! its input untouched.

use crate::types::JsRasterImage;
use rasterkit_core::transform::{self, AffineOp};
use rasterkit_core::Rect;
use wasm_bindgen::prelude::*;

/// Bounding box of a rotated image, as returned by [`rotated_bounds`].
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsRotatedBounds {
    pub left: f64,
    pub top: f64,
    pub width: u32,
    pub height: u32,
}

/// Compute the centered crop rectangle for an aspect ratio.
///
/// # Returns
///
/// `{ left, top, right, bottom }` in source pixel coordinates (right/bottom exclusive).
///
/// # Example (TypeScript)
///
/// ```typescript
/// const rect = crop_rect(1000, 1000, 16, 9);
/// // { left: 0, top: 219, right: 1000, bottom: 781 }
/// ```
#[wasm_bindgen]
pub fn crop_rect(
    src_width: u32,
    src_height: u32,
    width_scale: f64,
    height_scale: f64,
) -> Result<JsValue, JsValue> {
    let rect = transform::crop_rect(src_width, src_height, width_scale, height_scale)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&rect).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Crop the largest centered region with aspect ratio `width_scale : height_scale`.
#[wasm_bindgen]
pub fn center_crop(
    image: &JsRasterImage,
    width_scale: f64,
    height_scale: f64,
) -> Result<JsRasterImage, JsValue> {
    transform::center_crop(image.as_raster(), width_scale, height_scale)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Crop an explicit pixel rectangle (right/bottom exclusive).
#[wasm_bindgen]
pub fn crop(
    image: &JsRasterImage,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
) -> Result<JsRasterImage, JsValue> {
    transform::crop(image.as_raster(), Rect::new(left, top, right, bottom))
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Rescale by relative factors; output dimensions are rounded and must not reach zero.
#[wasm_bindgen]
pub fn scale(image: &JsRasterImage, sx: f64, sy: f64) -> Result<JsRasterImage, JsValue> {
    transform::scale(image.as_raster(), sx, sy)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Rescale to exact dimensions with a bilinear filter.
#[wasm_bindgen]
pub fn scale_to(image: &JsRasterImage, width: u32, height: u32) -> Result<JsRasterImage, JsValue> {
    transform::scale_to(image.as_raster(), width, height)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Mirror left-right.
#[wasm_bindgen]
pub fn flip_horizontal(image: &JsRasterImage) -> JsRasterImage {
    JsRasterImage::from_raster(transform::flip_horizontal(image.as_raster()))
}

/// Mirror top-bottom.
#[wasm_bindgen]
pub fn flip_vertical(image: &JsRasterImage) -> JsRasterImage {
    JsRasterImage::from_raster(transform::flip_vertical(image.as_raster()))
}

/// Rotate about a pivot point.
///
/// The output canvas is the bounding box of the rotated image. Pixels not
/// covered by the source are transparent.
///
/// # Arguments
///
/// * `image` - Source image to rotate
/// * `degrees` - Rotation angle in degrees (positive = clockwise)
/// * `pivot_x`, `pivot_y` - Pivot in source pixel coordinates
///
/// # Example (TypeScript)
///
/// ```typescript
/// const rotated = rotate(sourceImage, 90, 0, 0);
/// ```
#[wasm_bindgen]
pub fn rotate(
    image: &JsRasterImage,
    degrees: f64,
    pivot_x: f64,
    pivot_y: f64,
) -> Result<JsRasterImage, JsValue> {
    transform::rotate(image.as_raster(), degrees, pivot_x, pivot_y)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Bounding box a rotation would produce, without touching any pixels.
#[wasm_bindgen]
pub fn rotated_bounds(
    width: u32,
    height: u32,
    degrees: f64,
    pivot_x: f64,
    pivot_y: f64,
) -> JsRotatedBounds {
    let b = transform::rotated_bounds(width, height, degrees, pivot_x, pivot_y);
    JsRotatedBounds {
        left: b.left,
        top: b.top,
        width: b.width,
        height: b.height,
    }
}

/// Apply a list of operations in order.
///
/// # Arguments
///
/// * `ops` - Array of `{ op: "scale" | "scaleTo" | "rotate" | "flipH" | "flipV", ... }`
///
/// # Example (TypeScript)
///
/// ```typescript
/// const out = apply_affine(image, [
///   { op: "rotate", degrees: 90 },
///   { op: "scaleTo", width: 320, height: 240 },
///   { op: "flipH" },
/// ]);
/// ```
#[wasm_bindgen]
pub fn apply_affine(image: &JsRasterImage, ops: JsValue) -> Result<JsRasterImage, JsValue> {
    let ops: Vec<AffineOp> = serde_wasm_bindgen::from_value(ops)
        .map_err(|e| JsValue::from_str(&format!("Invalid affine ops: {}", e)))?;

    transform::apply_all(image.as_raster(), &ops)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
