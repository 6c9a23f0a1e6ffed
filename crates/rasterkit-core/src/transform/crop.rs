//! Aspect-ratio center cropping.
//!
//! [`crop_rect`] computes the largest centered rectangle of a given aspect
//! ratio inside a source image. It is pure geometry and can run before the
//! pixels exist (for example to request a region decode). [`center_crop`]
//! and [`crop`] copy the pixels out of an existing image.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner
//! - right/bottom edges are exclusive

use crate::error::{Error, Result};
use crate::raster::{RasterImage, Rect};

/// Compute the centered crop rectangle with aspect ratio `width_scale : height_scale`.
///
/// The full width is kept whenever the source is tall enough; otherwise the
/// full height is kept and the width is reduced. Offsets use truncating
/// division, so an odd leftover puts the extra pixel at the bottom/right.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if a source dimension is zero or a scale
/// is not a positive finite number.
///
/// # Example
///
/// ```ignore
/// // 16:9 out of a square
/// let rect = crop_rect(1000, 1000, 16.0, 9.0)?;
/// assert_eq!(rect, Rect::new(0, 219, 1000, 781));
/// ```
pub fn crop_rect(src_w: u32, src_h: u32, width_scale: f64, height_scale: f64) -> Result<Rect> {
    if src_w == 0 || src_h == 0 || src_w > i32::MAX as u32 || src_h > i32::MAX as u32 {
        return Err(Error::invalid(format!(
            "source dimensions must be in 1..=i32::MAX, got {src_w}x{src_h}"
        )));
    }
    if !(width_scale > 0.0 && width_scale.is_finite())
        || !(height_scale > 0.0 && height_scale.is_finite())
    {
        return Err(Error::invalid(format!(
            "aspect components must be positive, got {width_scale}:{height_scale}"
        )));
    }

    let (w, h) = (src_w as i64, src_h as i64);

    let required_h = (src_w as f64 * height_scale / width_scale).floor() as i64;
    let d = h - required_h;
    let (left, top, right, bottom) = if d >= 0 {
        (0, d / 2, w, d / 2 + required_h)
    } else {
        let required_w = (src_h as f64 * width_scale / height_scale).floor() as i64;
        let d2 = (w - required_w).max(0);
        (d2 / 2, 0, d2 / 2 + required_w.min(w), h)
    };

    Ok(Rect::new(left as i32, top as i32, right as i32, bottom as i32))
}

/// Copy the pixels inside `rect` into a new image.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if `rect` is empty or not fully inside
/// the image.
pub fn crop(image: &RasterImage, rect: Rect) -> Result<RasterImage> {
    if rect.is_empty() || !image.bounds().contains(&rect) {
        return Err(Error::invalid(format!(
            "crop rect {rect:?} is empty or outside {}x{}",
            image.width(),
            image.height()
        )));
    }

    // Fast path: full crop returns a clone
    if rect == image.bounds() {
        return Ok(image.clone());
    }

    let out_width = rect.width() as usize;
    let out_height = rect.height() as usize;
    let src_width = image.width() as usize;
    let mut output = Vec::with_capacity(out_width * out_height);

    // Copy pixel data row by row
    for y in rect.top as usize..rect.bottom as usize {
        let row_start = y * src_width + rect.left as usize;
        output.extend_from_slice(&image.pixels()[row_start..row_start + out_width]);
    }

    Ok(RasterImage::from_parts(
        out_width as u32,
        out_height as u32,
        output,
    ))
}

/// Crop the largest centered region with aspect ratio `width_scale : height_scale`.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` for invalid ratios, or when the ratio is so
/// extreme that the region rounds down to zero pixels.
pub fn center_crop(image: &RasterImage, width_scale: f64, height_scale: f64) -> Result<RasterImage> {
    let rect = crop_rect(image.width(), image.height(), width_scale, height_scale)?;
    crop(image, rect)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
