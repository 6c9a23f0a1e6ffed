//! Scale, rotate and mirror operations.
//!
//! Every operation returns a new [`RasterImage`] and leaves the source
//! untouched. Only true rescales use a smoothing filter; mirrors and
//! rotations sample the nearest source pixel so that edges are never blended.
//!
//! # Rotation
//!
//! Angles are in degrees, positive = clockwise on screen (y axis points
//! down). The output canvas is the bounding box of the rotated source
//! corners; pixels not covered by the source are transparent.
//!
//! The inverse mapping for each destination pixel center `(px, py)` is:
//! ```text
//! src_x = pivot_x + (px - pivot_x) * cos(θ) + (py - pivot_y) * sin(θ)
//! src_y = pivot_y - (px - pivot_x) * sin(θ) + (py - pivot_y) * cos(θ)
//! ```

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::raster::RasterImage;

/// Tolerance, in degrees, for treating an angle as a multiple of 90.
const ANGLE_EPSILON: f64 = 1e-9;

/// A single geometric transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum AffineOp {
    /// Relative rescale; factors must be positive.
    Scale { sx: f64, sy: f64 },
    /// Rescale to exact dimensions.
    ScaleTo { width: u32, height: u32 },
    /// Rotate about a pivot point.
    #[serde(rename_all = "camelCase")]
    Rotate {
        degrees: f64,
        #[serde(default)]
        pivot_x: f64,
        #[serde(default)]
        pivot_y: f64,
    },
    /// Mirror left-right.
    FlipH,
    /// Mirror top-bottom.
    FlipV,
}

/// Apply a single [`AffineOp`].
pub fn apply(image: &RasterImage, op: &AffineOp) -> Result<RasterImage> {
    match *op {
        AffineOp::Scale { sx, sy } => scale(image, sx, sy),
        AffineOp::ScaleTo { width, height } => scale_to(image, width, height),
        AffineOp::Rotate {
            degrees,
            pivot_x,
            pivot_y,
        } => rotate(image, degrees, pivot_x, pivot_y),
        AffineOp::FlipH => Ok(flip_horizontal(image)),
        AffineOp::FlipV => Ok(flip_vertical(image)),
    }
}

/// Apply a sequence of operations in order.
pub fn apply_all(image: &RasterImage, ops: &[AffineOp]) -> Result<RasterImage> {
    ops.iter()
        .try_fold(image.clone(), |current, op| apply(&current, op))
}

/// Resample an image to exactly `new_w x new_h` with a bilinear (triangle) filter.
///
/// A request for the current dimensions returns a pixel-exact copy.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if either target dimension is zero.
pub fn scale_to(image: &RasterImage, new_w: u32, new_h: u32) -> Result<RasterImage> {
    if new_w == 0 || new_h == 0 {
        return Err(Error::invalid(format!(
            "target dimensions must be positive, got {new_w}x{new_h}"
        )));
    }

    // Fast path: if dimensions match, just clone
    if image.width() == new_w && image.height() == new_h {
        return Ok(image.clone());
    }

    trace!(
        from_w = image.width(),
        from_h = image.height(),
        to_w = new_w,
        to_h = new_h,
        "Rescaling raster"
    );

    let resized = imageops::resize(&image.to_rgba8(), new_w, new_h, FilterType::Triangle);
    RasterImage::from_rgba8(&resized)
}

/// Rescale by relative factors: `scale_to(w * sx, h * sy)`, rounded.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if a factor is not positive and finite,
/// or a side rounds to zero or past `u32::MAX`.
pub fn scale(image: &RasterImage, sx: f64, sy: f64) -> Result<RasterImage> {
    let new_w = scaled_dimension(image.width(), sx)?;
    let new_h = scaled_dimension(image.height(), sy)?;
    scale_to(image, new_w, new_h)
}

fn scaled_dimension(dim: u32, factor: f64) -> Result<u32> {
    if !(factor > 0.0 && factor.is_finite()) {
        return Err(Error::invalid(format!(
            "scale factor must be positive, got {factor}"
        )));
    }
    let scaled = (dim as f64 * factor).round();
    if scaled < 1.0 || scaled > u32::MAX as f64 {
        return Err(Error::invalid(format!(
            "scaling {dim} by {factor} gives {scaled} pixels"
        )));
    }
    Ok(scaled as u32)
}

/// Mirror an image left-right.
pub fn flip_horizontal(image: &RasterImage) -> RasterImage {
    let width = image.width() as usize;
    let mut pixels = image.pixels().to_vec();
    for row in pixels.chunks_exact_mut(width) {
        row.reverse();
    }
    RasterImage::from_parts(image.width(), image.height(), pixels)
}

/// Mirror an image top-bottom.
pub fn flip_vertical(image: &RasterImage) -> RasterImage {
    let width = image.width() as usize;
    let pixels = image
        .pixels()
        .chunks_exact(width)
        .rev()
        .flatten()
        .copied()
        .collect();
    RasterImage::from_parts(image.width(), image.height(), pixels)
}

/// Placement of a rotated image's bounding box in source coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedBounds {
    /// Left edge of the bounding box.
    pub left: f64,
    /// Top edge of the bounding box.
    pub top: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Compute the bounding box of a `width x height` rectangle rotated by
/// `degrees` about `(pivot_x, pivot_y)`.
///
/// The pivot moves the box but never changes its size.
pub fn rotated_bounds(
    width: u32,
    height: u32,
    degrees: f64,
    pivot_x: f64,
    pivot_y: f64,
) -> RotatedBounds {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f64, height as f64);

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (x, y) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
        let dx = x - pivot_x;
        let dy = y - pivot_y;
        let rx = pivot_x + dx * cos - dy * sin;
        let ry = pivot_y + dx * sin + dy * cos;
        min_x = min_x.min(rx);
        min_y = min_y.min(ry);
        max_x = max_x.max(rx);
        max_y = max_y.max(ry);
    }

    RotatedBounds {
        left: min_x,
        top: min_y,
        width: ((max_x - min_x).round() as u32).max(1),
        height: ((max_y - min_y).round() as u32).max(1),
    }
}

/// Rotate an image by `degrees` about `(pivot_x, pivot_y)` with nearest sampling.
///
/// Multiples of 90 degrees are handled by exact index remapping, so
/// `rotate(img, 0, ..)` and `rotate(img, 360, ..)` are pixel-exact copies.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if the angle or pivot is not finite.
pub fn rotate(image: &RasterImage, degrees: f64, pivot_x: f64, pivot_y: f64) -> Result<RasterImage> {
    if !degrees.is_finite() || !pivot_x.is_finite() || !pivot_y.is_finite() {
        return Err(Error::invalid(format!(
            "rotation parameters must be finite, got {degrees} about ({pivot_x}, {pivot_y})"
        )));
    }

    let normalized = degrees.rem_euclid(360.0);
    let quarter = (normalized / 90.0).round();
    if (normalized - quarter * 90.0).abs() < ANGLE_EPSILON {
        return Ok(match quarter as u32 % 4 {
            0 => image.clone(),
            1 => rotate_quarter(image, QuarterTurn::Cw90),
            2 => rotate_quarter(image, QuarterTurn::Cw180),
            _ => rotate_quarter(image, QuarterTurn::Cw270),
        });
    }

    Ok(rotate_nearest(image, degrees, pivot_x, pivot_y))
}

#[derive(Debug, Clone, Copy)]
enum QuarterTurn {
    Cw90,
    Cw180,
    Cw270,
}

fn rotate_quarter(image: &RasterImage, turn: QuarterTurn) -> RasterImage {
    let (w, h) = (image.width(), image.height());
    let (dst_w, dst_h) = match turn {
        QuarterTurn::Cw180 => (w, h),
        QuarterTurn::Cw90 | QuarterTurn::Cw270 => (h, w),
    };

    let mut output = Vec::with_capacity(image.pixel_count());
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let (sx, sy) = match turn {
                QuarterTurn::Cw90 => (dy, h - 1 - dx),
                QuarterTurn::Cw180 => (w - 1 - dx, h - 1 - dy),
                QuarterTurn::Cw270 => (w - 1 - dy, dx),
            };
            output.push(image.pixel(sx, sy));
        }
    }

    RasterImage::from_parts(dst_w, dst_h, output)
}

fn rotate_nearest(image: &RasterImage, degrees: f64, pivot_x: f64, pivot_y: f64) -> RasterImage {
    let bounds = rotated_bounds(image.width(), image.height(), degrees, pivot_x, pivot_y);
    trace!(
        degrees,
        width = bounds.width,
        height = bounds.height,
        "Rotating raster"
    );

    let (sin, cos) = degrees.to_radians().sin_cos();
    let (src_w, src_h) = (image.width() as f64, image.height() as f64);

    let mut output = Vec::with_capacity(bounds.width as usize * bounds.height as usize);
    for dst_y in 0..bounds.height {
        for dst_x in 0..bounds.width {
            // Destination pixel center, relative to the pivot
            let px = bounds.left + dst_x as f64 + 0.5 - pivot_x;
            let py = bounds.top + dst_y as f64 + 0.5 - pivot_y;

            let src_x = (pivot_x + px * cos + py * sin).floor();
            let src_y = (pivot_y - px * sin + py * cos).floor();

            let pixel = if src_x >= 0.0 && src_x < src_w && src_y >= 0.0 && src_y < src_h {
                image.pixel(src_x as u32, src_y as u32)
            } else {
                0
            };
            output.push(pixel);
        }
    }

    RasterImage::from_parts(bounds.width, bounds.height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
