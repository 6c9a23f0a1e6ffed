//! Geometric operations on decoded rasters: cropping and affine transforms.
//!
//! Both submodules leave their input untouched and return a new
//! [`RasterImage`](crate::RasterImage).
//!
//! # Resampling
//!
//! - Rescales (`scale`, `scale_to`) use a bilinear-class smoothing filter
//! - Mirrors and rotations use nearest sampling, so no edge blending occurs
//! - Crops copy pixels verbatim
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downward
//! - Rotation angles are in degrees, positive = clockwise on screen

mod affine;
mod crop;

pub use affine::{
    apply, apply_all, flip_horizontal, flip_vertical, rotate, rotated_bounds, scale, scale_to,
    AffineOp, RotatedBounds,
};
pub use crop::{center_crop, crop, crop_rect};
