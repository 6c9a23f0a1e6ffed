//! Core pixel buffer and geometry types.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pack 8-bit channels into a single ARGB word.
#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Split an ARGB word into `[a, r, g, b]`.
#[inline]
pub fn unpack_argb(argb: u32) -> [u8; 4] {
    [
        (argb >> 24) as u8,
        (argb >> 16) as u8,
        (argb >> 8) as u8,
        argb as u8,
    ]
}

/// Number of pixels in a `width x height` buffer.
///
/// Fails when the count, or the buffer's size in bytes, does not fit the
/// address space (`usize` is 32 bits on wasm32).
fn pixel_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&len| {
            len.checked_mul(std::mem::size_of::<u32>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| {
            Error::invalid(format!(
                "image of {width}x{height} pixels exceeds addressable memory"
            ))
        })
}

/// An owned image with packed 32-bit ARGB pixels.
///
/// Width and height are always non-zero and the buffer always holds exactly
/// `width * height` pixels in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RasterImage {
    /// Create a RasterImage from dimensions and ARGB pixel data.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if either dimension is zero or the
    /// buffer length is not `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!(
                "image dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = pixel_len(width, height)?;
        if pixels.len() != expected {
            return Err(Error::invalid(format!(
                "pixel buffer holds {} pixels, expected {expected} for {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Internal constructor for buffers that are the right size by construction.
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert!(width > 0 && height > 0, "Zero image dimension");
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create an image where every pixel has the same ARGB value.
    pub fn filled(width: u32, height: u32, argb: u32) -> Result<Self> {
        let len = pixel_len(width, height)?;
        Self::new(width, height, vec![argb; len])
    }

    /// Create a RasterImage from an `image::RgbaImage`.
    pub fn from_rgba8(img: &image::RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| pack_argb(p[3], p[0], p[1], p[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Convert to an `image::RgbaImage` for resampling or encoding.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [a, r, g, b] = unpack_argb(self.pixel(x, y));
            image::Rgba([r, g, b, a])
        })
    }

    /// Convert to an `image::RgbImage`, dropping alpha.
    pub fn to_rgb8(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let [_, r, g, b] = unpack_argb(self.pixel(x, y));
            image::Rgb([r, g, b])
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major ARGB pixels.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable access to the pixels. The buffer length cannot change.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Get the pixel at `(x, y)`.
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Set the pixel at `(x, y)`.
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, argb: u32) {
        let idx = (y as usize) * (self.width as usize) + x as usize;
        self.pixels[idx] = argb;
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Bounds of the whole image as a `Rect`.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

/// Integer rectangle with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Check whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
            && other.left <= other.right
            && other.top <= other.bottom
    }
}
