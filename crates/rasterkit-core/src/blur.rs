//! Separable stack blur.
//!
//! Approximates a Gaussian with a triangular window: the sample at offset `i`
//! from the center has weight `radius + 1 - |i|`, so the weights sum to
//! `(radius + 1)^2`. Each row and then each column is processed with running
//! sums over a ring buffer (the "stack"), which makes the cost per pixel
//! independent of the radius.
//!
//! ## Passes
//! 1. Horizontal: ARGB buffer -> intermediate R, G, B planes
//! 2. Vertical: planes -> ARGB buffer, keeping each pixel's original alpha
//!
//! Samples past an edge repeat the edge pixel.

use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, Result};
use crate::raster::{pack_argb, unpack_argb, RasterImage};

/// Largest supported blur radius.
pub const MAX_RADIUS: u8 = 25;

/// Validated blur radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlurParams {
    radius: u8,
}

impl BlurParams {
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `radius` exceeds [`MAX_RADIUS`].
    pub fn new(radius: u8) -> Result<Self> {
        check_radius(radius)?;
        Ok(Self { radius })
    }

    #[inline]
    pub fn radius(self) -> u8 {
        self.radius
    }

    /// Blur `image` in place with this radius.
    pub fn apply(self, image: &mut RasterImage) -> Result<()> {
        blur_in_place(image, self.radius)
    }
}

fn check_radius(radius: u8) -> Result<()> {
    if radius > MAX_RADIUS {
        return Err(Error::invalid(format!(
            "blur radius {radius} outside 0..={MAX_RADIUS}"
        )));
    }
    Ok(())
}

/// Blur an image in place.
///
/// A radius of 0 leaves the buffer untouched. The alpha channel is never
/// modified.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if `radius` exceeds [`MAX_RADIUS`]; the
/// buffer is not touched in that case.
///
/// # Example
///
/// ```ignore
/// let mut img = RasterImage::filled(64, 64, 0xFF80_8080)?;
/// blur_in_place(&mut img, 8)?;
/// ```
pub fn blur_in_place(image: &mut RasterImage, radius: u8) -> Result<()> {
    check_radius(radius)?;
    if radius == 0 {
        return Ok(());
    }

    let width = image.width() as usize;
    let height = image.height() as usize;
    trace!(radius, width, height, "Stack blur");

    let r = radius as usize;
    let divisor = (r + 1) * (r + 1);
    // v -> v / divisor, covering sums up to 255 * divisor inclusive
    let dv: Vec<u8> = (0..256 * divisor).map(|v| (v / divisor) as u8).collect();
    let mut stack = vec![[0u32; 3]; 2 * r + 1];

    let len = width * height;
    let mut red = vec![0u8; len];
    let mut green = vec![0u8; len];
    let mut blue = vec![0u8; len];

    let pixels = image.pixels_mut();

    for y in 0..height {
        let row = y * width;
        blur_line(
            width,
            r,
            &dv,
            &mut stack,
            |x| {
                let [_, cr, cg, cb] = unpack_argb(pixels[row + x]);
                [cr as u32, cg as u32, cb as u32]
            },
            |x, [cr, cg, cb]| {
                red[row + x] = cr;
                green[row + x] = cg;
                blue[row + x] = cb;
            },
        );
    }

    for x in 0..width {
        blur_line(
            height,
            r,
            &dv,
            &mut stack,
            |y| {
                let idx = y * width + x;
                [red[idx] as u32, green[idx] as u32, blue[idx] as u32]
            },
            |y, [cr, cg, cb]| {
                let idx = y * width + x;
                let alpha = (pixels[idx] >> 24) as u8;
                pixels[idx] = pack_argb(alpha, cr, cg, cb);
            },
        );
    }

    Ok(())
}

/// Blur one row or column of `len` samples.
///
/// `sample(i)` reads the RGB triple at index `i` (always in `0..len`) and
/// `emit(i, rgb)` receives the blurred value for index `i`.
fn blur_line<S, E>(
    len: usize,
    r: usize,
    dv: &[u8],
    stack: &mut [[u32; 3]],
    sample: S,
    mut emit: E,
) where
    S: Fn(usize) -> [u32; 3],
    E: FnMut(usize, [u8; 3]),
{
    let div = stack.len();
    let last = len - 1;

    let mut sum = [0u32; 3];
    let mut in_sum = [0u32; 3];
    let mut out_sum = [0u32; 3];

    // Prime the stack with offsets -r..=r around index 0
    for (slot, entry) in stack.iter_mut().enumerate() {
        let offset = slot as isize - r as isize;
        let value = sample((offset.max(0) as usize).min(last));
        *entry = value;
        let weight = (r + 1) as u32 - offset.unsigned_abs() as u32;
        for c in 0..3 {
            sum[c] += value[c] * weight;
            if offset > 0 {
                in_sum[c] += value[c];
            } else {
                out_sum[c] += value[c];
            }
        }
    }

    let mut pointer = r;
    for i in 0..len {
        emit(
            i,
            [
                dv[sum[0] as usize],
                dv[sum[1] as usize],
                dv[sum[2] as usize],
            ],
        );

        // Drop the oldest sample and push the one entering on the right
        let start = (pointer + div - r) % div;
        let incoming = sample((i + r + 1).min(last));
        let outgoing = stack[start];
        stack[start] = incoming;
        for c in 0..3 {
            sum[c] -= out_sum[c];
            out_sum[c] -= outgoing[c];
            in_sum[c] += incoming[c];
            sum[c] += in_sum[c];
        }

        // The next center moves from the incoming half to the outgoing half
        pointer = (pointer + 1) % div;
        let center = stack[pointer];
        for c in 0..3 {
            out_sum[c] += center[c];
            in_sum[c] -= center[c];
        }
    }
}

/// Blur a copy of `image`, leaving the original untouched.
pub fn blurred(image: &RasterImage, radius: u8) -> Result<RasterImage> {
    check_radius(radius)?;
    let mut copy = image.clone();
    blur_in_place(&mut copy, radius)?;
    Ok(copy)
}

/// Blur a reference-counted image in place.
///
/// # Errors
///
/// Returns `Error::UnsupportedOperation` if other handles to the same image
/// exist; duplicate the image first in that case. Returns
/// `Error::InvalidArgument` for an out-of-range radius. The buffer is
/// untouched on error.
pub fn blur_shared(image: &mut Arc<RasterImage>, radius: u8) -> Result<()> {
    check_radius(radius)?;
    let (strong, weak) = (Arc::strong_count(image), Arc::weak_count(image));
    let exclusive = Arc::get_mut(image).ok_or_else(|| {
        Error::UnsupportedOperation(format!(
            "cannot blur in place: buffer has {strong} strong and {weak} weak handles"
        ))
    })?;
    blur_in_place(exclusive, radius)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
