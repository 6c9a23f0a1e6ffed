//! Size-budgeted encoding.
//!
//! This module provides functionality for:
//! - Fitting an encoded image under a byte ceiling by lowering quality
//! - Falling back to a single proportional downscale when quality alone is not enough
//! - Optionally abandoning the search once a deadline passes
//!
//! The actual bitstream is produced by any [`Encoder`](crate::codec::Encoder);
//! [`ImageCodec`](crate::codec::ImageCodec) is the stock choice.
//!
//! # Examples
//!
//! ```ignore
//! use rasterkit_core::codec::{ImageCodec, ImageFormat};
//! use rasterkit_core::encode::{compress, CompressionBudget};
//!
//! let budget = CompressionBudget::new(100 * 1024, ImageFormat::Jpeg);
//! let bytes = compress(image, &budget, &ImageCodec)?;
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod budget;

pub use budget::{compress, compress_with_deadline, CompressionBudget};
