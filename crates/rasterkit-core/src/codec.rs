//! Codec collaborator interface.
//!
//! The pipeline itself never parses or emits a bitstream. Decoding and
//! encoding go through the [`Decoder`] and [`Encoder`] traits; [`ImageCodec`]
//! is the stock implementation backed by the `image` crate.
//!
//! Any closure of shape `Fn(&RasterImage, ImageFormat, u8) -> Result<Vec<u8>, EncodeError>`
//! is also an [`Encoder`], which keeps test doubles short.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::raster::RasterImage;

/// Errors produced while decoding a container.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Errors produced while encoding a container.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The format cannot be encoded by this encoder.
    #[error("Unsupported output format: {0:?}")]
    UnsupportedFormat(ImageFormat),

    /// The underlying encoder failed.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Container formats the pipeline can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless; the quality parameter is ignored.
    Png,
    /// Lossy; quality 1-100.
    #[default]
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Whether the quality parameter changes the output.
    pub fn is_lossy(self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }
}

/// Turns container bytes into a raster.
pub trait Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError>;
}

/// Turns a raster into container bytes at a given quality.
pub trait Encoder {
    fn encode(
        &self,
        image: &RasterImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError>;
}

impl<F> Encoder for F
where
    F: Fn(&RasterImage, ImageFormat, u8) -> Result<Vec<u8>, EncodeError>,
{
    fn encode(
        &self,
        image: &RasterImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError> {
        self(image, format, quality)
    }
}

/// Codec backed by the `image` crate's PNG and JPEG support.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Decoder for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

        if reader.format().is_none() {
            return Err(DecodeError::InvalidFormat);
        }

        let img = reader
            .decode()
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

        RasterImage::from_rgba8(&img.into_rgba8())
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
    }
}

impl Encoder for ImageCodec {
    fn encode(
        &self,
        image: &RasterImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut buffer = Cursor::new(Vec::new());

        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel; quality 0 is not a valid setting
                let rgb = image.to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
                encoder
                    .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                    .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
            }
            ImageFormat::Png => {
                let rgba = image.to_rgba8();
                PngEncoder::new(&mut buffer)
                    .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
                    .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
            }
        }

        Ok(buffer.into_inner())
    }
}
