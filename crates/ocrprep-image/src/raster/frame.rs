// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster images with an explicitly tagged sample store.
//
// Whether a raster's samples are already one unsigned byte per channel is
// decided once, when the raster is built, and recorded in `PixelStorage`.
// Nothing downstream inspects sample types at runtime.

use image::DynamicImage;
use ocrprep_core::error::{OcrPrepError, Result};
use tracing::debug;

use super::model::{ColorModel, ColorSpace};

/// Samples that are not one unsigned byte per channel.
#[derive(Debug, Clone, PartialEq)]
pub enum OtherSamples {
    /// Sub-byte samples of any colour space, or palette indices of 1 to 8
    /// bits. Samples are packed most-significant-bit first, channels
    /// interleaved; every row starts on a byte boundary.
    Packed(Vec<u8>),
    /// 16-bit samples.
    Words(Vec<u16>),
    /// 32-bit float samples, nominally in `0.0..=1.0`.
    Floats(Vec<f32>),
}

/// Tagged pixel sample store.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelStorage {
    /// One unsigned byte per channel sample, row-major, no padding.
    ByteSamples(Vec<u8>),
    OtherSamples(OtherSamples),
}

impl PixelStorage {
    pub fn is_byte_samples(&self) -> bool {
        matches!(self, Self::ByteSamples(_))
    }
}

/// A decoded 2-D grid of pixel samples plus its colour model.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    model: ColorModel,
    storage: PixelStorage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Build a raster from byte data.
    ///
    /// A direct colour model at 8 bits per sample is stored as
    /// [`PixelStorage::ByteSamples`]; anything else (sub-byte depths,
    /// palette indices) is stored as [`OtherSamples::Packed`].
    pub fn from_bytes(width: u32, height: u32, model: ColorModel, data: Vec<u8>) -> Self {
        let storage = if model.is_byte_per_sample() {
            PixelStorage::ByteSamples(data)
        } else {
            PixelStorage::OtherSamples(OtherSamples::Packed(data))
        };
        Self {
            width,
            height,
            model,
            storage,
        }
    }

    /// Build a raster from 16-bit samples.
    pub fn from_words(width: u32, height: u32, model: ColorModel, data: Vec<u16>) -> Self {
        Self {
            width,
            height,
            model,
            storage: PixelStorage::OtherSamples(OtherSamples::Words(data)),
        }
    }

    /// Build a raster from 32-bit float samples.
    pub fn from_floats(width: u32, height: u32, model: ColorModel, data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            model,
            storage: PixelStorage::OtherSamples(OtherSamples::Floats(data)),
        }
    }

    /// Wrap the pixels of an image decoded by the `image` crate.
    ///
    /// 8-bit variants become byte samples, 16-bit variants words and 32-bit
    /// float variants floats. Sample data is copied; the decoded image is not
    /// retained.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let raster = match image {
            DynamicImage::ImageLuma8(buf) => {
                Self::from_bytes(width, height, ColorModel::gray8(), buf.as_raw().clone())
            }
            DynamicImage::ImageLumaA8(buf) => Self::from_bytes(
                width,
                height,
                ColorModel::new(ColorSpace::GrayAlpha, 8),
                buf.as_raw().clone(),
            ),
            DynamicImage::ImageRgb8(buf) => {
                Self::from_bytes(width, height, ColorModel::rgb8(), buf.as_raw().clone())
            }
            DynamicImage::ImageRgba8(buf) => {
                Self::from_bytes(width, height, ColorModel::rgba8(), buf.as_raw().clone())
            }
            DynamicImage::ImageLuma16(buf) => Self::from_words(
                width,
                height,
                ColorModel::new(ColorSpace::Gray, 16),
                buf.as_raw().clone(),
            ),
            DynamicImage::ImageLumaA16(buf) => Self::from_words(
                width,
                height,
                ColorModel::new(ColorSpace::GrayAlpha, 16),
                buf.as_raw().clone(),
            ),
            DynamicImage::ImageRgb16(buf) => Self::from_words(
                width,
                height,
                ColorModel::new(ColorSpace::Rgb, 16),
                buf.as_raw().clone(),
            ),
            DynamicImage::ImageRgba16(buf) => Self::from_words(
                width,
                height,
                ColorModel::new(ColorSpace::Rgba, 16),
                buf.as_raw().clone(),
            ),
            DynamicImage::ImageRgb32F(buf) => Self::from_floats(
                width,
                height,
                ColorModel::new(ColorSpace::Rgb, 32),
                buf.as_raw().clone(),
            ),
            DynamicImage::ImageRgba32F(buf) => Self::from_floats(
                width,
                height,
                ColorModel::new(ColorSpace::Rgba, 32),
                buf.as_raw().clone(),
            ),
            other => {
                return Err(OcrPrepError::UnsupportedPixelFormat(format!(
                    "decoded colour type {:?} has no raster mapping",
                    other.color()
                )));
            }
        };
        debug!(
            width,
            height,
            bits = raster.model.bits_per_sample,
            byte_samples = raster.storage.is_byte_samples(),
            "Raster built from decoded image"
        );
        Ok(raster)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_model(&self) -> &ColorModel {
        &self.model
    }

    pub fn storage(&self) -> &PixelStorage {
        &self.storage
    }

    /// Samples per pixel as stored.
    pub fn channels(&self) -> usize {
        self.model.channels()
    }

    /// Number of pixels, or `None` if it does not fit in memory arithmetic.
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}
