// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel buffer converter — turns any raster into the byte-per-sample layout
// OCR engines read.

use ocrprep_core::error::{OcrPrepError, Result};
use tracing::{debug, instrument};

use super::buffer::PixelByteBuffer;
use super::grayscale;
use crate::raster::{PixelStorage, RasterImage};

/// Converts raster images into [`PixelByteBuffer`]s.
///
/// Rasters already stored as one unsigned byte per channel sample are copied
/// verbatim. Everything else (sub-byte depths, palette indices, 16-bit or
/// float samples) is first reduced to an 8-bit grayscale intermediate, which
/// is then copied and dropped.
///
/// ```ignore
/// let raster = RasterImage::from_bytes(2, 1, ColorModel::rgb8(), vec![1, 2, 3, 4, 5, 6]);
/// let buffer = PixelBufferConverter::convert(&raster)?;
/// assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4, 5, 6]);
/// ```
pub struct PixelBufferConverter;

impl PixelBufferConverter {
    /// Convert `image` into a freshly allocated byte buffer.
    ///
    /// The returned buffer holds `width * height * channels` bytes, where
    /// `channels` is the source channel count for byte-per-sample rasters and
    /// 1 for everything reduced to grayscale.
    ///
    /// # Errors
    ///
    /// Returns [`OcrPrepError::UnsupportedPixelFormat`] if the raster has a zero
    /// dimension, its sample count disagrees with its geometry, or its colour
    /// model cannot be reduced to byte samples.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn convert(image: &RasterImage) -> Result<PixelByteBuffer> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrPrepError::UnsupportedPixelFormat(format!(
                "raster has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }

        match image.storage() {
            PixelStorage::ByteSamples(samples) => Self::copy_byte_samples(image, samples),
            PixelStorage::OtherSamples(samples) => {
                debug!(
                    bits = image.color_model().bits_per_sample,
                    indexed = image.color_model().space.is_indexed(),
                    "Samples are not byte-per-channel; reducing to grayscale"
                );
                let gray = grayscale::reduce(image, samples)?;
                match gray.storage() {
                    PixelStorage::ByteSamples(luma) => Self::copy_byte_samples(&gray, luma),
                    PixelStorage::OtherSamples(_) => Err(OcrPrepError::UnsupportedPixelFormat(
                        "grayscale intermediate is not byte-per-sample".into(),
                    )),
                }
            }
        }
    }

    fn copy_byte_samples(image: &RasterImage, samples: &[u8]) -> Result<PixelByteBuffer> {
        let channels = image.channels();
        let expected = image
            .pixel_count()
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| {
                OcrPrepError::UnsupportedPixelFormat("raster dimensions overflow".into())
            })?;
        if samples.len() != expected {
            return Err(OcrPrepError::UnsupportedPixelFormat(format!(
                "expected {} byte samples for {}x{}x{}, found {}",
                expected,
                image.width(),
                image.height(),
                channels,
                samples.len()
            )));
        }

        let buffer = PixelByteBuffer::copy_from(samples, image.width(), image.height(), channels);
        debug!(len = buffer.len(), channels, "Pixel buffer ready");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{ColorModel, ColorSpace, Palette};
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn byte_samples_pass_through_verbatim() {
        let samples: Vec<u8> = (0..24).collect();
        let raster = RasterImage::from_bytes(3, 2, ColorModel::rgba8(), samples.clone());

        let buffer = PixelBufferConverter::convert(&raster).unwrap();
        assert_eq!(buffer.as_bytes(), samples.as_slice());
        assert_eq!(buffer.len(), 3 * 2 * 4);
        assert_eq!(buffer.channels(), 4);
    }

    #[test]
    fn decoded_rgb_image_keeps_three_channels() {
        let mut img = RgbImage::new(4, 3);
        img.put_pixel(2, 1, Rgb([200, 100, 50]));
        let raster = RasterImage::from_dynamic(&DynamicImage::ImageRgb8(img.clone())).unwrap();

        let buffer = PixelBufferConverter::convert(&raster).unwrap();
        assert_eq!(buffer.len(), 4 * 3 * 3);
        assert_eq!(buffer.into_vec(), img.into_raw());
    }

    #[test]
    fn non_byte_samples_become_single_channel() {
        let model = ColorModel::new(ColorSpace::Rgba, 16);
        let raster = RasterImage::from_words(5, 4, model, vec![0; 80]);

        let buffer = PixelBufferConverter::convert(&raster).unwrap();
        assert_eq!(buffer.len(), 5 * 4);
        assert_eq!(buffer.channels(), 1);
    }

    #[test]
    fn sub_byte_colour_rasters_become_single_channel() {
        let model = ColorModel::new(ColorSpace::Rgb, 4);
        let rgb = RasterImage::from_bytes(1, 1, model, vec![0xFF, 0xF0]);
        assert_eq!(PixelBufferConverter::convert(&rgb).unwrap().as_bytes(), &[255]);

        let model = ColorModel::new(ColorSpace::GrayAlpha, 4);
        let gray_alpha = RasterImage::from_bytes(2, 1, model, vec![0xFF, 0x0F]);
        let buffer = PixelBufferConverter::convert(&gray_alpha).unwrap();
        assert_eq!(buffer.as_bytes(), &[255, 0]);
        assert_eq!(buffer.channels(), 1);
    }

    #[test]
    fn indexed_rasters_become_single_channel() {
        let palette = Palette::from_rgb(&[[255, 255, 255], [0, 0, 0]]);
        let model = ColorModel::indexed(palette, 1);
        let raster = RasterImage::from_bytes(8, 2, model, vec![0x0F, 0xF0]);

        let buffer = PixelBufferConverter::convert(&raster).unwrap();
        assert_eq!(
            buffer.as_bytes(),
            &[255, 255, 255, 255, 0, 0, 0, 0, 0, 0, 0, 0, 255, 255, 255, 255]
        );
    }

    #[test]
    fn single_pixel_boundaries() {
        let gray16 =
            RasterImage::from_words(1, 1, ColorModel::new(ColorSpace::Gray, 16), vec![65535]);
        assert_eq!(PixelBufferConverter::convert(&gray16).unwrap().as_bytes(), &[255]);

        let rgb8 = RasterImage::from_bytes(1, 1, ColorModel::rgb8(), vec![9, 8, 7]);
        assert_eq!(PixelBufferConverter::convert(&rgb8).unwrap().as_bytes(), &[9, 8, 7]);
    }

    #[test]
    fn conversion_is_idempotent() {
        let raster = RasterImage::from_floats(
            2,
            2,
            ColorModel::new(ColorSpace::Rgb, 32),
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 0.0, 0.5],
        );

        let first = PixelBufferConverter::convert(&raster).unwrap();
        let second = PixelBufferConverter::convert(&raster).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_sized_raster_is_rejected() {
        let raster = RasterImage::from_bytes(0, 10, ColorModel::gray8(), Vec::new());
        assert!(matches!(
            PixelBufferConverter::convert(&raster),
            Err(OcrPrepError::UnsupportedPixelFormat(_))
        ));
    }

    #[test]
    fn truncated_byte_samples_are_rejected_not_truncated() {
        let raster = RasterImage::from_bytes(2, 2, ColorModel::rgb8(), vec![0; 11]);
        assert!(matches!(
            PixelBufferConverter::convert(&raster),
            Err(OcrPrepError::UnsupportedPixelFormat(_))
        ));
    }
}
