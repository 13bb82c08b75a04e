// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale reinterpretation of rasters whose samples are not one byte each.
//
// Samples are first expanded into an `image` crate buffer (unpacking sub-byte
// depths, resolving palette indices, undoing premultiplied alpha) and then
// reduced with the crate's perceptual luma weighting. Single-channel sources
// are only rescaled to 8 bits. The result is always a new allocation.

use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};
use ocrprep_core::error::{OcrPrepError, Result};
use tracing::debug;

use crate::raster::{ColorModel, ColorSpace, OtherSamples, RasterImage};

/// Produce an 8-bit single-channel copy of `image`, whose samples are `samples`.
pub(crate) fn reduce(image: &RasterImage, samples: &OtherSamples) -> Result<RasterImage> {
    let (width, height) = (image.width(), image.height());
    let model = image.color_model();

    let luma = match samples {
        OtherSamples::Packed(data) => reduce_packed(width, height, model, data)?,
        OtherSamples::Words(data) => reduce_words(width, height, model, data)?,
        OtherSamples::Floats(data) => reduce_floats(width, height, model, data)?,
    };

    debug!(
        width,
        height,
        source_bits = model.bits_per_sample,
        "Grayscale intermediate built"
    );
    Ok(RasterImage::from_bytes(width, height, ColorModel::gray8(), luma))
}

// -- Packed (sub-byte and indexed) --------------------------------------------

fn reduce_packed(width: u32, height: u32, model: &ColorModel, data: &[u8]) -> Result<Vec<u8>> {
    let bits = model.bits_per_sample;
    if !matches!(bits, 1 | 2 | 4 | 8) {
        return Err(unsupported(format!(
            "packed samples must be 1, 2, 4 or 8 bits wide, got {bits}"
        )));
    }

    let channels = model.channels();
    let values = unpack_samples(data, width, height, channels, bits)?;

    if let ColorSpace::Indexed(palette) = &model.space {
        let mut rgba = Vec::with_capacity(values.len() * 4);
        for index in values {
            let entry = palette.get(index as usize).ok_or_else(|| {
                unsupported(format!(
                    "palette index {index} outside a table of {} entries",
                    palette.len()
                ))
            })?;
            rgba.extend_from_slice(&entry);
        }
        let buffer = wrap::<Rgba<u8>>(width, height, rgba)?;
        return Ok(DynamicImage::ImageRgba8(buffer).to_luma8().into_raw());
    }

    let max = (1u16 << bits) - 1;
    let mut samples: Vec<u8> = values
        .into_iter()
        .map(|v| ((v as u16 * 255 + max / 2) / max) as u8)
        .collect();
    if model.alpha_premultiplied && model.space.has_alpha() {
        unpremultiply_bytes(&mut samples, channels);
    }

    let dynamic = match model.space {
        ColorSpace::GrayAlpha => {
            DynamicImage::ImageLumaA8(wrap::<LumaA<u8>>(width, height, samples)?)
        }
        ColorSpace::Rgb => DynamicImage::ImageRgb8(wrap::<Rgb<u8>>(width, height, samples)?),
        ColorSpace::Rgba => DynamicImage::ImageRgba8(wrap::<Rgba<u8>>(width, height, samples)?),
        ColorSpace::Gray | ColorSpace::Indexed(_) => return Ok(samples),
    };
    Ok(dynamic.to_luma8().into_raw())
}

/// Unpack MSB-first samples of `bits` width, `channels` per pixel; each row
/// starts on a byte boundary.
fn unpack_samples(
    data: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    bits: u8,
) -> Result<Vec<u8>> {
    let bits = bits as usize;
    let row_samples = sample_count(width, 1, channels)?;
    let stride = row_samples
        .checked_mul(bits)
        .ok_or_else(|| unsupported("raster dimensions overflow".into()))?
        .div_ceil(8);
    let expected = stride
        .checked_mul(height as usize)
        .ok_or_else(|| unsupported("raster dimensions overflow".into()))?;
    check_len(data.len(), expected)?;
    if stride == 0 {
        return Ok(Vec::new());
    }

    let mask = ((1u16 << bits) - 1) as u8;
    let mut values = Vec::with_capacity(row_samples * height as usize);
    for row in data.chunks_exact(stride) {
        for i in 0..row_samples {
            let bit_offset = i * bits;
            let shift = 8 - bits - (bit_offset % 8);
            values.push((row[bit_offset / 8] >> shift) & mask);
        }
    }
    Ok(values)
}

fn unpremultiply_bytes(samples: &mut [u8], channels: usize) {
    for pixel in samples.chunks_exact_mut(channels) {
        let (color, alpha) = pixel.split_at_mut(channels - 1);
        let a = alpha[0] as u16;
        for c in color {
            *c = if a == 0 {
                0
            } else {
                ((*c as u16 * 255 + a / 2) / a).min(255) as u8
            };
        }
    }
}

// -- 16-bit words -------------------------------------------------------------

fn reduce_words(width: u32, height: u32, model: &ColorModel, data: &[u16]) -> Result<Vec<u8>> {
    if model.bits_per_sample != 16 {
        return Err(unsupported(format!(
            "16-bit storage declared as {} bits per sample",
            model.bits_per_sample
        )));
    }
    let channels = model.channels();
    check_len(data.len(), sample_count(width, height, channels)?)?;

    let mut samples = data.to_vec();
    if model.alpha_premultiplied && model.space.has_alpha() {
        unpremultiply_words(&mut samples, channels);
    }

    let dynamic = match model.space {
        ColorSpace::Gray => DynamicImage::ImageLuma16(wrap::<Luma<u16>>(width, height, samples)?),
        ColorSpace::GrayAlpha => {
            DynamicImage::ImageLumaA16(wrap::<LumaA<u16>>(width, height, samples)?)
        }
        ColorSpace::Rgb => DynamicImage::ImageRgb16(wrap::<Rgb<u16>>(width, height, samples)?),
        ColorSpace::Rgba => DynamicImage::ImageRgba16(wrap::<Rgba<u16>>(width, height, samples)?),
        ColorSpace::Indexed(_) => {
            return Err(unsupported("palette indices cannot be 16-bit words".into()));
        }
    };
    Ok(dynamic.to_luma8().into_raw())
}

fn unpremultiply_words(samples: &mut [u16], channels: usize) {
    for pixel in samples.chunks_exact_mut(channels) {
        let (color, alpha) = pixel.split_at_mut(channels - 1);
        let a = alpha[0] as u32;
        for c in color {
            *c = if a == 0 {
                0
            } else {
                ((*c as u32 * 65535 + a / 2) / a).min(65535) as u16
            };
        }
    }
}

// -- 32-bit floats ------------------------------------------------------------

fn reduce_floats(width: u32, height: u32, model: &ColorModel, data: &[f32]) -> Result<Vec<u8>> {
    if model.bits_per_sample != 32 {
        return Err(unsupported(format!(
            "float storage declared as {} bits per sample",
            model.bits_per_sample
        )));
    }
    let channels = model.channels();
    check_len(data.len(), sample_count(width, height, channels)?)?;

    let mut samples = data.to_vec();
    if model.alpha_premultiplied && model.space.has_alpha() {
        unpremultiply_floats(&mut samples, channels);
    }

    match model.space {
        // No single-channel float buffer in `image`; scale directly.
        ColorSpace::Gray | ColorSpace::GrayAlpha => Ok(samples
            .chunks_exact(channels)
            .map(|pixel| float_to_byte(pixel[0]))
            .collect()),
        ColorSpace::Rgb => Ok(DynamicImage::ImageRgb32F(wrap::<Rgb<f32>>(width, height, samples)?)
            .to_luma8()
            .into_raw()),
        ColorSpace::Rgba => Ok(
            DynamicImage::ImageRgba32F(wrap::<Rgba<f32>>(width, height, samples)?)
                .to_luma8()
                .into_raw(),
        ),
        ColorSpace::Indexed(_) => Err(unsupported("palette indices cannot be floats".into())),
    }
}

fn unpremultiply_floats(samples: &mut [f32], channels: usize) {
    for pixel in samples.chunks_exact_mut(channels) {
        let (color, alpha) = pixel.split_at_mut(channels - 1);
        let a = alpha[0];
        for c in color {
            *c = if a > 0.0 { *c / a } else { 0.0 };
        }
    }
}

fn float_to_byte(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

// -- Helpers ------------------------------------------------------------------

fn wrap<P: image::Pixel>(
    width: u32,
    height: u32,
    samples: Vec<P::Subpixel>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    ImageBuffer::from_raw(width, height, samples)
        .ok_or_else(|| unsupported("sample buffer does not match raster dimensions".into()))
}

fn sample_count(width: u32, height: u32, channels: usize) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| unsupported("raster dimensions overflow".into()))
}

fn check_len(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(unsupported(format!(
            "expected {expected} samples, found {actual}"
        )));
    }
    Ok(())
}

fn unsupported(reason: String) -> OcrPrepError {
    OcrPrepError::UnsupportedPixelFormat(reason)
}
