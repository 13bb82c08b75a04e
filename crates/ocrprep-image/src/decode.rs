// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoding front door — encoded bytes to a raster plus its metadata tree.
//
// Pixel decoding is delegated to the `image` crate. Multi-frame containers
// yield their first frame.

use std::path::Path;

use ocrprep_core::error::{OcrPrepError, Result};
use ocrprep_core::types::ImageFileFormat;
use tracing::{info, instrument};

use crate::metadata::reader::read_standard_tree;
use crate::metadata::tree::MetadataTree;
use crate::raster::RasterImage;

/// A decoded frame together with whatever metadata its container carried.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub raster: RasterImage,
    /// `None` when the container has no resolution metadata at all.
    pub metadata: Option<MetadataTree>,
    pub format: ImageFileFormat,
}

/// Decode an encoded image held in memory.
///
/// # Errors
///
/// Returns [`OcrPrepError::ImageError`] if the format cannot be recognised or
/// the codec rejects the data, and [`OcrPrepError::UnsupportedPixelFormat`] if
/// the decoded pixel layout has no raster mapping.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_bytes(data: &[u8]) -> Result<DecodedImage> {
    let codec_format = image::guess_format(data).map_err(|err| {
        OcrPrepError::ImageError(format!("unrecognised image format: {}", err))
    })?;
    let decoded = image::load_from_memory_with_format(data, codec_format)
        .map_err(|err| OcrPrepError::ImageError(format!("failed to decode image: {}", err)))?;

    let raster = RasterImage::from_dynamic(&decoded)?;
    let format = file_format_of(codec_format);
    let metadata = read_standard_tree(data, format, raster.color_model());

    info!(
        width = raster.width(),
        height = raster.height(),
        format = format.tag(),
        has_metadata = metadata.is_some(),
        "Image decoded"
    );
    Ok(DecodedImage {
        raster,
        metadata,
        format,
    })
}

/// Read and decode an image file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedImage> {
    let data = std::fs::read(path.as_ref())?;
    decode_bytes(&data)
}

fn file_format_of(format: image::ImageFormat) -> ImageFileFormat {
    match format {
        image::ImageFormat::Png => ImageFileFormat::Png,
        image::ImageFormat::Jpeg => ImageFileFormat::Jpeg,
        image::ImageFormat::Tiff => ImageFileFormat::Tiff,
        image::ImageFormat::Gif => ImageFileFormat::Gif,
        image::ImageFormat::Bmp => ImageFileFormat::Bmp,
        image::ImageFormat::WebP => ImageFileFormat::WebP,
        image::ImageFormat::Pnm => ImageFileFormat::Pnm,
        _ => ImageFileFormat::Other,
    }
}
