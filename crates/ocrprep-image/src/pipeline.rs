// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-call preparation of a frame for an OCR engine.

use ocrprep_core::config::PrepConfig;
use ocrprep_core::error::Result;
use ocrprep_core::types::ResolutionInfo;
use tracing::{info, instrument};

use crate::convert::{PixelBufferConverter, PixelByteBuffer};
use crate::metadata::resolution::ResolutionMetadataExtractor;
use crate::metadata::tree::MetadataTree;
use crate::raster::RasterImage;

/// Everything an OCR engine needs about one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub buffer: PixelByteBuffer,
    pub resolution: ResolutionInfo,
}

/// Convert `image` and resolve its resolution from `metadata`, honouring the
/// configured default resolution and metadata policy.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn prepare(
    image: &RasterImage,
    metadata: Option<&MetadataTree>,
    config: &PrepConfig,
) -> Result<PreparedImage> {
    let extractor = ResolutionMetadataExtractor::from_config(config)?;
    let resolution = extractor.extract_with_policy(metadata, config.metadata_policy)?;
    let buffer = PixelBufferConverter::convert(image)?;

    info!(
        len = buffer.len(),
        channels = buffer.channels(),
        %resolution,
        "Frame prepared for OCR"
    );
    Ok(PreparedImage { buffer, resolution })
}
