// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrprep-image — Prepares decoded raster images for an OCR engine.
//
// Provides the raster model (colour model + tagged sample storage), conversion
// of any raster into a canonical byte-per-sample buffer (with grayscale
// fallback), a small metadata tree with a query interface, and resolution
// (DPI) extraction from that tree. A decoding front door builds rasters and
// metadata trees from encoded PNG, JPEG, TIFF and friends.

pub mod convert;
pub mod decode;
pub mod metadata;
pub mod pipeline;
pub mod raster;

// Re-export the primary types so callers can use `ocrprep_image::RasterImage` etc.
pub use convert::{PixelBufferConverter, PixelByteBuffer};
pub use decode::{DecodedImage, decode_bytes, decode_file};
pub use metadata::resolution::ResolutionMetadataExtractor;
pub use metadata::tree::{MetadataQuery, MetadataTree, NodeHandle};
pub use pipeline::{PreparedImage, prepare};
pub use raster::{ColorModel, ColorSpace, OtherSamples, Palette, PixelStorage, RasterImage};
