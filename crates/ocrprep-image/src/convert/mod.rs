// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion module — raster images to OCR-ready byte buffers, with a
// grayscale fallback for anything not stored as one byte per sample.

pub mod buffer;
pub mod converter;
mod grayscale;

pub use buffer::PixelByteBuffer;
pub use converter::PixelBufferConverter;
