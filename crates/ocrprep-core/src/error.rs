// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ocrprep.

use thiserror::Error;

/// Top-level error type for all ocrprep operations.
#[derive(Debug, Error)]
pub enum OcrPrepError {
    // -- Pixel normalisation --
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    // -- Resolution metadata --
    #[error("malformed resolution metadata: {0}")]
    MetadataParse(String),

    // -- Decoding (upstream codec) --
    #[error("image decoding failed: {0}")]
    ImageError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OcrPrepError {
    /// Whether this error came from parsing resolution metadata.
    ///
    /// Callers running with a lenient metadata policy use this to decide
    /// whether the default resolution may be substituted.
    pub fn is_metadata_parse(&self) -> bool {
        matches!(self, OcrPrepError::MetadataParse(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OcrPrepError>;
