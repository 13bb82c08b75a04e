// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for ocrprep.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Horizontal and vertical resolution of an image frame, in dots per inch.
///
/// Both values are always positive. Axes the image does not describe carry
/// the configured default resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionInfo {
    pub dpi_x: u32,
    pub dpi_y: u32,
}

impl ResolutionInfo {
    pub fn new(dpi_x: u32, dpi_y: u32) -> Self {
        Self { dpi_x, dpi_y }
    }

    /// Same resolution on both axes.
    pub fn uniform(dpi: u32) -> Self {
        Self { dpi_x: dpi, dpi_y: dpi }
    }
}

impl std::fmt::Display for ResolutionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} dpi", self.dpi_x, self.dpi_y)
    }
}

/// Image container formats the decoding front door knows how to read
/// resolution metadata from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFileFormat {
    Png,
    Jpeg,
    Tiff,
    Gif,
    Bmp,
    WebP,
    Pnm,
    Jpeg2000,
    /// Anything else the codec could decode.
    Other,
}

impl ImageFileFormat {
    /// Short format tag as used by OCR engines and image readers.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Tiff => "tiff",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::WebP => "webp",
            Self::Pnm => "pnm",
            Self::Jpeg2000 => "jpeg2000",
            Self::Other => "other",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "tif" | "tiff" => Self::Tiff,
            "gif" => Self::Gif,
            "bmp" => Self::Bmp,
            "webp" => Self::WebP,
            "pbm" | "pgm" | "ppm" | "pnm" => Self::Pnm,
            "jp2" | "j2k" | "jpf" | "jpx" | "jpm" => Self::Jpeg2000,
            _ => Self::Other,
        }
    }

    /// Whether the container can carry physical resolution metadata we read.
    pub fn carries_resolution(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg | Self::Tiff | Self::WebP)
    }
}

/// Declared format tag of an image file, derived from its name.
///
/// The tag is the text after the last `.`; the netpbm family collapses to
/// `pnm` and the JPEG 2000 family to `jpeg2000`. Any other extension is
/// returned as written. A name without a dot yields the whole name.
pub fn image_file_format(path: impl AsRef<Path>) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name.as_str(),
    };
    match ext {
        "pbm" | "pgm" | "ppm" => "pnm".to_string(),
        "jp2" | "j2k" | "jpf" | "jpx" | "jpm" => "jpeg2000".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tag_plain_extension() {
        assert_eq!(image_file_format("test-data/eurotext.png"), "png");
        assert_eq!(image_file_format("scan.tif"), "tif");
    }

    #[test]
    fn format_tag_netpbm_family() {
        assert_eq!(image_file_format("scan.pbm"), "pnm");
        assert_eq!(image_file_format("scan.pgm"), "pnm");
        assert_eq!(image_file_format("scan.ppm"), "pnm");
    }

    #[test]
    fn format_tag_jpeg2000_family() {
        assert_eq!(image_file_format("image.jp2"), "jpeg2000");
        assert_eq!(image_file_format("image.jpx"), "jpeg2000");
        assert_eq!(image_file_format("image.jpm"), "jpeg2000");
    }

    #[test]
    fn format_tag_uses_last_dot_only() {
        assert_eq!(image_file_format("archive.page1.jpg"), "jpg");
        assert_eq!(image_file_format("README"), "README");
    }

    #[test]
    fn typed_format_from_extension() {
        assert_eq!(ImageFileFormat::from_extension("JPG"), ImageFileFormat::Jpeg);
        assert_eq!(ImageFileFormat::from_extension("pgm"), ImageFileFormat::Pnm);
        assert_eq!(ImageFileFormat::from_extension("j2k").tag(), "jpeg2000");
        assert_eq!(ImageFileFormat::from_extension("xcf"), ImageFileFormat::Other);
    }

    #[test]
    fn resolution_display() {
        assert_eq!(ResolutionInfo::new(300, 150).to_string(), "300x150 dpi");
        assert_eq!(ResolutionInfo::uniform(72).to_string(), "72x72 dpi");
    }
}
