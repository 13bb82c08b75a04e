// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour models — how raw sample bits map to colour channels.

use serde::Serialize;

/// Colour lookup table of an indexed image. Entries are RGBA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    entries: Vec<[u8; 4]>,
}

impl Palette {
    /// Build an opaque palette from RGB entries.
    pub fn from_rgb(entries: &[[u8; 3]]) -> Self {
        Self {
            entries: entries.iter().map(|&[r, g, b]| [r, g, b, 255]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry; `None` when the index is outside the table.
    pub fn get(&self, index: usize) -> Option<[u8; 4]> {
        self.entries.get(index).copied()
    }
}

/// Channel layout of a pixel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColorSpace {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
    /// One palette index per pixel.
    Indexed(Palette),
}

impl ColorSpace {
    /// Number of stored samples per pixel.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray | Self::Indexed(_) => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba)
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed(_))
    }

    /// Short name used in metadata trees.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gray | Self::GrayAlpha => "GRAY",
            Self::Rgb | Self::Rgba | Self::Indexed(_) => "RGB",
        }
    }
}

/// Describes how a raster's samples are to be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorModel {
    pub space: ColorSpace,
    /// Bits per stored sample: 1, 2, 4, 8, 16 or 32 (float).
    pub bits_per_sample: u8,
    /// Colour samples have already been multiplied by alpha.
    pub alpha_premultiplied: bool,
}

impl ColorModel {
    pub fn new(space: ColorSpace, bits_per_sample: u8) -> Self {
        Self {
            space,
            bits_per_sample,
            alpha_premultiplied: false,
        }
    }

    /// 8-bit single channel grayscale, the shape of every grayscale fallback.
    pub fn gray8() -> Self {
        Self::new(ColorSpace::Gray, 8)
    }

    pub fn rgb8() -> Self {
        Self::new(ColorSpace::Rgb, 8)
    }

    pub fn rgba8() -> Self {
        Self::new(ColorSpace::Rgba, 8)
    }

    /// Indexed model with `bits_per_sample`-wide palette indices.
    pub fn indexed(palette: Palette, bits_per_sample: u8) -> Self {
        Self::new(ColorSpace::Indexed(palette), bits_per_sample)
    }

    /// Mark colour samples as premultiplied by alpha.
    pub fn premultiplied(mut self) -> Self {
        self.alpha_premultiplied = true;
        self
    }

    pub fn channels(&self) -> usize {
        self.space.channels()
    }

    /// True for the one layout the converter passes through untouched:
    /// a direct colour model with one unsigned byte per sample.
    pub fn is_byte_per_sample(&self) -> bool {
        self.bits_per_sample == 8 && !self.space.is_indexed()
    }
}
