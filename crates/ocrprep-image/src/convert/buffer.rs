// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The canonical pixel buffer handed to OCR engines.

use std::ops::Deref;

/// Immutable, owned, contiguous 8-bit samples of a normalised raster.
///
/// Layout is row-major with `channels` interleaved samples per pixel and no
/// row padding, so the whole extent is consumable from offset 0. The buffer
/// never aliases storage owned by the source raster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelByteBuffer {
    data: Box<[u8]>,
    width: u32,
    height: u32,
    channels: usize,
}

impl PixelByteBuffer {
    /// Copy `samples` into a freshly allocated buffer.
    pub(crate) fn copy_from(samples: &[u8], width: u32, height: u32, channels: usize) -> Self {
        Self {
            data: samples.to_vec().into_boxed_slice(),
            width,
            height,
            channels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel after normalisation (1 for any grayscale fallback).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Stride of one row in bytes.
    pub fn bytes_per_line(&self) -> usize {
        self.width as usize * self.channels
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Hand the samples over to the caller.
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_vec()
    }
}

impl Deref for PixelByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for PixelByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
