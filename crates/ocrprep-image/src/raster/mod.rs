// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — colour models and the tagged pixel sample store.

pub mod frame;
pub mod model;

pub use frame::{OtherSamples, PixelStorage, RasterImage};
pub use model::{ColorModel, ColorSpace, Palette};
