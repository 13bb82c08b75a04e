// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metadata module — format-neutral metadata trees, the standard tree reader
// for PNG/JPEG/EXIF containers, and resolution (DPI) extraction.

pub mod reader;
pub mod resolution;
pub mod tree;

pub use reader::read_standard_tree;
pub use resolution::ResolutionMetadataExtractor;
pub use tree::{MetadataQuery, MetadataTree, NodeHandle};
