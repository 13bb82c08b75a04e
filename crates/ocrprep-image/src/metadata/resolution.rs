// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resolution extraction — derives horizontal and vertical DPI from the pixel
// pitch recorded in a metadata tree.

use ocrprep_core::config::{MetadataPolicy, PrepConfig};
use ocrprep_core::error::{OcrPrepError, Result};
use ocrprep_core::types::ResolutionInfo;
use tracing::{debug, instrument, warn};

use super::tree::{MetadataQuery, MetadataTree};

/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// Node holding the width of one pixel in millimetres.
pub const HORIZONTAL_PIXEL_SIZE: &str = "HorizontalPixelSize";

/// Node holding the height of one pixel in millimetres.
pub const VERTICAL_PIXEL_SIZE: &str = "VerticalPixelSize";

/// Reads DPI from metadata trees, defaulting axes the tree does not describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionMetadataExtractor {
    default_dpi: u32,
}

impl ResolutionMetadataExtractor {
    /// Create an extractor that falls back to `default_dpi`, the resolution
    /// the host would report for its screen.
    ///
    /// # Errors
    ///
    /// Returns [`OcrPrepError::Config`] if `default_dpi` is zero.
    pub fn new(default_dpi: u32) -> Result<Self> {
        if default_dpi == 0 {
            return Err(OcrPrepError::Config(
                "default resolution must be positive".into(),
            ));
        }
        Ok(Self { default_dpi })
    }

    pub fn from_config(config: &PrepConfig) -> Result<Self> {
        Self::new(config.default_dpi)
    }

    pub fn default_dpi(&self) -> u32 {
        self.default_dpi
    }

    /// Resolution of a frame whose metadata tree may be absent.
    ///
    /// No tree means the default resolution on both axes.
    ///
    /// # Errors
    ///
    /// Returns [`OcrPrepError::MetadataParse`] if a pixel-size value is not a
    /// positive number or yields a resolution outside `1..=u32::MAX`.
    pub fn extract(&self, tree: Option<&MetadataTree>) -> Result<ResolutionInfo> {
        match tree {
            Some(tree) => self.extract_from(tree),
            None => {
                debug!(dpi = self.default_dpi, "No metadata tree; using default resolution");
                Ok(ResolutionInfo::uniform(self.default_dpi))
            }
        }
    }

    /// Resolution described by any queryable tree. Each axis is resolved
    /// independently; the first matching node in document order wins.
    #[instrument(skip_all)]
    pub fn extract_from<Q: MetadataQuery + ?Sized>(&self, tree: &Q) -> Result<ResolutionInfo> {
        let dpi_x = self.axis_dpi(tree, HORIZONTAL_PIXEL_SIZE)?;
        let dpi_y = self.axis_dpi(tree, VERTICAL_PIXEL_SIZE)?;
        debug!(dpi_x, dpi_y, "Resolution extracted");
        Ok(ResolutionInfo::new(dpi_x, dpi_y))
    }

    /// Like [`extract`](Self::extract), but under [`MetadataPolicy::Lenient`]
    /// an axis whose value cannot be parsed takes the default resolution
    /// instead of failing.
    pub fn extract_with_policy(
        &self,
        tree: Option<&MetadataTree>,
        policy: MetadataPolicy,
    ) -> Result<ResolutionInfo> {
        let Some(tree) = tree else {
            return self.extract(None);
        };
        match policy {
            MetadataPolicy::Strict => self.extract_from(tree),
            MetadataPolicy::Lenient => Ok(ResolutionInfo::new(
                self.lenient_axis_dpi(tree, HORIZONTAL_PIXEL_SIZE)?,
                self.lenient_axis_dpi(tree, VERTICAL_PIXEL_SIZE)?,
            )),
        }
    }

    fn axis_dpi<Q: MetadataQuery + ?Sized>(&self, tree: &Q, tag: &str) -> Result<u32> {
        let Some(node) = tree.find_first(tag) else {
            debug!(tag, dpi = self.default_dpi, "No pixel size node; using default");
            return Ok(self.default_dpi);
        };
        let value = tree.attribute_value(node, 0).ok_or_else(|| {
            OcrPrepError::MetadataParse(format!("{tag} node carries no value"))
        })?;
        pitch_to_dpi(value).map_err(|reason| {
            OcrPrepError::MetadataParse(format!("{tag} value {value:?}: {reason}"))
        })
    }

    fn lenient_axis_dpi<Q: MetadataQuery + ?Sized>(&self, tree: &Q, tag: &str) -> Result<u32> {
        match self.axis_dpi(tree, tag) {
            Err(err) if err.is_metadata_parse() => {
                warn!(tag, error = %err, dpi = self.default_dpi, "Ignoring malformed pixel size");
                Ok(self.default_dpi)
            }
            other => other,
        }
    }
}

/// Convert a pixel pitch in millimetres, as text, into whole dots per inch.
///
/// Rounds half away from zero.
fn pitch_to_dpi(value: &str) -> std::result::Result<u32, String> {
    let pitch: f32 = value
        .trim()
        .parse()
        .map_err(|err| format!("not a number ({err})"))?;
    if !pitch.is_finite() || pitch <= 0.0 {
        return Err("pixel size must be a positive finite number".into());
    }
    let dpi = (MM_PER_INCH / pitch).round();
    if !(1.0..=u32::MAX as f32).contains(&dpi) {
        return Err(format!("resolution {dpi} is out of range"));
    }
    Ok(dpi as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(entries: &[(&str, &str)]) -> MetadataTree {
        let mut tree = MetadataTree::new("StandardMetadata");
        let root = tree.root();
        let dimension = tree.add_child(root, "Dimension");
        for (tag, value) in entries {
            let node = tree.add_child(dimension, *tag);
            tree.set_attribute(node, "value", *value);
        }
        tree
    }

    fn extractor() -> ResolutionMetadataExtractor {
        ResolutionMetadataExtractor::new(96).unwrap()
    }

    #[test]
    fn absent_tree_uses_default_on_both_axes() {
        assert_eq!(extractor().extract(None).unwrap(), ResolutionInfo::new(96, 96));
    }

    #[test]
    fn tenth_of_a_millimetre_is_254_dpi() {
        let tree = tree_with(&[(HORIZONTAL_PIXEL_SIZE, "0.1"), (VERTICAL_PIXEL_SIZE, "0.1")]);
        assert_eq!(
            extractor().extract(Some(&tree)).unwrap(),
            ResolutionInfo::new(254, 254)
        );
    }

    #[test]
    fn missing_horizontal_axis_falls_back_alone() {
        let tree = tree_with(&[(VERTICAL_PIXEL_SIZE, "0.0847")]);
        assert_eq!(
            extractor().extract(Some(&tree)).unwrap(),
            ResolutionInfo::new(96, 300)
        );
    }

    #[test]
    fn tree_without_pixel_sizes_is_all_default() {
        let tree = tree_with(&[]);
        assert_eq!(
            extractor().extract(Some(&tree)).unwrap(),
            ResolutionInfo::uniform(96)
        );
    }

    #[test]
    fn first_duplicate_wins() {
        let tree = tree_with(&[
            (HORIZONTAL_PIXEL_SIZE, "0.254"),
            (HORIZONTAL_PIXEL_SIZE, "0.1"),
        ]);
        assert_eq!(extractor().extract(Some(&tree)).unwrap().dpi_x, 100);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        // 25.4 / 0.1016 = 250.0; 25.4 / 0.33866 ~= 75.0015
        assert_eq!(pitch_to_dpi("0.1016"), Ok(250));
        assert_eq!(pitch_to_dpi("0.33866"), Ok(75));
        // 25.4 / 0.3528 ~= 71.995 -> 72
        assert_eq!(pitch_to_dpi(" 0.3528 "), Ok(72));
        // Both quotients are exact in f32: 2.5 and 0.5 round up, not to even.
        assert_eq!(pitch_to_dpi("10.16"), Ok(3));
        assert_eq!(pitch_to_dpi("50.8"), Ok(1));
    }

    #[test]
    fn malformed_pitch_is_an_error() {
        let tree = tree_with(&[(HORIZONTAL_PIXEL_SIZE, "wide")]);
        let err = extractor().extract(Some(&tree)).unwrap_err();
        assert!(matches!(err, OcrPrepError::MetadataParse(_)));
    }

    #[test]
    fn zero_and_negative_pitch_are_errors() {
        assert!(pitch_to_dpi("0").is_err());
        assert!(pitch_to_dpi("-0.1").is_err());
        assert!(pitch_to_dpi("NaN").is_err());
        // 25.4 / 100 rounds to 0 dpi.
        assert!(pitch_to_dpi("100").is_err());
    }

    #[test]
    fn node_without_attributes_is_an_error() {
        let mut tree = MetadataTree::new("StandardMetadata");
        let root = tree.root();
        tree.add_child(root, HORIZONTAL_PIXEL_SIZE);
        assert!(extractor().extract(Some(&tree)).is_err());
    }

    #[test]
    fn lenient_policy_defaults_only_the_broken_axis() {
        let tree = tree_with(&[(HORIZONTAL_PIXEL_SIZE, "n/a"), (VERTICAL_PIXEL_SIZE, "0.1")]);
        let info = extractor()
            .extract_with_policy(Some(&tree), MetadataPolicy::Lenient)
            .unwrap();
        assert_eq!(info, ResolutionInfo::new(96, 254));

        assert!(
            extractor()
                .extract_with_policy(Some(&tree), MetadataPolicy::Strict)
                .is_err()
        );
    }

    #[test]
    fn zero_default_is_rejected() {
        assert!(matches!(
            ResolutionMetadataExtractor::new(0),
            Err(OcrPrepError::Config(_))
        ));
    }

    #[test]
    fn default_follows_configuration() {
        let config = PrepConfig {
            default_dpi: 72,
            ..PrepConfig::default()
        };
        let extractor = ResolutionMetadataExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.extract(None).unwrap(), ResolutionInfo::uniform(72));
    }
}
