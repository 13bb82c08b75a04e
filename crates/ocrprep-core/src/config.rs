// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preparation settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OcrPrepError, Result};

/// Resolution assumed for a display when nothing better is known.
pub const DEFAULT_SCREEN_DPI: u32 = 96;

/// How callers react to a resolution value that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataPolicy {
    /// Propagate the parse error.
    #[default]
    Strict,
    /// Substitute the default resolution for the failing axis.
    Lenient,
}

/// Settings for preparing images for OCR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Resolution used for any axis the image metadata does not describe.
    /// Stands in for the host's reported screen resolution.
    pub default_dpi: u32,
    /// Reaction to malformed pixel-size values.
    pub metadata_policy: MetadataPolicy,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            default_dpi: DEFAULT_SCREEN_DPI,
            metadata_policy: MetadataPolicy::Strict,
        }
    }
}

impl PrepConfig {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: PrepConfig = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "Configuration loaded");
        Ok(config)
    }

    /// Reject settings that would break the positive-resolution invariant.
    pub fn validate(&self) -> Result<()> {
        if self.default_dpi == 0 {
            return Err(OcrPrepError::Config(
                "default_dpi must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_strict_96_dpi() {
        let config = PrepConfig::default();
        assert_eq!(config.default_dpi, 96);
        assert_eq!(config.metadata_policy, MetadataPolicy::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_default_dpi_is_rejected() {
        let config = PrepConfig {
            default_dpi: 0,
            ..PrepConfig::default()
        };
        assert!(matches!(config.validate(), Err(OcrPrepError::Config(_))));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "metadata_policy": "lenient" }}"#).unwrap();

        let config = PrepConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.default_dpi, DEFAULT_SCREEN_DPI);
        assert_eq!(config.metadata_policy, MetadataPolicy::Lenient);
    }

    #[test]
    fn json_with_zero_dpi_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_dpi": 0 }}"#).unwrap();

        let err = PrepConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, OcrPrepError::Config(_)));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = PrepConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, OcrPrepError::Serialization(_)));
    }
}
