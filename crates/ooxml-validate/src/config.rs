//! Validation configuration: the small record of recognized knobs.

use ooxml_pack::FormatVersion;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub format_version: FormatVersion,
    pub max_errors: usize,
    pub schema_validation: bool,
    pub semantic_validation: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            format_version: FormatVersion::Office2019,
            max_errors: 1000,
            schema_validation: true,
            semantic_validation: true,
        }
    }
}

impl ValidationConfig {
    /// Loads configuration from a TOML document, falling back to defaults
    /// for any field the document omits.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = ValidationConfig::default();
        assert_eq!(cfg.format_version, FormatVersion::Office2019);
        assert_eq!(cfg.max_errors, 1000);
        assert!(cfg.schema_validation);
        assert!(cfg.semantic_validation);
    }

    #[test]
    fn partial_toml_fills_remaining_fields_with_defaults() {
        let cfg = ValidationConfig::from_toml("max_errors = 50\n").unwrap();
        assert_eq!(cfg.max_errors, 50);
        assert!(cfg.schema_validation);
    }
}
