//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor and Analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Fence labels accepted as structured data (matched case-insensitively)
    pub fence_labels: Vec<String>,

    /// Accept an unlabeled fence whose body starts with `{` when no labeled
    /// fence is present
    pub accept_unlabeled_fences: bool,

    /// Match enumerated strings case-insensitively and rewrite them to the
    /// canonical spelling
    pub case_insensitive_enums: bool,

    /// Accept numeric strings such as `"85"` or `"85%"` for number fields
    pub coerce_numeric_strings: bool,

    /// Maximum time for a single model call (seconds)
    pub request_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fence_labels.is_empty() {
            return Err("fence_labels must contain at least one label".to_string());
        }
        if self.fence_labels.iter().any(|l| l.trim().is_empty()) {
            return Err("fence_labels cannot contain empty labels".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration: exact enum spelling, no coercion
    fn default() -> Self {
        Self {
            fence_labels: vec!["json".to_string()],
            accept_unlabeled_fences: false,
            case_insensitive_enums: false,
            coerce_numeric_strings: false,
            request_timeout_secs: 60,
        }
    }
}

impl ExtractorConfig {
    /// Strict preset: exact enum spelling, no coercion, shorter timeout
    pub fn strict() -> Self {
        Self {
            fence_labels: vec!["json".to_string()],
            accept_unlabeled_fences: false,
            case_insensitive_enums: false,
            coerce_numeric_strings: false,
            request_timeout_secs: 30,
        }
    }

    /// Lenient preset: more fence styles and coercion, longer timeout
    pub fn lenient() -> Self {
        Self {
            fence_labels: vec!["json".to_string(), "json5".to_string(), "javascript".to_string()],
            accept_unlabeled_fences: true,
            case_insensitive_enums: true,
            coerce_numeric_strings: true,
            request_timeout_secs: 120,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
