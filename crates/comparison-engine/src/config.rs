//! Engine configuration
//!
//! TOML-based tuning knobs for extraction and matching. Every threshold the
//! pipeline consults lives here rather than as a hard-coded constant.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Text extraction limits.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Section matching thresholds.
    #[serde(default)]
    pub matching: MatchingConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

/// Limits applied while extracting the PDF text layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Per-document extraction timeout in seconds (default: 120). On expiry
    /// the affected document fails; the run continues.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Minimum non-whitespace characters for a usable text layer
    /// (default: 50). Below this the document is treated as a scanned
    /// image with no text layer.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            min_text_chars: default_min_text_chars(),
        }
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_min_text_chars() -> usize {
    50
}

/// Thresholds for aligning sections across documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum token-set overlap (Jaccard) for a content-similarity match
    /// (default: 0.5).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Score assigned to a same-parent exact-title match (default: 0.9).
    #[serde(default = "default_fuzzy_title_score")]
    pub fuzzy_title_score: f64,
    /// Score deduction when either side of a match carries the
    /// ambiguous-numbering flag (default: 0.1).
    #[serde(default = "default_ambiguity_penalty")]
    pub ambiguity_penalty: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            fuzzy_title_score: default_fuzzy_title_score(),
            ambiguity_penalty: default_ambiguity_penalty(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.5
}

fn default_fuzzy_title_score() -> f64 {
    0.9
}

fn default_ambiguity_penalty() -> f64 {
    0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.extraction.timeout_secs, 120);
        assert_eq!(config.extraction.min_text_chars, 50);
        assert_eq!(config.matching.similarity_threshold, 0.5);
        assert_eq!(config.matching.fuzzy_title_score, 0.9);
        assert_eq!(config.matching.ambiguity_penalty, 0.1);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = EngineConfig::from_str("").unwrap();
        assert_eq!(config.extraction.timeout_secs, 120);
        assert_eq!(config.matching.similarity_threshold, 0.5);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [extraction]
            timeout_secs = 30
            min_text_chars = 10

            [matching]
            similarity_threshold = 0.65
            fuzzy_title_score = 0.85
            ambiguity_penalty = 0.2
        "#;
        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(config.extraction.timeout_secs, 30);
        assert_eq!(config.extraction.min_text_chars, 10);
        assert_eq!(config.matching.similarity_threshold, 0.65);
        assert_eq!(config.matching.fuzzy_title_score, 0.85);
        assert_eq!(config.matching.ambiguity_penalty, 0.2);
        assert_eq!(config.extraction.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_config_fills_missing_fields() {
        let toml = r#"
            [matching]
            similarity_threshold = 0.7
        "#;
        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(config.matching.similarity_threshold, 0.7);
        assert_eq!(config.matching.fuzzy_title_score, 0.9);
        assert_eq!(config.extraction.timeout_secs, 120);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(EngineConfig::from_str("[extraction").is_err());
    }
}
