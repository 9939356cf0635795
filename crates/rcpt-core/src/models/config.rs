//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Line interpretation configuration.
    pub extraction: ExtractionConfig,

    /// Vocabulary configuration.
    pub dictionary: DictionaryConfig,
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Snap misread words to the nearest dictionary word.
    pub correct_tokens: bool,

    /// Largest edit distance accepted for corrections and keyword matches.
    pub max_edit_distance: usize,

    /// Shortest item name kept after the price is removed from a line.
    pub min_item_name_len: usize,

    /// Number of trailing lines searched when no total line is found.
    pub fallback_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            correct_tokens: true,
            max_edit_distance: 2,
            min_item_name_len: 2,
            fallback_window: 12,
        }
    }
}

/// Vocabulary used by the token corrector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Dictionary file replacing the built-in vocabulary.
    pub path: Option<PathBuf>,

    /// Additional words appended to the vocabulary.
    pub extra_words: Vec<String>,
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RcptConfig =
            serde_json::from_str(r#"{ "extraction": { "min_item_name_len": 3 } }"#).unwrap();

        assert_eq!(config.extraction.min_item_name_len, 3);
        assert_eq!(config.extraction.max_edit_distance, 2);
        assert_eq!(config.extraction.fallback_window, 12);
        assert!(config.extraction.correct_tokens);
        assert!(config.dictionary.path.is_none());
    }

    #[test]
    fn test_config_round_trip_on_disk() {
        let path = std::env::temp_dir().join(format!("rcpt-config-{}.json", std::process::id()));

        let mut config = RcptConfig::default();
        config.dictionary.extra_words = vec!["kombucha".to_string()];
        config.save(&path).unwrap();

        let loaded = RcptConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.dictionary.extra_words, vec!["kombucha".to_string()]);
    }
}
