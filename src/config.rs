//! TOML configuration for the tunable parameters of the pipeline.
//!
//! The parser's size floors and the enhancer's scoring constants are
//! empirical values, exposed here as configuration rather than hard-coded
//! laws. Every field has a default, so the library works without a config
//! file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub enhancer: EnhancerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParserConfig {
    /// Documents shorter than this many characters are skipped.
    #[serde(default = "default_min_document_chars")]
    pub min_document_chars: usize,
    /// Minimum extracted prompt length for a parse to succeed.
    #[serde(default = "default_min_prompt_chars")]
    pub min_prompt_chars: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_document_chars: default_min_document_chars(),
            min_prompt_chars: default_min_prompt_chars(),
        }
    }
}

fn default_min_document_chars() -> usize {
    100
}
fn default_min_prompt_chars() -> usize {
    50
}

/// Word-count band used by the length rules and the length score.
#[derive(Debug, Deserialize, Clone)]
pub struct LengthBand {
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    #[serde(default = "default_optimal_words")]
    pub optimal_words: usize,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

impl Default for LengthBand {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            optimal_words: default_optimal_words(),
            max_words: default_max_words(),
        }
    }
}

fn default_min_words() -> usize {
    200
}
fn default_optimal_words() -> usize {
    1000
}
fn default_max_words() -> usize {
    2500
}

/// Point allocation for the overall quality score. The score is normalized
/// to the weight sum, so the defaults (20/25/20/25/10) are relative shares.
#[derive(Debug, Deserialize, Clone)]
pub struct ScoreWeights {
    #[serde(default = "default_w_length")]
    pub length: f64,
    #[serde(default = "default_w_structure")]
    pub structure: f64,
    #[serde(default = "default_w_readability")]
    pub readability: f64,
    #[serde(default = "default_w_coverage")]
    pub coverage: f64,
    #[serde(default = "default_w_sentence_balance")]
    pub sentence_balance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            length: default_w_length(),
            structure: default_w_structure(),
            readability: default_w_readability(),
            coverage: default_w_coverage(),
            sentence_balance: default_w_sentence_balance(),
        }
    }
}

fn default_w_length() -> f64 {
    20.0
}
fn default_w_structure() -> f64 {
    25.0
}
fn default_w_readability() -> f64 {
    20.0
}
fn default_w_coverage() -> f64 {
    25.0
}
fn default_w_sentence_balance() -> f64 {
    10.0
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EnhancerConfig {
    #[serde(default)]
    pub length: LengthBand,
    #[serde(default)]
    pub weights: ScoreWeights,
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.length + self.structure + self.readability + self.coverage + self.sentence_balance
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.parser.min_document_chars == 0 {
        anyhow::bail!("parser.min_document_chars must be > 0");
    }
    if config.parser.min_prompt_chars == 0 {
        anyhow::bail!("parser.min_prompt_chars must be > 0");
    }

    let band = &config.enhancer.length;
    if !(band.min_words < band.optimal_words && band.optimal_words < band.max_words) {
        anyhow::bail!(
            "enhancer.length band must be ordered: min ({}) < optimal ({}) < max ({})",
            band.min_words,
            band.optimal_words,
            band.max_words
        );
    }

    let w = &config.enhancer.weights;
    for (name, value) in [
        ("length", w.length),
        ("structure", w.structure),
        ("readability", w.readability),
        ("coverage", w.coverage),
        ("sentence_balance", w.sentence_balance),
    ] {
        if value <= 0.0 {
            anyhow::bail!("enhancer.weights.{} must be > 0", name);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_give_a_complete_config() {
        let config = Config::default();
        assert_eq!(config.parser.min_document_chars, 100);
        assert_eq!(config.parser.min_prompt_chars, 50);
        assert_eq!(config.enhancer.weights.total(), 100.0);
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]\nmin_document_chars = 250").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.parser.min_document_chars, 250);
        assert_eq!(config.parser.min_prompt_chars, 50);
        assert_eq!(config.enhancer.length.min_words, 200);
    }

    #[test]
    fn rejects_unordered_length_band() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[enhancer.length]\nmin_words = 3000").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("length band"));
    }

    #[test]
    fn rejects_nonpositive_weight() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[enhancer.weights]\nreadability = 0.0").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("readability"));
    }
}
