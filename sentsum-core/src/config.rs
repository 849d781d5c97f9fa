use crate::error::{Result, SummarizerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

// Default value functions for serde
fn default_max_sentences() -> usize {
    20
}

fn default_first_sentence_bonus() -> f64 {
    10.0
}

fn default_min_length_threshold() -> usize {
    10 // tokens; sentences above this count as "long"
}

pub fn default_discourse_phrases() -> Vec<String> {
    vec![
        "in conclusion".to_string(),
        "in summary".to_string(),
        "overall".to_string(),
        "this paper".to_string(),
        "this study".to_string(),
    ]
}

fn default_c() -> f64 {
    1.0
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_max_iterations() -> usize {
    1000
}

fn default_bias() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Upper bound on sentences per summary
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
    /// Score bonus for the document's first sentence in heuristic mode
    #[serde(default = "default_first_sentence_bonus")]
    pub first_sentence_bonus: f64,
    /// Summary-indicative phrases, matched case-insensitively as substrings
    #[serde(default = "default_discourse_phrases")]
    pub discourse_phrases: Vec<String>,
    /// Token count above which a sentence is reported as long
    #[serde(default = "default_min_length_threshold")]
    pub min_length_threshold: usize,
    /// Linear classifier settings for supervised mode
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Inverse regularization strength
    #[serde(default = "default_c")]
    pub c: f64,
    /// Stop once the largest projected gradient falls below this
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Full passes over the training rows before giving up
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Constant appended to each row to learn an intercept (0 disables it)
    #[serde(default = "default_bias")]
    pub bias: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c: default_c(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            bias: default_bias(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_sentences: default_max_sentences(),
            first_sentence_bonus: default_first_sentence_bonus(),
            discourse_phrases: default_discourse_phrases(),
            min_length_threshold: default_min_length_threshold(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl SummarizerConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SummarizerError::io(path, e))?;
        let config: SummarizerConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to defaults
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!(path = %p.display(), error = %e, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.first_sentence_bonus.is_finite() {
            return Err(SummarizerError::Config(
                "first_sentence_bonus must be finite".to_string(),
            ));
        }
        if self.classifier.c.is_nan() || self.classifier.c <= 0.0 {
            return Err(SummarizerError::Config(format!(
                "classifier.c must be positive, got {}",
                self.classifier.c
            )));
        }
        if self.classifier.tolerance.is_nan() || self.classifier.tolerance <= 0.0 {
            return Err(SummarizerError::Config(format!(
                "classifier.tolerance must be positive, got {}",
                self.classifier.tolerance
            )));
        }
        if !self.classifier.bias.is_finite() || self.classifier.bias < 0.0 {
            return Err(SummarizerError::Config(format!(
                "classifier.bias must be finite and not negative, got {}",
                self.classifier.bias
            )));
        }
        Ok(())
    }
}

/// Where the corpus lives. Handed to the pipeline driver at construction;
/// the scoring components never look at paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub source_dir: PathBuf,
    pub reference_dir: PathBuf,
    /// Only pick up source files with this extension (without the dot)
    #[serde(default)]
    pub source_extension: Option<String>,
    /// Stop after this many documents
    #[serde(default)]
    pub limit: Option<usize>,
}

impl CorpusConfig {
    pub fn new(source_dir: impl Into<PathBuf>, reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            reference_dir: reference_dir.into(),
            source_extension: None,
            limit: None,
        }
    }
}
