use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the summarization core.
///
/// Line-level problems never show up here: the extractor reports them as
/// skipped lines. These variants cover document-level and configuration
/// failures, which the pipeline driver catches per document.
#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("IO error reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed sentence markup: {0}")]
    MalformedSentence(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Corpus directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("{sentences} sentences, {features} feature rows and {labels} labels do not line up")]
    LengthMismatch {
        sentences: usize,
        features: usize,
        labels: usize,
    },
}

impl SummarizerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SummarizerError>;
