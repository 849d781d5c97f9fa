// Sentsum Core Library
//
// Extractive summarization of sentence-tagged documents against reference
// summaries. Each document runs through extraction, feature encoding,
// label alignment and dual-mode selection, independently of every other.

pub mod types;
pub mod error;
pub mod config;
pub mod extractor;
pub mod features;
pub mod labels;
pub mod classifier;
pub mod selector;
pub mod pipeline;
pub mod report;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{Result, SummarizerError};
pub use config::{ClassifierConfig, CorpusConfig, SummarizerConfig};
pub use extractor::{clean_sentence, read_sentences};
pub use features::{extract_features, FeatureVector, ThematicVocabulary};
pub use labels::{create_labels, LabelSet};
pub use classifier::{FitReport, LinearSvm, RelevanceClassifier};
pub use selector::{Selection, SelectionMode, Selector, SelectorState, Summary};
pub use pipeline::{DocumentStages, StepProfiler, SummarizationPipeline};
pub use report::{BatchReport, DocumentFailure, DocumentSummary};
