//! Label Aligner
//!
//! A source sentence is relevant iff its normalized text appears verbatim
//! (case-sensitive) among the reference summary's normalized sentences.
//! Paraphrases are deliberately not matched.

use crate::types::{Label, SentenceRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Normalized texts of the reference summary, built once per document.
pub fn reference_set<'a, I>(reference: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a SentenceRecord>,
{
    reference
        .into_iter()
        .map(|s| s.normalized_text.clone())
        .collect()
}

pub fn create_labels(source: &[SentenceRecord], reference: &HashSet<String>) -> LabelSet {
    let labels = source
        .iter()
        .map(|s| Label::from_bool(reference.contains(&s.normalized_text)))
        .collect();
    LabelSet { labels }
}

/// One label per source sentence, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn as_slice(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn relevant_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_relevant()).count()
    }

    pub fn distinct_count(&self) -> usize {
        self.labels.iter().collect::<HashSet<_>>().len()
    }

    /// Fewer than two distinct values: nothing to contrast, so no classifier.
    pub fn is_degenerate(&self) -> bool {
        self.distinct_count() < 2
    }
}
