//! Dual-mode sentence selection.
//!
//! ```text
//! EvaluatingLabels ──degenerate labels──▶ Heuristic ──▶ Done
//!        │
//!        └──────both classes present────▶ Supervised ─▶ Done
//! ```
//!
//! Heuristic mode ranks by `token_count (+ first_sentence_bonus)` and emits
//! in score order. Supervised mode fits a fresh linear classifier on the
//! document and emits predicted-relevant sentences in document order. Both
//! deduplicate by normalized text and stop at `max_sentences`.

use crate::classifier::{design_matrix, FitReport, LinearSvm, RelevanceClassifier};
use crate::config::SummarizerConfig;
use crate::error::{Result, SummarizerError};
use crate::features::FeatureVector;
use crate::labels::LabelSet;
use crate::types::{Label, SentenceRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorState {
    EvaluatingLabels,
    Heuristic,
    Supervised,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    Heuristic,
    Supervised,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSentence {
    pub position: usize,
    pub raw_markup: String,
    pub normalized_text: String,
    /// Heuristic score; `None` in supervised mode
    pub score: Option<f64>,
}

/// Selected sentences in emission order, unique by normalized text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub sentences: Vec<SelectedSentence>,
}

impl Summary {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn raw_markup(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.raw_markup.as_str()).collect()
    }
}

struct SummaryBuilder {
    max_sentences: usize,
    used: HashSet<String>,
    summary: Summary,
}

impl SummaryBuilder {
    fn new(max_sentences: usize) -> Self {
        Self {
            max_sentences,
            used: HashSet::new(),
            summary: Summary::default(),
        }
    }

    fn is_full(&self) -> bool {
        self.summary.len() >= self.max_sentences
    }

    /// Adds the sentence unless its normalized text was already used.
    fn push(&mut self, record: &SentenceRecord, score: Option<f64>) {
        if self.used.insert(record.normalized_text.clone()) {
            self.summary.sentences.push(SelectedSentence {
                position: record.position,
                raw_markup: record.raw_markup.clone(),
                normalized_text: record.normalized_text.clone(),
                score,
            });
        }
    }

    fn finish(self) -> Summary {
        self.summary
    }
}

/// Outcome of one selection run.
///
/// Heuristic summaries are ordered by score, supervised ones by document
/// position. The two modes disagree on ordering on purpose; consumers that
/// need document order must sort heuristic output themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub mode: SelectionMode,
    pub summary: Summary,
    /// Supervised mode only
    pub fit: Option<FitReport>,
    /// Supervised mode only: the classifier's label for every sentence
    pub predictions: Option<Vec<Label>>,
    /// States visited, from `EvaluatingLabels` to `Done`
    pub states: Vec<SelectorState>,
}

pub struct Selector<'a> {
    config: &'a SummarizerConfig,
    state: SelectorState,
    visited: Vec<SelectorState>,
}

impl<'a> Selector<'a> {
    pub fn new(config: &'a SummarizerConfig) -> Self {
        Self {
            config,
            state: SelectorState::EvaluatingLabels,
            visited: vec![SelectorState::EvaluatingLabels],
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    fn transition(&mut self, next: SelectorState) {
        debug!(from = ?self.state, to = ?next, "selector transition");
        self.state = next;
        self.visited.push(next);
    }

    /// Select with the default linear SVM.
    pub fn select(
        self,
        sentences: &[SentenceRecord],
        features: &[FeatureVector],
        labels: &LabelSet,
    ) -> Result<Selection> {
        let classifier_config = self.config.classifier.clone();
        self.select_with(sentences, features, labels, || {
            LinearSvm::new(classifier_config)
        })
    }

    /// Select, building the classifier with `make_classifier` only if
    /// supervised mode is reached.
    pub fn select_with<C, F>(
        mut self,
        sentences: &[SentenceRecord],
        features: &[FeatureVector],
        labels: &LabelSet,
        make_classifier: F,
    ) -> Result<Selection>
    where
        C: RelevanceClassifier,
        F: FnOnce() -> C,
    {
        if sentences.len() != features.len() || sentences.len() != labels.len() {
            return Err(SummarizerError::LengthMismatch {
                sentences: sentences.len(),
                features: features.len(),
                labels: labels.len(),
            });
        }

        let (mode, summary, fit, predictions) = if labels.is_degenerate() {
            self.transition(SelectorState::Heuristic);
            let summary = self.heuristic(sentences, features);
            (SelectionMode::Heuristic, summary, None, None)
        } else {
            self.transition(SelectorState::Supervised);
            let (summary, fit, predictions) =
                self.supervised(sentences, features, labels, make_classifier())?;
            (SelectionMode::Supervised, summary, Some(fit), Some(predictions))
        };

        self.transition(SelectorState::Done);
        Ok(Selection {
            mode,
            summary,
            fit,
            predictions,
            states: self.visited,
        })
    }

    fn heuristic(&self, sentences: &[SentenceRecord], features: &[FeatureVector]) -> Summary {
        let scores: Vec<f64> = features
            .iter()
            .map(|f| {
                let bonus = if f.is_first {
                    self.config.first_sentence_bonus
                } else {
                    0.0
                };
                f.length as f64 + bonus
            })
            .collect();

        // sort_by is stable: equal scores keep document order
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut builder = SummaryBuilder::new(self.config.max_sentences);
        for index in order {
            if builder.is_full() {
                break;
            }
            builder.push(&sentences[index], Some(scores[index]));
        }
        builder.finish()
    }

    fn supervised<C: RelevanceClassifier>(
        &self,
        sentences: &[SentenceRecord],
        features: &[FeatureVector],
        labels: &LabelSet,
        mut classifier: C,
    ) -> Result<(Summary, FitReport, Vec<Label>)> {
        let matrix = design_matrix(features);
        let fit = classifier.fit(&matrix, labels.as_slice())?;
        let predictions = classifier.predict(&matrix);
        debug!(
            classifier = classifier.name(),
            predicted_relevant = predictions.iter().filter(|l| l.is_relevant()).count(),
            "supervised predictions ready"
        );

        let mut builder = SummaryBuilder::new(self.config.max_sentences);
        for (record, label) in sentences.iter().zip(&predictions) {
            if builder.is_full() {
                break;
            }
            if label.is_relevant() {
                builder.push(record, None);
            }
        }
        Ok((builder.finish(), fit, predictions))
    }
}
