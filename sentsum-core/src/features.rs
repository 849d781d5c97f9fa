//! Feature Encoder
//!
//! Maps each sentence to a fixed 7-component vector. Every feature is a pure
//! function of the sentence text, its position, the document length and the
//! document's thematic vocabulary.

use crate::types::SentenceRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lowercase word tokens of one document's reference summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThematicVocabulary {
    words: HashSet<String>,
}

impl ThematicVocabulary {
    pub fn from_sentences<'a, I>(sentences: I) -> Self
    where
        I: IntoIterator<Item = &'a SentenceRecord>,
    {
        let words = sentences
            .into_iter()
            .flat_map(|s| s.normalized_text.split_whitespace())
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }

    /// Case-insensitive membership
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(&token.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Whitespace token count
    pub length: usize,
    /// Text contains one of the configured discourse phrases
    pub discourse_marker: bool,
    pub is_first: bool,
    pub is_middle: bool,
    pub is_last: bool,
    /// Tokens found in the thematic vocabulary
    pub thematic_words: usize,
    /// Fully uppercase tokens (see `is_uppercase_word`)
    pub uppercase_words: usize,
}

impl FeatureVector {
    pub const DIMENSIONS: usize = 7;

    /// Numeric row in the fixed column order used by the classifier.
    pub fn to_row(&self) -> [f64; Self::DIMENSIONS] {
        [
            self.length as f64,
            flag(self.discourse_marker),
            flag(self.is_first),
            flag(self.is_middle),
            flag(self.is_last),
            self.thematic_words as f64,
            self.uppercase_words as f64,
        ]
    }

    pub fn position_one_hot(&self) -> [u8; 3] {
        [
            self.is_first as u8,
            self.is_middle as u8,
            self.is_last as u8,
        ]
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Uppercase policy: at least one uppercase letter and no lowercase letter.
/// Digits, punctuation and uncased scripts are ignored, so `"NASA"`,
/// `"U.S."` and `"COVID-19"` count while `"1998"`, `"--"` and `"Alpha"` don't.
pub fn is_uppercase_word(token: &str) -> bool {
    let mut has_upper = false;
    for c in token.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_upper = true;
        }
    }
    has_upper
}

/// Returns (first, middle, last). The first-sentence check runs before the
/// last-sentence check, so a single-sentence document is "first".
fn position_flags(position: usize, total_sentence_count: usize) -> (bool, bool, bool) {
    if position == 0 {
        (true, false, false)
    } else if position + 1 == total_sentence_count {
        (false, false, true)
    } else {
        (false, true, false)
    }
}

pub fn extract_features(
    sentence_text: &str,
    position: usize,
    total_sentence_count: usize,
    vocabulary: &ThematicVocabulary,
    discourse_phrases: &[String],
) -> FeatureVector {
    let tokens: Vec<&str> = sentence_text.split_whitespace().collect();
    let lowered = sentence_text.to_lowercase();

    let discourse_marker = discourse_phrases
        .iter()
        .any(|phrase| lowered.contains(&phrase.to_lowercase()));
    let (is_first, is_middle, is_last) = position_flags(position, total_sentence_count);

    FeatureVector {
        length: tokens.len(),
        discourse_marker,
        is_first,
        is_middle,
        is_last,
        thematic_words: tokens.iter().filter(|t| vocabulary.contains(t)).count(),
        uppercase_words: tokens.iter().filter(|t| is_uppercase_word(t)).count(),
    }
}

/// Encode every sentence of a document, relative to the whole sequence.
pub fn encode_document(
    sentences: &[SentenceRecord],
    vocabulary: &ThematicVocabulary,
    discourse_phrases: &[String],
) -> Vec<FeatureVector> {
    let total = sentences.len();
    sentences
        .iter()
        .map(|s| {
            extract_features(
                &s.normalized_text,
                s.position,
                total,
                vocabulary,
                discourse_phrases,
            )
        })
        .collect()
}

/// Sentences longer than `min_length_threshold` tokens
pub fn long_sentence_count(features: &[FeatureVector], min_length_threshold: usize) -> usize {
    features
        .iter()
        .filter(|f| f.length > min_length_threshold)
        .count()
}
