use serde::{Deserialize, Serialize};

// ===== SENTENCE TYPES =====
// One SentenceRecord per accepted `<s ...>...</s>` line. Records are built by
// the extractor and never mutated afterwards; everything downstream borrows.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// The trimmed input line exactly as read, kept for output fidelity
    pub raw_markup: String,
    /// Markup-free text used for matching and feature extraction
    pub normalized_text: String,
    /// 0-based index among the document's accepted sentences (source order)
    pub position: usize,
    /// `docid` attribute, or the driver-supplied id when the tag omits it
    pub document_id: String,
    /// `num` attribute, when present
    pub num: Option<u32>,
    /// `wdcount` attribute, when present
    pub word_count: Option<u32>,
}

impl SentenceRecord {
    pub fn token_count(&self) -> usize {
        self.normalized_text.split_whitespace().count()
    }
}

/// Why an input line did not become a sentence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    Blank,
    NotSentenceTag,
    MalformedTag(String),
}

/// Outcome of reading one input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedLine {
    Sentence(SentenceRecord),
    Skipped {
        /// 1-indexed line number in the input stream
        line_number: usize,
        reason: SkipReason,
    },
}

/// Every line of one sentence stream, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub document_id: String,
    pub lines: Vec<ParsedLine>,
}

impl Extraction {
    pub fn sentences(&self) -> impl Iterator<Item = &SentenceRecord> {
        self.lines.iter().filter_map(|line| match line {
            ParsedLine::Sentence(record) => Some(record),
            ParsedLine::Skipped { .. } => None,
        })
    }

    pub fn into_sentences(self) -> Vec<SentenceRecord> {
        self.lines
            .into_iter()
            .filter_map(|line| match line {
                ParsedLine::Sentence(record) => Some(record),
                ParsedLine::Skipped { .. } => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (usize, &SkipReason)> {
        self.lines.iter().filter_map(|line| match line {
            ParsedLine::Skipped {
                line_number,
                reason,
            } => Some((*line_number, reason)),
            ParsedLine::Sentence(_) => None,
        })
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.lines.len() - self.sentence_count()
    }

    /// Fraction of input lines that were skipped (0.0 for an empty stream)
    pub fn skip_rate(&self) -> f64 {
        if self.lines.is_empty() {
            return 0.0;
        }
        self.skipped_count() as f64 / self.lines.len() as f64
    }
}

// ===== LABELS =====

/// Binary relevance label. Serialized as 0 / 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Irrelevant,
    Relevant,
}

impl Label {
    pub fn from_bool(relevant: bool) -> Self {
        if relevant {
            Label::Relevant
        } else {
            Label::Irrelevant
        }
    }

    pub fn is_relevant(self) -> bool {
        self == Label::Relevant
    }

    /// Signed target used by margin-based classifiers
    pub fn sign(self) -> f64 {
        match self {
            Label::Relevant => 1.0,
            Label::Irrelevant => -1.0,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        match label {
            Label::Irrelevant => 0,
            Label::Relevant => 1,
        }
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Irrelevant),
            1 => Ok(Label::Relevant),
            other => Err(format!("label must be 0 or 1, got {other}")),
        }
    }
}
