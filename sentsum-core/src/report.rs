use crate::classifier::FitReport;
use crate::error::{Result, SummarizerError};
use crate::pipeline::DocumentStages;
use crate::selector::{SelectedSentence, SelectionMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Per-document result, the unit the CLI prints and the JSON report lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub source_path: Option<PathBuf>,
    pub mode: SelectionMode,
    pub sentence_count: usize,
    pub skipped_lines: usize,
    pub skip_rate: f64,
    pub reference_sentence_count: usize,
    pub relevant_labels: usize,
    pub long_sentences: usize,
    pub fit: Option<FitReport>,
    pub selected: Vec<SelectedSentence>,
}

impl DocumentSummary {
    pub fn from_stages(stages: &DocumentStages, source_path: Option<&Path>) -> Self {
        Self {
            document_id: stages.document_id.clone(),
            source_path: source_path.map(Path::to_path_buf),
            mode: stages.selection.mode,
            sentence_count: stages.source.sentence_count(),
            skipped_lines: stages.source.skipped_count(),
            skip_rate: stages.source.skip_rate(),
            reference_sentence_count: stages.reference.sentence_count(),
            relevant_labels: stages.labels.relevant_count(),
            long_sentences: stages.long_sentences,
            fit: stages.selection.fit.clone(),
            selected: stages.selection.summary.sentences.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub document_id: String,
    pub path: PathBuf,
    pub error: String,
}

/// Everything one batch run produced. Built once, never persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub documents: Vec<DocumentSummary>,
    pub failures: Vec<DocumentFailure>,
    /// Source files with no reference summary of the same name
    pub missing_references: Vec<PathBuf>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            documents: Vec::new(),
            failures: Vec::new(),
            missing_references: Vec::new(),
        }
    }

    pub fn processed_count(&self) -> usize {
        self.documents.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn mode_count(&self, mode: SelectionMode) -> usize {
        self.documents.iter().filter(|d| d.mode == mode).count()
    }

    pub fn save_to_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| SummarizerError::io(path, e))?;
        Ok(())
    }
}
