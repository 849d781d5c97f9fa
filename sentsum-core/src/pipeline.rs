use crate::config::{CorpusConfig, SummarizerConfig};
use crate::error::{Result, SummarizerError};
use crate::extractor::{parse_lines, read_sentence_file};
use crate::features::{encode_document, long_sentence_count, FeatureVector, ThematicVocabulary};
use crate::labels::{create_labels, reference_set, LabelSet};
use crate::report::{BatchReport, DocumentFailure, DocumentSummary};
use crate::selector::{Selection, Selector};
use crate::types::{Extraction, SentenceRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics: lets you inspect/compare each boundary
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStages {
    pub document_id: String,
    pub source: Extraction,
    pub reference: Extraction,
    pub vocabulary_size: usize,
    pub features: Vec<FeatureVector>,
    pub labels: LabelSet,
    pub long_sentences: usize,
    pub selection: Selection,
}

/// Simple profiler that collects timings for pipeline steps.
/// Repeated steps (one per document) accumulate under the same name.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        match self.timings.iter_mut().find(|(name, _)| name == step_name) {
            Some((_, total)) => *total += elapsed,
            None => self.timings.push((step_name.to_string(), elapsed)),
        }
        debug!(step = step_name, elapsed_us = elapsed.as_micros() as u64, "step finished");

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            info!(
                step = %step,
                elapsed_ms = duration.as_millis() as u64,
                share_pct = percentage,
                "profile"
            );
        }
        info!(elapsed_ms = total.as_millis() as u64, "profile total");
    }
}

/// A source document and the reference summary with the same file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPair {
    pub document_id: String,
    pub source_path: PathBuf,
    pub reference_path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub pairs: Vec<DocumentPair>,
    pub missing_references: Vec<PathBuf>,
}

pub struct SummarizationPipeline {
    config: SummarizerConfig,
    corpus: CorpusConfig,
    profiling: bool,
}

impl SummarizationPipeline {
    pub fn new(config: SummarizerConfig, corpus: CorpusConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            corpus,
            profiling: false,
        })
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn corpus(&self) -> &CorpusConfig {
        &self.corpus
    }

    /// Extract → vocabulary → encode → align → select, for one document.
    pub fn summarize_document(
        &self,
        document_id: &str,
        source: Extraction,
        reference: Extraction,
    ) -> Result<DocumentStages> {
        self.summarize_document_profiled(document_id, source, reference, &mut StepProfiler::new(false))
    }

    /// Same as `summarize_document`, from in-memory line streams.
    pub fn summarize_lines<S: AsRef<str>>(
        &self,
        document_id: &str,
        source_lines: &[S],
        reference_lines: &[S],
    ) -> Result<DocumentStages> {
        let source = parse_lines(source_lines, document_id);
        let reference = parse_lines(reference_lines, document_id);
        self.summarize_document(document_id, source, reference)
    }

    pub fn summarize_files(
        &self,
        document_id: &str,
        source_path: &Path,
        reference_path: &Path,
    ) -> Result<DocumentStages> {
        self.summarize_files_profiled(
            document_id,
            source_path,
            reference_path,
            &mut StepProfiler::new(false),
        )
    }

    fn summarize_files_profiled(
        &self,
        document_id: &str,
        source_path: &Path,
        reference_path: &Path,
        profiler: &mut StepProfiler,
    ) -> Result<DocumentStages> {
        let (source, reference) = profiler.time_step("1. Read + Extract", || {
            let source = read_sentence_file(source_path, document_id)?;
            let reference = read_sentence_file(reference_path, document_id)?;
            Ok::<(Extraction, Extraction), SummarizerError>((source, reference))
        })?;
        self.summarize_document_profiled(document_id, source, reference, profiler)
    }

    fn summarize_document_profiled(
        &self,
        document_id: &str,
        source: Extraction,
        reference: Extraction,
        profiler: &mut StepProfiler,
    ) -> Result<DocumentStages> {
        let sentences: Vec<SentenceRecord> = source.sentences().cloned().collect();
        if source.skipped_count() > 0 {
            debug!(
                document_id,
                skipped = source.skipped_count(),
                skip_rate = source.skip_rate(),
                "source lines skipped"
            );
        }

        let vocabulary = ThematicVocabulary::from_sentences(reference.sentences());
        let features = profiler.time_step("2. Encode", || {
            encode_document(&sentences, &vocabulary, &self.config.discourse_phrases)
        });

        let labels = profiler.time_step("3. Align", || {
            create_labels(&sentences, &reference_set(reference.sentences()))
        });

        let selection = profiler.time_step("4. Select", || {
            Selector::new(&self.config).select(&sentences, &features, &labels)
        })?;

        info!(
            document_id,
            sentences = sentences.len(),
            relevant = labels.relevant_count(),
            mode = ?selection.mode,
            selected = selection.summary.len(),
            "document summarized"
        );

        Ok(DocumentStages {
            document_id: document_id.to_string(),
            long_sentences: long_sentence_count(&features, self.config.min_length_threshold),
            vocabulary_size: vocabulary.len(),
            source,
            reference,
            features,
            labels,
            selection,
        })
    }

    /// Pair every source file with the reference file of the same name.
    pub fn discover_documents(&self) -> Result<Discovery> {
        let source_dir = &self.corpus.source_dir;
        let reference_dir = &self.corpus.reference_dir;

        match (source_dir.is_dir(), reference_dir.is_dir()) {
            (false, false) => {
                return Err(SummarizerError::MissingDirectory(source_dir.clone()));
            }
            (false, true) => {
                warn!(path = %source_dir.display(), "source directory not found");
                return Ok(Discovery::default());
            }
            (true, false) => {
                warn!(path = %reference_dir.display(), "reference directory not found");
            }
            (true, true) => {}
        }

        let mut references: HashMap<OsString, PathBuf> = HashMap::new();
        if reference_dir.is_dir() {
            for path in collect_files(reference_dir)? {
                let Some(name) = path.file_name().map(|n| n.to_os_string()) else {
                    continue;
                };
                if let Some(existing) = references.get(&name) {
                    warn!(
                        kept = %existing.display(),
                        ignored = %path.display(),
                        "duplicate reference file name"
                    );
                    continue;
                }
                references.insert(name, path);
            }
        }

        let mut discovery = Discovery::default();
        for source_path in collect_files(source_dir)? {
            if !self.matches_extension(&source_path) {
                continue;
            }
            let Some(name) = source_path.file_name() else {
                continue;
            };

            match references.get(name) {
                Some(reference_path) => discovery.pairs.push(DocumentPair {
                    document_id: document_id_for(&source_path),
                    source_path: source_path.clone(),
                    reference_path: reference_path.clone(),
                }),
                None => discovery.missing_references.push(source_path.clone()),
            }
        }

        disambiguate_ids(source_dir, &mut discovery.pairs);

        if let Some(limit) = self.corpus.limit {
            discovery.pairs.truncate(limit);
        }

        Ok(discovery)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        match &self.corpus.source_extension {
            Some(wanted) => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(wanted)),
            None => true,
        }
    }

    /// Summarize the whole corpus. A failing document is logged, recorded
    /// and skipped; the batch always runs to the end.
    pub fn run(&self) -> Result<BatchReport> {
        self.run_with(|_, _| {})
    }

    /// Like `run`, calling `on_document` after each successful document.
    pub fn run_with<F>(&self, mut on_document: F) -> Result<BatchReport>
    where
        F: FnMut(&DocumentStages, &DocumentSummary),
    {
        let discovery = self.discover_documents()?;
        let mut report = BatchReport::new();
        let mut profiler = StepProfiler::new(self.profiling);

        for missing in &discovery.missing_references {
            warn!(path = %missing.display(), "no reference summary, skipping");
        }
        report.missing_references = discovery.missing_references;

        if discovery.pairs.is_empty() {
            warn!(
                source_dir = %self.corpus.source_dir.display(),
                reference_dir = %self.corpus.reference_dir.display(),
                "no documents to summarize"
            );
            return Ok(report);
        }

        info!(documents = discovery.pairs.len(), "summarizing corpus");

        for pair in &discovery.pairs {
            match self.summarize_files_profiled(
                &pair.document_id,
                &pair.source_path,
                &pair.reference_path,
                &mut profiler,
            ) {
                Ok(stages) => {
                    let summary = DocumentSummary::from_stages(&stages, Some(&pair.source_path));
                    on_document(&stages, &summary);
                    report.documents.push(summary);
                }
                Err(e) => {
                    error!(
                        document_id = %pair.document_id,
                        path = %pair.source_path.display(),
                        error = %e,
                        "document failed, continuing"
                    );
                    report.failures.push(DocumentFailure {
                        document_id: pair.document_id.clone(),
                        path: pair.source_path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        profiler.print_summary();
        info!(
            processed = report.processed_count(),
            failed = report.failed_count(),
            missing_references = report.missing_references.len(),
            "batch finished"
        );
        Ok(report)
    }
}

fn document_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sources sharing a stem fall back to their extension-less path under `root`.
fn disambiguate_ids(root: &Path, pairs: &mut [DocumentPair]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for pair in pairs.iter() {
        *counts.entry(pair.document_id.clone()).or_insert(0) += 1;
    }

    for pair in pairs.iter_mut() {
        if counts.get(&pair.document_id).copied().unwrap_or(0) < 2 {
            continue;
        }
        let relative = pair
            .source_path
            .strip_prefix(root)
            .unwrap_or(&pair.source_path)
            .with_extension("");
        let id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        warn!(
            stem = %pair.document_id,
            document_id = %id,
            path = %pair.source_path.display(),
            "document id shared by several sources, using relative path"
        );
        pair.document_id = id;
    }
}

/// All regular files under `dir`, recursively, in sorted order.
/// Symlinked files are included; symlinked directories are not entered.
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| SummarizerError::io(&current, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| SummarizerError::io(&current, e))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| SummarizerError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                files.push(path);
            } else if file_type.is_symlink() {
                debug!(path = %path.display(), "not following symlink");
            }
        }
    }

    files.sort();
    Ok(files)
}
