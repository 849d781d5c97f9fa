//! Corpus-level tests for the summarization pipeline.
//!
//! Every test builds a small source/reference corpus in a temp directory and
//! drives it through `SummarizationPipeline`, checking the boundaries a
//! caller can observe:
//!
//! - Discovery: pairing by file name, recursion, missing references, limits
//! - Per-document: labels, selection mode, summary ordering
//! - Batch: failure isolation and the JSON report
//!
//! No fixtures on disk; everything is generated per test.

use sentsum_core::classifier::design_matrix;
use sentsum_core::{
    BatchReport, CorpusConfig, Label, SelectionMode, SelectorState, SummarizationPipeline,
    SummarizerConfig, SummarizerError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Corpus helpers
// ============================================================================

fn sentence(docid: &str, num: usize, text: &str) -> String {
    let words = text.split_whitespace().count();
    format!(r#"<s docid="{docid}" num="{num}" wdcount="{words}">{text}</s>"#)
}

fn document(docid: &str, texts: &[&str]) -> String {
    let mut lines = vec!["<DOC>".to_string(), format!("<DOCNO>{docid}</DOCNO>")];
    lines.extend(
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| sentence(docid, i + 1, text)),
    );
    lines.push("</DOC>".to_string());
    lines.join("\n")
}

struct Corpus {
    _root: TempDir,
    source_dir: PathBuf,
    reference_dir: PathBuf,
}

impl Corpus {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let source_dir = root.path().join("source");
        let reference_dir = root.path().join("reference");
        fs::create_dir_all(&source_dir).unwrap();
        fs::create_dir_all(&reference_dir).unwrap();
        Self {
            _root: root,
            source_dir,
            reference_dir,
        }
    }

    fn write(dir: &Path, relative: &str, contents: &[u8]) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn source(&self, relative: &str, contents: &str) -> &Self {
        Self::write(&self.source_dir, relative, contents.as_bytes());
        self
    }

    fn reference(&self, relative: &str, contents: &str) -> &Self {
        Self::write(&self.reference_dir, relative, contents.as_bytes());
        self
    }

    fn corpus_config(&self) -> CorpusConfig {
        CorpusConfig::new(&self.source_dir, &self.reference_dir)
    }

    fn pipeline(&self) -> SummarizationPipeline {
        SummarizationPipeline::new(SummarizerConfig::default(), self.corpus_config()).unwrap()
    }
}

// ============================================================================
// Per-document behavior
// ============================================================================

mod document_scenarios {
    use super::*;

    #[test]
    fn single_sentence_document_features() {
        let corpus = Corpus::new();
        let text = "Alpha Beta Gamma Delta Epsilon Zeta Eta Theta Iota Kappa Lambda";
        corpus
            .source("d1.txt", &sentence("d1", 1, text))
            .reference("d1.txt", "");

        let stages = corpus
            .pipeline()
            .summarize_files(
                "d1",
                &corpus.source_dir.join("d1.txt"),
                &corpus.reference_dir.join("d1.txt"),
            )
            .unwrap();

        assert_eq!(stages.features.len(), 1);
        let features = stages.features[0];
        assert_eq!(features.length, 11);
        assert_eq!(features.position_one_hot(), [1, 0, 0]);
        assert_eq!(features.uppercase_words, 0);
        assert!(!features.discourse_marker);
        assert_eq!(features.thematic_words, 0);
    }

    #[test]
    fn exact_reference_match_labels_one_sentence() {
        let corpus = Corpus::new();
        corpus
            .source(
                "d1.txt",
                &document("d1", &["The storm hit.", "Crews restored power.", "Schools closed."]),
            )
            .reference("d1.txt", &document("d1", &["Crews restored power."]));

        let report = corpus.pipeline().run().unwrap();
        let summary = &report.documents[0];
        assert_eq!(summary.relevant_labels, 1);
        assert_eq!(summary.mode, SelectionMode::Supervised);

        let positions: Vec<usize> = summary.selected.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1]);
        assert_eq!(summary.selected[0].normalized_text, "Crews restored power.");
    }

    #[test]
    fn two_relevant_sentences_train_on_full_document() {
        let corpus = Corpus::new();
        corpus
            .source(
                "d1.txt",
                &document(
                    "d1",
                    &["Rain fell all day.", "Rivers rose overnight.", "Officials met later."],
                ),
            )
            .reference(
                "d1.txt",
                &document("d1", &["Rain fell all day.", "Rivers rose overnight."]),
            );

        let pipeline = corpus.pipeline();
        let stages = pipeline
            .summarize_files(
                "d1",
                &corpus.source_dir.join("d1.txt"),
                &corpus.reference_dir.join("d1.txt"),
            )
            .unwrap();

        assert_eq!(
            stages.labels.as_slice(),
            &[Label::Relevant, Label::Relevant, Label::Irrelevant]
        );
        assert_eq!(stages.selection.mode, SelectionMode::Supervised);
        assert_eq!(design_matrix(&stages.features).dim(), (3, 7));
        assert!(stages.selection.fit.is_some());
        assert_eq!(stages.selection.predictions.as_ref().map(Vec::len), Some(3));
        assert_eq!(
            stages.selection.states,
            vec![
                SelectorState::EvaluatingLabels,
                SelectorState::Supervised,
                SelectorState::Done
            ]
        );

        assert_eq!(
            stages.selection.predictions.as_deref(),
            Some(&[Label::Relevant, Label::Relevant, Label::Irrelevant][..])
        );

        // Supervised output keeps document order
        let positions: Vec<usize> = stages
            .selection
            .summary
            .sentences
            .iter()
            .map(|s| s.position)
            .collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn no_overlap_ranks_by_length_with_first_sentence_bonus() {
        let corpus = Corpus::new();
        corpus
            .source(
                "d1.txt",
                &document(
                    "d1",
                    &["Short lead.", "four words right here", "six words in this one too"],
                ),
            )
            .reference("d1.txt", &document("d1", &["Nothing in common."]));

        let report = corpus.pipeline().run().unwrap();
        let summary = &report.documents[0];

        assert_eq!(summary.mode, SelectionMode::Heuristic);
        assert_eq!(summary.relevant_labels, 0);
        assert!(summary.fit.is_none());

        let positions: Vec<usize> = summary.selected.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 2, 1]);
        let scores: Vec<f64> = summary.selected.iter().filter_map(|s| s.score).collect();
        assert_eq!(scores, vec![12.0, 6.0, 4.0]);
    }

    #[test]
    fn heuristic_summary_stops_at_max_sentences() {
        let corpus = Corpus::new();
        let texts: Vec<String> = (0..8).map(|i| format!("sentence number {i} here")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        corpus
            .source("d1.txt", &document("d1", &refs))
            .reference("d1.txt", "");

        let config = SummarizerConfig {
            max_sentences: 3,
            ..SummarizerConfig::default()
        };
        let pipeline = SummarizationPipeline::new(config, corpus.corpus_config()).unwrap();
        let report = pipeline.run().unwrap();

        assert_eq!(report.documents[0].selected.len(), 3);
        // First sentence carries the bonus, then ties fall back to document order
        let positions: Vec<usize> = report.documents[0].selected.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn markup_lines_are_counted_as_skipped() {
        let corpus = Corpus::new();
        corpus
            .source("d1.txt", &document("d1", &["One sentence only."]))
            .reference("d1.txt", "");

        let report = corpus.pipeline().run().unwrap();
        let summary = &report.documents[0];

        // <DOC>, <DOCNO> and </DOC> around one sentence
        assert_eq!(summary.sentence_count, 1);
        assert_eq!(summary.skipped_lines, 3);
        assert!((summary.skip_rate - 0.75).abs() < 1e-9);
    }
}

// ============================================================================
// Discovery
// ============================================================================

mod discovery {
    use super::*;

    #[test]
    fn pairs_files_by_name_across_nested_directories() {
        let corpus = Corpus::new();
        corpus
            .source("cluster_a/doc1.txt", &document("doc1", &["First."]))
            .reference("summaries/doc1.txt", &document("doc1", &["First."]))
            .source("doc2.txt", &document("doc2", &["Second."]))
            .reference("doc2.txt", "");

        let discovery = corpus.pipeline().discover_documents().unwrap();
        let ids: Vec<&str> = discovery
            .pairs
            .iter()
            .map(|p| p.document_id.as_str())
            .collect();

        assert_eq!(ids, vec!["doc1", "doc2"]);
        assert!(discovery.pairs[0].reference_path.ends_with("summaries/doc1.txt"));
        assert!(discovery.missing_references.is_empty());
    }

    #[test]
    fn shared_stems_get_distinct_document_ids() {
        let corpus = Corpus::new();
        corpus
            .source("a/doc.txt", &document("doc", &["From cluster a."]))
            .source("b/doc.txt", &document("doc", &["From cluster b."]))
            .source("solo.txt", &document("solo", &["Alone."]))
            .reference("doc.txt", "")
            .reference("solo.txt", "");

        let discovery = corpus.pipeline().discover_documents().unwrap();
        let ids: Vec<&str> = discovery
            .pairs
            .iter()
            .map(|p| p.document_id.as_str())
            .collect();

        assert_eq!(ids, vec!["a/doc", "b/doc", "solo"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_cycle_is_not_followed() {
        let corpus = Corpus::new();
        corpus
            .source("nested/doc1.txt", &document("doc1", &["Kept."]))
            .reference("doc1.txt", "");
        std::os::unix::fs::symlink(&corpus.source_dir, corpus.source_dir.join("nested/loop"))
            .unwrap();

        let discovery = corpus.pipeline().discover_documents().unwrap();
        assert_eq!(discovery.pairs.len(), 1);
        assert_eq!(discovery.pairs[0].document_id, "doc1");
    }

    #[test]
    fn source_without_reference_is_reported_not_processed() {
        let corpus = Corpus::new();
        corpus
            .source("doc1.txt", &document("doc1", &["Kept."]))
            .reference("doc1.txt", "")
            .source("orphan.txt", &document("orphan", &["No summary for me."]));

        let report = corpus.pipeline().run().unwrap();

        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.missing_references.len(), 1);
        assert!(report.missing_references[0].ends_with("orphan.txt"));
    }

    #[test]
    fn extension_filter_ignores_other_files() {
        let corpus = Corpus::new();
        corpus
            .source("doc1.txt", &document("doc1", &["Kept."]))
            .reference("doc1.txt", "")
            .source("README.md", "not a document");

        let mut corpus_config = corpus.corpus_config();
        corpus_config.source_extension = Some("txt".to_string());
        let pipeline =
            SummarizationPipeline::new(SummarizerConfig::default(), corpus_config).unwrap();

        let discovery = pipeline.discover_documents().unwrap();
        assert_eq!(discovery.pairs.len(), 1);
        assert!(discovery.missing_references.is_empty());
    }

    #[test]
    fn limit_caps_processed_documents() {
        let corpus = Corpus::new();
        for name in ["a", "b", "c"] {
            corpus
                .source(&format!("{name}.txt"), &document(name, &["Text."]))
                .reference(&format!("{name}.txt"), "");
        }

        let mut corpus_config = corpus.corpus_config();
        corpus_config.limit = Some(2);
        let pipeline =
            SummarizationPipeline::new(SummarizerConfig::default(), corpus_config).unwrap();

        let report = pipeline.run().unwrap();
        let ids: Vec<&str> = report.documents.iter().map(|d| d.document_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn both_directories_missing_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = SummarizationPipeline::new(
            SummarizerConfig::default(),
            CorpusConfig::new(root.path().join("nope"), root.path().join("also-nope")),
        )
        .unwrap();

        assert!(matches!(
            pipeline.run(),
            Err(SummarizerError::MissingDirectory(_))
        ));
    }

    #[test]
    fn missing_source_directory_yields_empty_report() {
        let root = tempfile::tempdir().unwrap();
        let reference_dir = root.path().join("reference");
        fs::create_dir_all(&reference_dir).unwrap();

        let pipeline = SummarizationPipeline::new(
            SummarizerConfig::default(),
            CorpusConfig::new(root.path().join("source"), &reference_dir),
        )
        .unwrap();

        let report = pipeline.run().unwrap();
        assert_eq!(report.processed_count(), 0);
        assert_eq!(report.failed_count(), 0);
    }

    #[test]
    fn missing_reference_directory_lists_every_source() {
        let root = tempfile::tempdir().unwrap();
        let source_dir = root.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        fs::write(source_dir.join("a.txt"), sentence("a", 1, "Text.")).unwrap();
        fs::write(source_dir.join("b.txt"), sentence("b", 1, "Text.")).unwrap();

        let pipeline = SummarizationPipeline::new(
            SummarizerConfig::default(),
            CorpusConfig::new(&source_dir, root.path().join("reference")),
        )
        .unwrap();

        let report = pipeline.run().unwrap();
        assert_eq!(report.processed_count(), 0);
        assert_eq!(report.missing_references.len(), 2);
    }
}

// ============================================================================
// Batch behavior
// ============================================================================

mod batch {
    use super::*;

    #[test]
    fn unreadable_document_does_not_stop_the_batch() {
        let corpus = Corpus::new();
        Corpus::write(&corpus.source_dir, "a.txt", &[0xff, 0xfe, 0x00, 0x80, b'\n']);
        corpus
            .reference("a.txt", "")
            .source("b.txt", &document("b", &["Still processed."]))
            .reference("b.txt", "");

        let report = corpus.pipeline().run().unwrap();

        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failures[0].document_id, "a");
        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.documents[0].document_id, "b");
    }

    #[test]
    fn run_with_sees_every_successful_document() {
        let corpus = Corpus::new();
        for name in ["x", "y"] {
            corpus
                .source(&format!("{name}.txt"), &document(name, &["One.", "Two."]))
                .reference(&format!("{name}.txt"), &document(name, &["Two."]));
        }

        let mut seen = Vec::new();
        let report = corpus
            .pipeline()
            .run_with(|stages, summary| {
                assert_eq!(stages.document_id, summary.document_id);
                seen.push(summary.document_id.clone());
            })
            .unwrap();

        assert_eq!(seen, vec!["x", "y"]);
        assert_eq!(report.mode_count(SelectionMode::Supervised), 2);
    }

    #[test]
    fn documents_are_independent() {
        // Same source text, different references: each document gets its own labels
        let corpus = Corpus::new();
        let texts = ["Markets fell sharply.", "Investors sold stocks."];
        corpus
            .source("p.txt", &document("p", &texts))
            .reference("p.txt", &document("p", &["Markets fell sharply."]))
            .source("q.txt", &document("q", &texts))
            .reference("q.txt", "");

        let report = corpus.pipeline().run().unwrap();
        assert_eq!(report.documents[0].mode, SelectionMode::Supervised);
        assert_eq!(report.documents[1].mode, SelectionMode::Heuristic);
    }

    #[test]
    fn report_round_trips_through_json() {
        let corpus = Corpus::new();
        corpus
            .source("d1.txt", &document("d1", &["Alpha beta.", "Gamma delta epsilon."]))
            .reference("d1.txt", "");

        let report = corpus.pipeline().run().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let path = out_dir.path().join("report.json");
        report.save_to_json(&path).unwrap();

        let loaded: BatchReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.documents.len(), 1);
        assert_eq!(loaded.documents[0].selected.len(), 2);
        assert_eq!(loaded.documents[0].mode, SelectionMode::Heuristic);
    }
}
