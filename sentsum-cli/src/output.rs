use anyhow::{Context, Result};
use sentsum_core::{BatchReport, DocumentStages, DocumentSummary, SelectionMode};
use std::fs;
use std::path::{Path, PathBuf};

/// Header printed above each document's listing.
pub fn banner(summary: &DocumentSummary) -> String {
    let mode = match summary.mode {
        SelectionMode::Heuristic => "heuristic",
        SelectionMode::Supervised => "supervised",
    };
    format!(
        "📄 Summary for {} ({mode}, {} of {} sentences)",
        summary.document_id,
        summary.selected.len(),
        summary.sentence_count
    )
}

/// 1-indexed listing of the selected sentences, raw markup intact.
pub fn render_listing(summary: &DocumentSummary) -> String {
    summary
        .selected
        .iter()
        .enumerate()
        .map(|(i, sentence)| format!("{}. {}", i + 1, sentence.raw_markup))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_totals(report: &BatchReport) -> String {
    let mut lines = vec![format!(
        "📊 {} summarized ({} supervised, {} heuristic), {} failed",
        report.processed_count(),
        report.mode_count(SelectionMode::Supervised),
        report.mode_count(SelectionMode::Heuristic),
        report.failed_count()
    )];
    if !report.missing_references.is_empty() {
        lines.push(format!(
            "⚠️  {} source files had no reference summary",
            report.missing_references.len()
        ));
    }
    for failure in &report.failures {
        lines.push(format!("❌ {}: {}", failure.path.display(), failure.error));
    }
    lines.join("\n")
}

/// Write every captured stage of one document under `output_dir/<document_id>/`.
pub fn save_stages(stages: &DocumentStages, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = output_dir.join(&stages.document_id);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating stage directory {}", dir.display()))?;

    let mut written = Vec::new();
    let mut write_json = |name: &str, json: String| -> Result<()> {
        let path = dir.join(name);
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
        Ok(())
    };

    // Stage 1: extraction, including skipped lines
    write_json("stage1_source.json", serde_json::to_string_pretty(&stages.source)?)?;
    write_json(
        "stage1_reference.json",
        serde_json::to_string_pretty(&stages.reference)?,
    )?;

    // Stage 2: feature vectors
    write_json("stage2_features.json", serde_json::to_string_pretty(&stages.features)?)?;

    // Stage 3: labels
    write_json("stage3_labels.json", serde_json::to_string_pretty(&stages.labels)?)?;

    // Stage 4: selection
    write_json(
        "stage4_selection.json",
        serde_json::to_string_pretty(&stages.selection)?,
    )?;

    // Summary file: quick reference for validation scripts
    let summary = serde_json::json!({
        "document_id": stages.document_id,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "mode": stages.selection.mode,
        "stage_counts": {
            "sentences": stages.source.sentence_count(),
            "skipped_lines": stages.source.skipped_count(),
            "reference_sentences": stages.reference.sentence_count(),
            "vocabulary": stages.vocabulary_size,
            "relevant_labels": stages.labels.relevant_count(),
            "long_sentences": stages.long_sentences,
            "selected": stages.selection.summary.len(),
        }
    });
    write_json("summary.json", serde_json::to_string_pretty(&summary)?)?;

    Ok(written)
}
