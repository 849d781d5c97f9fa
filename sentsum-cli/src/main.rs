use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sentsum::output::{banner, render_listing, render_totals, save_stages};
use sentsum_core::{CorpusConfig, SummarizationPipeline, SummarizerConfig, SummarizerError};

#[derive(Parser)]
#[command(name = "sentsum")]
#[command(about = "Extractive summarization of sentence-tagged documents against reference summaries")]
struct Args {
    /// Directory of sentence-tagged source documents (searched recursively)
    #[arg(short, long)]
    source_dir: PathBuf,

    /// Directory of reference summaries, matched to sources by file name
    #[arg(short, long)]
    reference_dir: PathBuf,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured summary length
    #[arg(short = 'n', long)]
    max_sentences: Option<usize>,

    /// Only pick up source files with this extension
    #[arg(long)]
    extension: Option<String>,

    /// Stop after this many documents
    #[arg(long)]
    limit: Option<usize>,

    /// Write the batch report as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump every intermediate stage per document into this directory
    #[arg(long)]
    dump_stages: Option<PathBuf>,

    /// Enable timing of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective config as YAML and exit
    #[arg(long)]
    show_config: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = SummarizerConfig::load_with_fallback(args.config.as_deref());
    if let Some(max_sentences) = args.max_sentences {
        config.max_sentences = max_sentences;
    }

    if args.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    println!("🦀 Sentsum Extractive Summarizer");
    match &args.config {
        Some(path) => println!("📋 Loaded config from: {}", path.display()),
        None => println!("📋 Using default config"),
    }

    let corpus = CorpusConfig {
        source_dir: args.source_dir.clone(),
        reference_dir: args.reference_dir.clone(),
        source_extension: args.extension.clone(),
        limit: args.limit,
    };
    let pipeline = SummarizationPipeline::new(config, corpus)
        .context("invalid summarizer configuration")?
        .with_profiling(args.profile);

    let result = pipeline.run_with(|stages, summary| {
        println!("\n{}", banner(summary));
        let listing = render_listing(summary);
        if !listing.is_empty() {
            println!("{listing}");
        }

        if let Some(dir) = &args.dump_stages {
            match save_stages(stages, dir) {
                Ok(paths) => {
                    for path in paths {
                        println!("  💾 {}", path.display());
                    }
                }
                Err(e) => error!(document_id = %stages.document_id, error = %e, "stage dump failed"),
            }
        }
    });

    let report = match result {
        Ok(report) => report,
        Err(SummarizerError::MissingDirectory(path)) => {
            println!("⚠️  Corpus not found at: {}", path.display());
            println!("   Please check --source-dir and --reference-dir.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("\n{}", render_totals(&report));

    if let Some(output) = &args.output {
        report
            .save_to_json(output)
            .with_context(|| format!("saving report to {}", output.display()))?;
        info!(path = %output.display(), run_id = %report.run_id, "report saved");
        println!("💾 Report saved to: {}", output.display());
    }

    Ok(())
}
