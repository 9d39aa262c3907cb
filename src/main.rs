use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use rayon::prelude::*;

use html_index::analyzer::build_token_table;
use html_index::cli::{Args, Command};
use html_index::config::get_config;
use html_index::index::IndexBuilder;
use html_index::ingest::{read_all, IngestItem, IngestSource};
use html_index::logging::{self, LoggingOptions};
use html_index::models::{Document, InputRecord};
use html_index::parser;
use html_index::retrieval::SearchEngine;
use html_index::url_map::strip_fragment;

/// Bounded look-ahead window for parallel parse+tokenize (SPEC_FULL.md §5): each chunk
/// is tokenized across a rayon thread pool, then fed to the builder strictly in
/// original stream order, so observable output never depends on thread scheduling.
const TOKENIZE_WINDOW: usize = 256;

fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = get_config();

    logging::init(&LoggingOptions {
        log_level: args.log_level.clone().unwrap_or_else(|| defaults.logging.log_level.clone()),
        json: args.log_json || defaults.logging.json,
    });

    match args.command {
        Command::Build {
            input,
            input_dir,
            index_dir,
            spill_threshold,
            hamming_threshold,
            skip_duplicates,
        } => run_build(
            input,
            input_dir,
            index_dir,
            spill_threshold.unwrap_or(defaults.build.spill_threshold),
            hamming_threshold.unwrap_or(defaults.build.hamming_threshold),
            skip_duplicates || defaults.build.skip_duplicates,
        ),
        Command::Search { index_dir, query, top_k } => run_search(
            index_dir,
            query,
            top_k.unwrap_or(defaults.retrieval.top_k),
            defaults.retrieval.ngram_boost,
        ),
    }
}

fn run_build(
    input: Option<std::path::PathBuf>,
    input_dir: Option<std::path::PathBuf>,
    index_dir: std::path::PathBuf,
    spill_threshold: usize,
    hamming_threshold: u32,
    skip_duplicates: bool,
) -> Result<()> {
    std::fs::create_dir_all(&index_dir).context("failed to create index directory")?;

    let source = match (input, input_dir) {
        (Some(path), None) => IngestSource::Ndjson(path),
        (None, Some(dir)) => IngestSource::Directory(dir),
        _ => anyhow::bail!("exactly one of --input or --input-dir must be given"),
    };

    let items = read_all(&source).context("failed to read input records")?;
    let mut builder = IndexBuilder::new(index_dir, spill_threshold, hamming_threshold);

    let records: Vec<InputRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            IngestItem::Record(record) => Some(record),
            IngestItem::Skipped { source, reason } => {
                let err = html_index::IndexError::Parse(reason);
                tracing::warn!(source = %source, "{err}");
                builder.record_parse_failure();
                None
            }
        })
        .collect();

    // Parse+tokenize runs across a rayon thread pool in bounded windows, but documents
    // are handed to the builder strictly in arrival order (SPEC_FULL.md §5), so
    // doc_id assignment and posting order never depend on thread scheduling.
    for chunk in records.chunks(TOKENIZE_WINDOW) {
        let docs: Vec<Document> = chunk
            .par_iter()
            .map(|record| {
                let extracted = parser::extract(&record.content);
                let url = strip_fragment(&record.url).to_string();
                let token_table = build_token_table(&extracted.normal, &extracted.important);
                Document {
                    url,
                    normal_text: extracted.normal,
                    important_text: extracted.important,
                    token_table,
                    doc_id: 0,
                    fingerprint: 0,
                }
            })
            .collect();

        for doc in docs {
            builder.add_document(doc, skip_duplicates)?;
        }
    }

    let stats = builder.finalize()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn run_search(index_dir: std::path::PathBuf, query: String, top_k: usize, ngram_boost: f64) -> Result<()> {
    use colored::Colorize;

    let engine = SearchEngine::open_with_boost(&index_dir, ngram_boost).context("failed to open index")?;
    let results = engine.search(&query, top_k)?;

    if results.is_empty() {
        println!("{}", "No results found.".yellow());
    } else {
        for (rank, result) in results.iter().enumerate() {
            println!(
                "{:>3}. {}  {}",
                rank + 1,
                format!("{:.4}", result.score).green(),
                result.url
            );
        }
    }
    Ok(())
}
