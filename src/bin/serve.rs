//! Reference HTTP wrapper over the retrieval engine (SPEC_FULL.md §6.1). A thin,
//! read-only consumer of the library: it holds no mutable state after startup and
//! performs no crawling or storage logic of its own.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use html_index::config::get_config;
use html_index::logging::{self, LoggingOptions};
use html_index::retrieval::SearchEngine;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serves search queries over a built html-index index directory")]
struct ServeArgs {
    /// Directory containing a previously built index
    #[arg(long, value_name = "DIR")]
    index_dir: PathBuf,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
    top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    results_count: usize,
    results: Vec<String>,
    search_time_ms: u128,
}

async fn search_handler(
    State(engine): State<Arc<SearchEngine>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, (axum::http::StatusCode, String)> {
    let top_k = params.top_k.unwrap_or_else(|| get_config().retrieval.top_k);
    let started = Instant::now();
    let results = engine
        .search(&params.q, top_k)
        .map_err(|e| (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let elapsed = started.elapsed().as_millis();

    Ok(Json(SearchResponse {
        query: params.q,
        results_count: results.len(),
        results: results.into_iter().map(|r| r.url).collect(),
        search_time_ms: elapsed,
    }))
}

async fn healthz() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServeArgs::parse();
    let defaults = get_config();
    logging::init(&LoggingOptions {
        log_level: defaults.logging.log_level.clone(),
        json: defaults.logging.json,
    });

    let engine = Arc::new(SearchEngine::open_with_boost(&args.index_dir, defaults.retrieval.ngram_boost)?);

    let app = Router::new()
        .route("/search", get(search_handler))
        .route("/healthz", get(healthz))
        .with_state(engine);

    tracing::info!(bind = %args.bind, "html-index-serve listening");
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
