//! # html-index
//!
//! An on-disk inverted index and tf-idf retrieval engine over crawled HTML pages.
//!
//! The crate is organized as a strict producer-consumer pipeline: HTML documents are
//! parsed and tokenized (`parser`, `analyzer`), assigned stable document ids
//! (`url_map`), checked for near-duplication (`simhash`), accumulated into an
//! in-memory posting table that spills to disk and is externally merged into one
//! sorted index with a seekable term lexicon (`index`), and finally served by a ranked
//! retrieval engine (`retrieval`). `ingest` and `cli` wire the pipeline into the `build`
//! and `search` subcommands; `config` and `logging` provide the ambient settings and
//! tracing setup every binary in this crate shares.
//!
//! ## Example
//!
//! ```no_run
//! use html_index::index::IndexBuilder;
//! use html_index::models::Document;
//! use html_index::retrieval::SearchEngine;
//! use std::path::PathBuf;
//!
//! let mut builder = IndexBuilder::new(PathBuf::from("./index"), 15_000, 3);
//! let token_table = html_index::analyzer::build_token_table("gaza is in the news", "gaza report");
//! builder
//!     .add_document(
//!         Document {
//!             url: "http://e.com/a".to_string(),
//!             normal_text: "gaza is in the news".to_string(),
//!             important_text: "gaza report".to_string(),
//!             token_table,
//!             doc_id: 0,
//!             fingerprint: 0,
//!         },
//!         false,
//!     )
//!     .unwrap();
//! builder.finalize().unwrap();
//!
//! let engine = SearchEngine::open(&PathBuf::from("./index")).unwrap();
//! let results = engine.search("gaza", 5).unwrap();
//! println!("found {} results", results.len());
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod parser;
pub mod retrieval;
pub mod simhash;
pub mod url_map;

pub mod cli;

pub use error::IndexError;
pub use models::{Document, InputRecord, SearchResult};
pub use retrieval::SearchEngine;
