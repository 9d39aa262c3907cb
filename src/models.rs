//! Plain data types shared across the indexing and retrieval core (SPEC_FULL.md §3).

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// One crawled page as handed to the core by the (out-of-scope) crawler/content-storage
/// layer. Extra JSON fields are ignored by `serde` (no `deny_unknown_fields`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputRecord {
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Per-term weight contribution within a single document: how many times the term (or
/// n-gram) occurred in the `normal` stream vs. the `important` stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermWeight {
    pub normal_count: u32,
    pub important_count: u32,
}

impl TermWeight {
    pub fn total(&self) -> u32 {
        self.normal_count + self.important_count
    }
}

/// A single crawled document after parsing, tokenization, and stemming, but before it
/// has been admitted to the index. Discarded once its postings are emitted to the
/// builder.
#[derive(Debug, Clone)]
pub struct Document {
    /// Cleaned URL (fragment stripped).
    pub url: String,
    pub normal_text: String,
    pub important_text: String,
    /// `stemmed_term -> (normal_count, important_count)`, covering unigrams, bigrams,
    /// and trigrams from both streams.
    pub token_table: AHashMap<String, TermWeight>,
    /// Assigned once the document is admitted via the URL mapper; `0` before that.
    pub doc_id: u32,
    /// Cached 64-bit SimHash fingerprint; `0` for documents with an empty token table.
    pub fingerprint: u64,
}

impl Document {
    pub fn unique_token_count(&self) -> usize {
        self.token_table.len()
    }
}

/// One ranked hit returned by the retrieval engine.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub score: f64,
}

/// Aggregate counters surfaced by the build process for operator visibility/tests
/// (e.g. scenario 3 in SPEC_FULL.md §8: `duplicates_found`, `duplicates_skipped`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub documents_seen: usize,
    pub documents_indexed: usize,
    pub documents_parse_failed: usize,
    pub documents_empty_tokens: usize,
    pub duplicates_found: usize,
    pub duplicates_skipped: usize,
    pub partial_segments_written: usize,
}
