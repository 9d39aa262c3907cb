//! Typed error taxonomy for the indexing and retrieval core (see SPEC_FULL.md §7).

use std::path::PathBuf;

/// Domain-specific error kinds. Per-document conditions (`Parse`, `TokenizationEmpty`,
/// `DuplicateDetected`) are informational and never abort a build; file-level IO
/// failures (`SpillIo`, `MergeIo`) abort the current phase.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to parse input record: {0}")]
    Parse(String),

    #[error("document '{url}' produced no alphanumeric tokens")]
    TokenizationEmpty { url: String },

    #[error("document '{url}' is a near-duplicate of doc_id {of_doc_id} (hamming={hamming})")]
    DuplicateDetected {
        url: String,
        of_doc_id: u32,
        hamming: u32,
    },

    #[error("failed to spill partial segment {path:?}: {source}")]
    SpillIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to merge partial segments into {path:?}: {source}")]
    MergeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon entry for term '{term}' at offset {offset} did not decode to a valid line: {reason}")]
    LexiconMismatch {
        term: String,
        offset: u64,
        reason: String,
    },

    #[error("query contained no alphanumeric tokens after stemming")]
    QueryEmpty,

    #[error("index directory {dir:?} is not initialized: {reason}")]
    IndexNotInitialized { dir: PathBuf, reason: String },
}
