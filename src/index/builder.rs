//! In-memory posting accumulator with spill-to-disk (SPEC_FULL.md §4.5), grounded on
//! the original Python implementation's `InvertedIndex.add_document` /
//! `_offload_to_disk` / `finalize` (original_source
//! `inverted-index-engine/src/build_index.py`).

use crate::error::IndexError;
use crate::index::{lexicon, merger};
use crate::models::{BuildStats, Document};
use crate::simhash::{self, NearDuplicateDetector};
use crate::url_map::{strip_fragment, UrlMap};
use ahash::AHashMap;
use std::path::PathBuf;

pub struct IndexBuilder {
    index_dir: PathBuf,
    spill_threshold: usize,
    postings: AHashMap<String, Vec<(u32, u32)>>,
    url_map: UrlMap,
    detector: NearDuplicateDetector,
    doc_count: usize,
    partial_paths: Vec<PathBuf>,
    stats: BuildStats,
}

impl IndexBuilder {
    pub fn new(index_dir: PathBuf, spill_threshold: usize, hamming_threshold: u32) -> Self {
        Self {
            index_dir,
            spill_threshold,
            postings: AHashMap::new(),
            url_map: UrlMap::new(),
            detector: NearDuplicateDetector::new(hamming_threshold),
            doc_count: 0,
            partial_paths: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Records one input record that never became a `Document` at all (malformed JSON
    /// or unrecoverable HTML, §7's `ParseError`), for visibility in the final
    /// `BuildStats`. The ingestion/CLI layer calls this once per skipped record, since
    /// the builder never sees those records itself.
    pub fn record_parse_failure(&mut self) {
        self.stats.documents_parse_failed += 1;
    }

    /// Admits `doc`: assigns a doc_id, computes its fingerprint, applies the
    /// near-duplicate skip policy, and (unless skipped) appends its postings to the
    /// in-memory accumulator, spilling if the threshold is crossed. Returns `true` if
    /// the document was indexed, `false` if it was admitted but skipped as a duplicate.
    pub fn add_document(&mut self, mut doc: Document, skip_duplicates: bool) -> Result<bool, IndexError> {
        let url = strip_fragment(&doc.url).to_string();
        doc.url = url.clone();
        let doc_id = self.url_map.assign(&url);
        doc.doc_id = doc_id;
        self.stats.documents_seen += 1;

        if doc.token_table.is_empty() {
            // URL still recorded (doc_id already assigned above); no postings, no
            // fingerprint, per SPEC_FULL.md §7's TokenizationEmpty semantics.
            self.stats.documents_empty_tokens += 1;
            let err = IndexError::TokenizationEmpty { url: url.clone() };
            tracing::warn!(url = %url, "{err}");
            return Ok(true);
        }

        let fingerprint = simhash::fingerprint(&doc.token_table);
        doc.fingerprint = fingerprint;

        // is_near_duplicate is always checked before add, regardless of skip policy,
        // but add() itself only runs for documents that are actually indexed: a
        // document skipped as a duplicate must never become a comparison target for
        // later documents (original_source build_index.py:551-563 returns before its
        // own `add_document` call in that branch).
        let duplicate_of = self.detector.find_near_duplicate(fingerprint);
        if let Some((of_doc_id, hamming)) = duplicate_of {
            self.stats.duplicates_found += 1;
            let err = IndexError::DuplicateDetected { url: url.clone(), of_doc_id, hamming };
            tracing::info!(url = %url, of_doc_id, hamming, "{err}");
        }

        if duplicate_of.is_some() && skip_duplicates {
            self.stats.duplicates_skipped += 1;
            return Ok(false);
        }
        self.detector.add(doc_id, fingerprint);

        for (term, weight) in &doc.token_table {
            self.postings
                .entry(term.clone())
                .or_default()
                .push((doc_id, weight.total()));
        }

        self.doc_count += 1;
        self.stats.documents_indexed += 1;
        if self.doc_count % self.spill_threshold == 0 {
            self.spill()?;
        }
        Ok(true)
    }

    /// Writes the in-memory postings table to `partial_index_<k>.txt`, sorted by term,
    /// then clears the table.
    fn spill(&mut self) -> Result<(), IndexError> {
        let path = self
            .index_dir
            .join(format!("partial_index_{}.txt", self.partial_paths.len()));

        let mut terms: Vec<&String> = self.postings.keys().collect();
        terms.sort_unstable();

        let mut out = String::new();
        for term in &terms {
            let postings = &self.postings[*term];
            out.push_str(term);
            out.push(':');
            let rendered: Vec<String> = postings.iter().map(|(id, w)| format!("{id}:{w}")).collect();
            out.push_str(&rendered.join(","));
            out.push('\n');
        }

        std::fs::write(&path, out).map_err(|source| IndexError::SpillIo {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = ?path, terms = terms.len(), "spilled partial segment");

        self.postings.clear();
        self.stats.partial_segments_written += 1;
        self.partial_paths.push(path);
        Ok(())
    }

    /// Spills any remaining in-memory postings, runs the external merge, builds the
    /// lexicon, and persists the URL map and fingerprint store. Consumes the builder.
    pub fn finalize(mut self) -> Result<BuildStats, IndexError> {
        if !self.postings.is_empty() {
            self.spill()?;
        }

        let index_path = self.index_dir.join("inverted_index.txt");
        merger::merge(&self.partial_paths, &index_path)?;
        tracing::info!(partials = self.partial_paths.len(), "merged partial segments");

        let lexicon_path = self.index_dir.join("lexicon.txt");
        lexicon::build(&index_path, &lexicon_path)?;

        self.url_map.save(&self.index_dir)?;
        self.detector.save(&self.index_dir)?;

        Ok(self.stats)
    }
}
