//! Ranked retrieval engine (SPEC_FULL.md §4.8), grounded on the original Python
//! implementation's `Query` class (original_source
//! `inverted-index-engine/src/search_index.py`) and on the teacher's tf-idf-flavored
//! scoring style in `src/ranking.rs`.

use crate::analyzer::{self, QueryTokens};
use crate::error::IndexError;
use crate::index::lexicon::{self, Lexicon};
use crate::models::SearchResult;
use crate::url_map::UrlMap;
use ahash::AHashMap;
use std::path::{Path, PathBuf};

/// The default n-gram score boost applied before accumulation (SPEC_FULL.md §4.8 step
/// 3). Configurable via `ResolvedConfig::retrieval.ngram_boost` / `open_with_boost`.
const DEFAULT_NGRAM_BOOST: f64 = 1.5;

/// A loaded, query-ready index: the three required on-disk artifacts plus derived
/// collection statistics. Read-only after construction; safe to share via `Arc` across
/// concurrent query handlers (§5, §6.1).
pub struct SearchEngine {
    index_path: PathBuf,
    lexicon: Lexicon,
    url_map: UrlMap,
    collection_size: usize,
    ngram_boost: f64,
}

impl SearchEngine {
    /// Loads `inverted_index.txt`, `lexicon.txt`, and `url_mapping.txt` from
    /// `index_dir`, using the default n-gram boost (1.5). Fails fast with
    /// `IndexNotInitialized` if any artifact is missing, per §7.
    pub fn open(index_dir: &Path) -> Result<Self, IndexError> {
        Self::open_with_boost(index_dir, DEFAULT_NGRAM_BOOST)
    }

    /// Like [`open`](Self::open), but with an explicit n-gram boost multiplier (e.g.
    /// from `ResolvedConfig::retrieval.ngram_boost`).
    pub fn open_with_boost(index_dir: &Path, ngram_boost: f64) -> Result<Self, IndexError> {
        let index_path = index_dir.join("inverted_index.txt");
        if !index_path.exists() {
            return Err(IndexError::IndexNotInitialized {
                dir: index_dir.to_path_buf(),
                reason: "inverted_index.txt not found".to_string(),
            });
        }
        let lexicon = Lexicon::load(&index_dir.join("lexicon.txt"))?;
        let url_map = UrlMap::load(index_dir)?;
        let collection_size = url_map.len();

        tracing::info!(
            docs = collection_size,
            terms = lexicon.len(),
            "loaded index for retrieval"
        );

        Ok(Self {
            index_path,
            lexicon,
            url_map,
            collection_size,
            ngram_boost,
        })
    }

    fn idf(&self, doc_frequency: u64) -> f64 {
        if doc_frequency == 0 {
            return 0.0;
        }
        (self.collection_size as f64 / doc_frequency as f64).ln()
    }

    /// Looks up `term`'s postings via the lexicon, seeking and reading exactly its
    /// recorded byte length from the final index file. Returns an empty map for terms
    /// absent from the lexicon (§4.8 step 2: "terms not in the lexicon contribute
    /// zero").
    fn postings_for(&self, term: &str) -> Result<Option<(AHashMap<u32, u32>, u64)>, IndexError> {
        let Some(entry) = self.lexicon.get(term) else {
            return Ok(None);
        };
        let line = lexicon::read_line_at(&self.index_path, entry)?;
        let trimmed = line.trim_end_matches('\n');
        let Some((found_term, postings_str)) = trimmed.split_once(':') else {
            return Err(IndexError::LexiconMismatch {
                term: term.to_string(),
                offset: entry.offset,
                reason: "line missing ':' separator".to_string(),
            });
        };
        if found_term != term {
            return Err(IndexError::LexiconMismatch {
                term: term.to_string(),
                offset: entry.offset,
                reason: format!("expected term '{term}', found '{found_term}'"),
            });
        }
        let mut map = AHashMap::new();
        if !postings_str.is_empty() {
            for posting in postings_str.split(',') {
                if let Some((id_str, w_str)) = posting.split_once(':') {
                    if let (Ok(doc_id), Ok(weight)) = (id_str.parse::<u32>(), w_str.parse::<u32>()) {
                        map.insert(doc_id, weight);
                    }
                }
            }
        }
        Ok(Some((map, entry.doc_frequency)))
    }

    /// Runs one query: tokenizes and stems identically to indexing, scores candidate
    /// documents by tf·idf with an n-gram boost, and returns the top `top_k` by
    /// descending score.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, IndexError> {
        let tokens = analyzer::analyze_query(query);
        if tokens.is_empty() {
            // Informational per §7: reducing to zero tokens is not itself an error, so
            // the query still returns Ok with an empty result rather than propagating
            // IndexError::QueryEmpty as a hard failure.
            tracing::debug!(query, "{}", IndexError::QueryEmpty);
            return Ok(Vec::new());
        }

        let explicit_and = query.split_whitespace().any(|w| w == "AND");

        // Per-term posting lookups: unigrams first (always contribute to scoring),
        // then n-grams (contribute boosted scoring and can widen the candidate set).
        let mut unigram_postings: Vec<(String, AHashMap<u32, u32>, u64)> = Vec::new();
        for term in &tokens.unigrams {
            if let Some((postings, df)) = self.postings_for(term)? {
                unigram_postings.push((term.clone(), postings, df));
            }
        }

        let mut ngram_postings: Vec<(String, AHashMap<u32, u32>, u64)> = Vec::new();
        for term in tokens.ngram_terms() {
            if let Some((postings, df)) = self.postings_for(term)? {
                ngram_postings.push((term.clone(), postings, df));
            }
        }

        tracing::debug!(
            query,
            unigrams = tokens.unigrams.len(),
            ngram_hits = ngram_postings.len(),
            "query tokenized"
        );

        let candidate_ids = self.candidate_set(&tokens, &unigram_postings, &ngram_postings, explicit_and);

        let mut scores: AHashMap<u32, f64> = AHashMap::new();
        self.accumulate_scores(&unigram_postings, 1.0, &candidate_ids, &mut scores);
        self.accumulate_scores(&ngram_postings, self.ngram_boost, &candidate_ids, &mut scores);

        let mut ordered_candidates: Vec<u32> = candidate_ids.into_iter().collect();
        ordered_candidates.sort_unstable();

        let mut results: Vec<(u32, f64)> = ordered_candidates
            .into_iter()
            .map(|doc_id| (doc_id, *scores.get(&doc_id).unwrap_or(&0.0)))
            .collect();
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results
            .into_iter()
            .filter_map(|(doc_id, score)| {
                self.url_map.url_for(doc_id).map(|url| SearchResult {
                    url: url.to_string(),
                    score,
                })
            })
            .collect())
    }

    fn accumulate_scores(
        &self,
        postings: &[(String, AHashMap<u32, u32>, u64)],
        boost: f64,
        candidate_ids: &std::collections::HashSet<u32>,
        scores: &mut AHashMap<u32, f64>,
    ) {
        for (_, doc_postings, df) in postings {
            let idf = self.idf(*df);
            for (&doc_id, &tf) in doc_postings {
                if !candidate_ids.contains(&doc_id) {
                    continue;
                }
                *scores.entry(doc_id).or_insert(0.0) += tf as f64 * idf * boost;
            }
        }
    }

    /// Determines the candidate doc_id set per §4.8 step 4.
    fn candidate_set(
        &self,
        tokens: &QueryTokens,
        unigram_postings: &[(String, AHashMap<u32, u32>, u64)],
        ngram_postings: &[(String, AHashMap<u32, u32>, u64)],
        explicit_and: bool,
    ) -> std::collections::HashSet<u32> {
        if !ngram_postings.is_empty() && !explicit_and {
            let mut set = std::collections::HashSet::new();
            for (_, postings, _) in unigram_postings.iter().chain(ngram_postings.iter()) {
                set.extend(postings.keys().copied());
            }
            return set;
        }

        if tokens.unigrams.len() >= 2 || explicit_and {
            // Conjunctive: intersection across every unigram term. A query term absent
            // from the lexicon contributes an empty posting set, collapsing the
            // intersection to empty (no spurious matches on a missing AND operand).
            if unigram_postings.len() < tokens.unigrams.len() {
                return std::collections::HashSet::new();
            }
            let mut iter = unigram_postings.iter();
            let Some((_, first, _)) = iter.next() else {
                return std::collections::HashSet::new();
            };
            let mut set: std::collections::HashSet<u32> = first.keys().copied().collect();
            for (_, postings, _) in iter {
                let keys: std::collections::HashSet<u32> = postings.keys().copied().collect();
                set = set.intersection(&keys).copied().collect();
            }
            return set;
        }

        // Single-token query.
        unigram_postings
            .first()
            .map(|(_, postings, _)| postings.keys().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::IndexBuilder;
    use crate::models::Document;

    fn build_sample_index(docs: &[(&str, &str, &str)]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let mut builder = IndexBuilder::new(tmp.path().to_path_buf(), 15_000, 3);
        for (url, normal, important) in docs {
            let doc = Document {
                url: url.to_string(),
                normal_text: normal.to_string(),
                important_text: important.to_string(),
                token_table: crate::analyzer::build_token_table(normal, important),
                doc_id: 0,
                fingerprint: 0,
            };
            builder.add_document(doc, false).unwrap();
        }
        builder.finalize().unwrap();
        tmp
    }

    #[test]
    fn single_doc_round_trip_finds_the_document() {
        let tmp = build_sample_index(&[(
            "http://e.com/a",
            "Gaza is in the news.",
            "Gaza report",
        )]);
        let engine = SearchEngine::open(tmp.path()).unwrap();
        let results = engine.search("gaza", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "http://e.com/a");
    }

    #[test]
    fn conjunctive_multi_word_query_returns_intersection_only() {
        let tmp = build_sample_index(&[
            ("http://e.com/a", "cats sleep", ""),
            ("http://e.com/b", "cats chase dogs", ""),
            ("http://e.com/c", "dogs sleep", ""),
        ]);
        let engine = SearchEngine::open(tmp.path()).unwrap();
        let results = engine.search("cats dogs", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "http://e.com/b");
    }

    #[test]
    fn ngram_boost_ranks_heading_phrase_above_scattered_terms() {
        let tmp = build_sample_index(&[
            ("http://e.com/a", "we discuss this topic", "machine learning"),
            (
                "http://e.com/b",
                "machine is here and learning happens elsewhere far away in other text",
                "",
            ),
        ]);
        let engine = SearchEngine::open(tmp.path()).unwrap();
        let results = engine.search("machine learning", 10).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].url, "http://e.com/a");
    }

    #[test]
    fn empty_query_returns_empty_results() {
        let tmp = build_sample_index(&[("http://e.com/a", "gaza news", "")]);
        let engine = SearchEngine::open(tmp.path()).unwrap();
        let results = engine.search("   ", 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn missing_index_directory_fails_fast() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SearchEngine::open(tmp.path());
        assert!(err.is_err());
    }
}
