//! Unifies document-side and query-side tokenization behind one `Analyzer`
//! capability (SPEC_FULL.md §9: "duck-typed query-vs-document divergence" must be
//! unified so the two paths cannot silently drift apart — see §4.2's round-trip
//! invariant and the property test in `tests/stemming_properties.rs`).

pub mod stemmer;

use crate::models::TermWeight;
use ahash::AHashMap;

pub use stemmer::smart_stem;

/// Which text stream a set of tokens came from, controlling the weight contribution
/// per SPEC_FULL.md §4.2's table (`normal` => +1, `important` => +2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Normal,
    Important,
}

impl StreamKind {
    fn weight(self) -> u32 {
        match self {
            StreamKind::Normal => 1,
            StreamKind::Important => 2,
        }
    }
}

/// Splits `text` into candidate words on whitespace, then further splits each word on
/// non-alphanumeric boundaries (so `"gaza,news"` yields `["gaza", "news"]`, matching
/// `nltk.tokenize.word_tokenize`'s treatment of punctuation as separate from word
/// characters). Returns `(lowercase, original)` pairs so the stemmer can still see
/// original casing for acronym detection.
fn split_words(text: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for word in text.split_whitespace() {
        let mut current = String::new();
        for c in word.chars() {
            if c.is_alphanumeric() {
                current.push(c);
            } else if !current.is_empty() {
                out.push((current.to_lowercase(), std::mem::take(&mut current)));
            }
        }
        if !current.is_empty() {
            out.push((current.to_lowercase(), current));
        }
    }
    out
}

/// Tokenizes one text stream into its smart-stemmed unigram sequence, in document
/// order. This is the single entry point both the indexer and the retrieval engine
/// call — see the module doc comment.
pub fn analyze_text(text: &str) -> Vec<String> {
    split_words(text)
        .into_iter()
        .map(|(lower, original)| smart_stem(&lower, &original))
        .collect()
}

/// Joins adjacent stemmed tokens with `_` to form n-grams (SPEC_FULL.md §4.2: "N-grams
/// are assembled by joining adjacent stemmed tokens with underscore"). `n` must be >= 1;
/// `n == 1` returns `tokens` unchanged (cloned).
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    if n == 1 {
        return tokens.to_vec();
    }
    tokens
        .windows(n)
        .map(|w| w.join("_"))
        .collect()
}

/// Accumulates unigrams, bigrams, and trigrams of `tokens` into `table`, weighted by
/// `stream` per SPEC_FULL.md §4.2's table.
fn accumulate(table: &mut AHashMap<String, TermWeight>, tokens: &[String], stream: StreamKind) {
    let w = stream.weight();
    for n in 1..=3 {
        for gram in ngrams(tokens, n) {
            let entry = table.entry(gram).or_default();
            match stream {
                StreamKind::Normal => entry.normal_count += w,
                StreamKind::Important => entry.important_count += w,
            }
        }
    }
}

/// Builds the full `{stemmed_term -> (normal_count, important_count)}` token table for
/// a document from its two cleaned text streams (SPEC_FULL.md §4.2).
pub fn build_token_table(normal_text: &str, important_text: &str) -> AHashMap<String, TermWeight> {
    let mut table = AHashMap::new();
    accumulate(&mut table, &analyze_text(normal_text), StreamKind::Normal);
    accumulate(&mut table, &analyze_text(important_text), StreamKind::Important);
    table
}

/// The stemmed unigrams, bigrams, and trigrams of a query string, generated by the
/// exact same path as document indexing (§4.2's query-side invariant).
#[derive(Debug, Clone, Default)]
pub struct QueryTokens {
    pub unigrams: Vec<String>,
    pub bigrams: Vec<String>,
    pub trigrams: Vec<String>,
}

impl QueryTokens {
    pub fn is_empty(&self) -> bool {
        self.unigrams.is_empty()
    }

    /// All n-grams (bigrams + trigrams), in generation order.
    pub fn ngram_terms(&self) -> impl Iterator<Item = &String> {
        self.bigrams.iter().chain(self.trigrams.iter())
    }
}

/// Tokenizes and stems a raw query string identically to document indexing, then
/// derives its bigrams and trigrams. `AND` (uppercase literal) is treated the same as
/// whitespace: it is not itself an alphanumeric token (non-alphanumeric apostrophe-free
/// uppercase letters ARE alphanumeric, so literal "AND" would tokenize to "and" and get
/// smart-stemmed like any 3-letter word) — the caller (retrieval.rs) detects the
/// explicit-AND case by scanning the raw query string before tokenization.
pub fn analyze_query(query: &str) -> QueryTokens {
    let unigrams = analyze_text(query);
    let bigrams = ngrams(&unigrams, 2);
    let trigrams = ngrams(&unigrams, 3);
    QueryTokens {
        unigrams,
        bigrams,
        trigrams,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_matches_between_query_and_document_paths() {
        let query_tokens = analyze_query("Machine Learning");
        let doc_tokens = analyze_text("Machine Learning");
        assert_eq!(query_tokens.unigrams, doc_tokens);
        assert_eq!(query_tokens.bigrams, vec!["machin_learn".to_string()]);
    }

    #[test]
    fn ngrams_join_with_underscore() {
        let tokens = vec!["gaza".to_string(), "is".to_string(), "in".to_string()];
        assert_eq!(ngrams(&tokens, 3), vec!["gaza_is_in".to_string()]);
        assert_eq!(
            ngrams(&tokens, 2),
            vec!["gaza_is".to_string(), "is_in".to_string()]
        );
    }

    #[test]
    fn stop_words_are_not_filtered() {
        // No stop-word list anywhere: "is"/"in" survive tokenization.
        let tokens = analyze_text("Gaza is in the news");
        assert!(tokens.contains(&"is".to_string()));
        assert!(tokens.contains(&"in".to_string()));
        assert!(tokens.contains(&"the".to_string()));
    }

    #[test]
    fn important_stream_doubles_weight() {
        let table = build_token_table("gaza", "gaza");
        let w = table.get("gaza").unwrap();
        assert_eq!(w.normal_count, 1);
        assert_eq!(w.important_count, 2);
        assert_eq!(w.total(), 3);
    }

    #[test]
    fn punctuation_splits_tokens() {
        let tokens = analyze_text("gaza, news.");
        assert_eq!(tokens, vec!["gaza".to_string(), "new".to_string()]);
    }
}
