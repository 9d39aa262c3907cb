//! Property-based tests for the invariants in SPEC_FULL.md §8.

use ahash::AHashMap;
use html_index::analyzer::{analyze_query, analyze_text, smart_stem};
use html_index::models::TermWeight;
use html_index::simhash::{fingerprint, hamming_distance};
use html_index::url_map::UrlMap;
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,80}"
}

fn arb_url() -> impl Strategy<Value = String> {
    "https?://[a-z]{3,10}\\.example/[a-z0-9/]{0,20}"
}

proptest! {
    /// Query-side and document-side tokenization must agree on every input
    /// (SPEC_FULL.md §8: "Stemming stability").
    #[test]
    fn stemming_stability(s in arb_text()) {
        let document_tokens = analyze_text(&s);
        let query_tokens = analyze_query(&s);
        prop_assert_eq!(document_tokens, query_tokens.unigrams);
    }

    /// Any 2-3 character all-uppercase alphabetic token survives as its lowercased
    /// form, never Porter-stemmed.
    #[test]
    fn acronym_preservation(letters in "[A-Z]{2,3}") {
        let lower = letters.to_lowercase();
        prop_assert_eq!(smart_stem(&lower, &letters), lower);
    }

    /// After assigning a set of distinct URLs, both directions of the mapping round
    /// trip for every admitted URL/id (SPEC_FULL.md §8: "URL map bijection"). doc_id 0
    /// is never assigned.
    #[test]
    fn url_map_bijection(urls in prop::collection::vec(arb_url(), 1..30)) {
        let mut map = UrlMap::new();
        let mut assigned = Vec::new();
        for url in &urls {
            assigned.push((url.clone(), map.assign(url)));
        }
        for (url, id) in &assigned {
            prop_assert_ne!(*id, 0);
            prop_assert_eq!(map.url_for(*id), Some(url.as_str()));
            prop_assert_eq!(map.id_for(url), Some(*id));
        }
    }

    /// Hamming distance is symmetric, so the near-duplicate relation it drives is too.
    #[test]
    fn simhash_symmetry(
        terms_a in prop::collection::vec(("[a-z]{3,8}", 1u32..10), 0..20),
        terms_b in prop::collection::vec(("[a-z]{3,8}", 1u32..10), 0..20),
    ) {
        let table_a: AHashMap<String, TermWeight> = terms_a
            .into_iter()
            .map(|(t, w)| (t, TermWeight { normal_count: w, important_count: 0 }))
            .collect();
        let table_b: AHashMap<String, TermWeight> = terms_b
            .into_iter()
            .map(|(t, w)| (t, TermWeight { normal_count: w, important_count: 0 }))
            .collect();
        let fp_a = fingerprint(&table_a);
        let fp_b = fingerprint(&table_b);
        prop_assert_eq!(hamming_distance(fp_a, fp_b), hamming_distance(fp_b, fp_a));
    }

    /// A query that reduces to zero alphanumeric tokens must yield an empty token set,
    /// not an error (SPEC_FULL.md §8: "Empty-query safety").
    #[test]
    fn empty_query_safety(s in "[^a-zA-Z0-9]{0,20}") {
        let tokens = analyze_query(&s);
        prop_assert!(tokens.is_empty());
    }
}
