//! The smart-stem rule (SPEC_FULL.md §4.2), grounded on the original Python
//! implementation's `_smart_stem`/`_should_preserve_token` (original_source
//! `inverted-index-engine/src/search_index.py`) and on the teacher's global stemmer
//! singleton (`src/ranking.rs::get_stemmer`).

use rust_stemmers::{Algorithm, Stemmer};
use std::sync::OnceLock;

/// Returns the process-wide Porter stemmer instance.
pub fn get_stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// True if `original_token` is a 2-3 character, all-uppercase, all-alphabetic acronym
/// (`UCI`, `ACM`). Such tokens bypass stemming entirely so they round-trip unchanged.
fn is_short_acronym(original_token: &str) -> bool {
    let len = original_token.chars().count();
    (1..=3).contains(&len)
        && original_token.chars().all(|c| c.is_ascii_uppercase())
        && original_token.chars().all(|c| c.is_alphabetic())
}

/// Applies the smart-stem rule to one already-lowercased, already-alphanumeric-filtered
/// token, given its original (pre-lowercasing) case for acronym detection.
///
/// - short all-uppercase acronym (len 2-3) -> lowercased, unstemmed
/// - any other token shorter than 3 chars -> unstemmed
/// - otherwise -> `PorterStem(lowercase_token)`
pub fn smart_stem(lowercase_token: &str, original_token: &str) -> String {
    if is_short_acronym(original_token) {
        return original_token.to_lowercase();
    }
    if lowercase_token.chars().count() < 3 {
        return lowercase_token.to_string();
    }
    get_stemmer().stem(lowercase_token).to_string()
}
