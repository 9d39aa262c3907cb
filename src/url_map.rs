//! Bidirectional URL<->doc_id assignment (SPEC_FULL.md §4.1), grounded on the original
//! Python implementation's `URLMapper` (original_source
//! `inverted-index-engine/src/build_index.py`). `doc_id` 0 is reserved and never
//! assigned to a real document, so callers can use it as an "unassigned" sentinel.

use crate::error::IndexError;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

const MODULUS: u64 = (1 << 31) - 1;

/// Deterministic polynomial hash of `url`, in `[1, MODULUS]`, used as the starting slot
/// for linear probing. Matches the original's `h = (h * 31 + ord(c)) % (2**31 - 1)`.
fn polynomial_hash(url: &str) -> u32 {
    let mut h: u64 = 0;
    for b in url.bytes() {
        h = (h * 31 + b as u64) % MODULUS;
    }
    (h + 1) as u32
}

/// Bidirectional `url <-> doc_id` table with deterministic, collision-resolved
/// assignment. `doc_id` 0 is never assigned.
#[derive(Debug, Clone, Default)]
pub struct UrlMap {
    url_to_id: HashMap<String, u32>,
    id_to_url: HashMap<u32, String>,
}

impl UrlMap {
    pub fn new() -> Self {
        Self {
            url_to_id: HashMap::new(),
            id_to_url: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.url_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.url_to_id.is_empty()
    }

    pub fn id_for(&self, url: &str) -> Option<u32> {
        self.url_to_id.get(url).copied()
    }

    pub fn url_for(&self, doc_id: u32) -> Option<&str> {
        self.id_to_url.get(&doc_id).map(|s| s.as_str())
    }

    /// Assigns `url` a `doc_id` via the polynomial hash with linear-probe collision
    /// resolution (SPEC_FULL.md §4.3): `h = polynomial_hash(url)`, then `h, h+1, h+2,
    /// …` (wrapping past `MODULUS` back to `1`, since `0` is reserved) until an
    /// unassigned id is found. Returns the existing `doc_id` if `url` was already
    /// mapped.
    pub fn assign(&mut self, url: &str) -> u32 {
        if let Some(&id) = self.url_to_id.get(url) {
            return id;
        }
        let mut id = polynomial_hash(url);
        while self.id_to_url.contains_key(&id) {
            id = if id >= MODULUS as u32 { 1 } else { id + 1 };
        }
        self.url_to_id.insert(url.to_string(), id);
        self.id_to_url.insert(id, url.to_string());
        id
    }

    /// Persists the mapping as `doc_id:url` lines, sorted by `doc_id`, to
    /// `dir/url_mapping.txt` (SPEC_FULL.md §6's on-disk artifact table).
    pub fn save(&self, dir: &Path) -> Result<(), IndexError> {
        let path = dir.join("url_mapping.txt");
        let mut ids: Vec<&u32> = self.id_to_url.keys().collect();
        ids.sort_unstable();
        let mut out = String::new();
        for id in ids {
            out.push_str(&id.to_string());
            out.push(':');
            out.push_str(&self.id_to_url[id]);
            out.push('\n');
        }
        fs::write(&path, out).map_err(|source| IndexError::MergeIo { path, source })
    }

    /// Loads a previously saved `url_mapping.txt`.
    pub fn load(dir: &Path) -> Result<Self, IndexError> {
        let path = dir.join("url_mapping.txt");
        let file = fs::File::open(&path).map_err(|source| IndexError::IndexNotInitialized {
            dir: dir.to_path_buf(),
            reason: source.to_string(),
        })?;
        let mut map = Self::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| IndexError::MergeIo {
                path: path.clone(),
                source,
            })?;
            // URLs may themselves contain colons (`http://...`), so split on the first
            // one only; the doc_id prefix is always numeric.
            let Some((id_str, url)) = line.split_once(':') else {
                continue;
            };
            let Ok(id) = id_str.parse::<u32>() else {
                continue;
            };
            map.url_to_id.insert(url.to_string(), id);
            map.id_to_url.insert(id, url.to_string());
        }
        Ok(map)
    }
}

/// Strips a `#fragment` suffix from `url`, per SPEC_FULL.md §4.1 (fragment-only
/// variants of the same page must collapse to one document).
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn doc_id_zero_is_never_assigned() {
        let mut map = UrlMap::new();
        assert_eq!(map.assign("https://a.example/"), polynomial_hash("https://a.example/"));
        assert_ne!(map.assign("https://a.example/"), 0);
        assert_ne!(map.assign("https://b.example/"), 0);
    }

    #[test]
    fn colliding_hash_resolves_via_linear_probe() {
        let mut map = UrlMap::new();
        let h = polynomial_hash("https://a.example/");
        // Pre-occupy the hash slot so the second URL must probe forward.
        map.id_to_url.insert(h, "placeholder".to_string());
        let id = map.assign("https://a.example/");
        assert_eq!(id, h + 1);
    }

    #[test]
    fn probe_wraps_past_modulus() {
        let mut map = UrlMap::new();
        map.id_to_url.insert(MODULUS as u32, "placeholder".to_string());
        // Force a collision at the maximum id so the probe must wrap to 1.
        map.id_to_url.insert(1, "placeholder".to_string());
        let mut id = MODULUS as u32;
        while map.id_to_url.contains_key(&id) {
            id = if id >= MODULUS as u32 { 1 } else { id + 1 };
        }
        assert_eq!(id, 2);
    }

    #[test]
    fn repeated_assign_is_idempotent() {
        let mut map = UrlMap::new();
        let first = map.assign("https://a.example/");
        let second = map.assign("https://a.example/");
        assert_eq!(first, second);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn fragment_is_stripped_before_assignment() {
        assert_eq!(strip_fragment("https://a.example/#section"), "https://a.example/");
        assert_eq!(strip_fragment("https://a.example/"), "https://a.example/");
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let mut map = UrlMap::new();
        map.assign("https://a.example/");
        map.assign("https://b.example/");
        let dir = tempdir().unwrap();
        map.save(dir.path()).unwrap();
        let loaded = UrlMap::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.id_for("https://a.example/"), Some(1));
        assert_eq!(loaded.url_for(1), Some("https://a.example/"));
    }
}
