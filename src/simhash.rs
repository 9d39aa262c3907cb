//! SimHash near-duplicate detection (SPEC_FULL.md §4.3), grounded on the original
//! Python implementation's `Document._compute_simhash` / `NearDuplicateDetector`
//! (original_source `inverted-index-engine/src/build_index.py`).

use crate::models::TermWeight;
use ahash::AHashMap;

/// Computes the 64-bit SimHash fingerprint of a document's token table. Each term
/// contributes an MD5 hash truncated to its low 64 bits; the term's total weight
/// (`normal_count + important_count`) votes each of the 64 bits up or down, and the
/// final fingerprint takes the sign of each bit position.
pub fn fingerprint(token_table: &AHashMap<String, TermWeight>) -> u64 {
    let mut accumulator = [0i64; 64];
    for (term, weight) in token_table {
        let digest = md5::compute(term.as_bytes());
        let hash = u64::from_be_bytes(digest[0..8].try_into().unwrap());
        let w = weight.total() as i64;
        for (bit, acc) in accumulator.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *acc += w;
            } else {
                *acc -= w;
            }
        }
    }
    let mut fp: u64 = 0;
    for (bit, acc) in accumulator.iter().enumerate() {
        if *acc > 0 {
            fp |= 1 << bit;
        }
    }
    fp
}

/// Number of differing bits between two fingerprints.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Linear-scan near-duplicate index: every admitted fingerprint is kept, and a new
/// candidate is checked against all of them. O(N) per check, matching the original's
/// deliberately simple approach (no LSH bucketing) — see SPEC_FULL.md §4.3's Non-goals.
#[derive(Debug, Clone)]
pub struct NearDuplicateDetector {
    threshold: u32,
    fingerprints: Vec<(u32, u64)>,
}

impl NearDuplicateDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            fingerprints: Vec::new(),
        }
    }

    /// Returns the `doc_id` of the first previously-admitted document whose fingerprint
    /// is within `threshold` Hamming distance of `fp`, if any.
    pub fn find_near_duplicate(&self, fp: u64) -> Option<(u32, u32)> {
        self.fingerprints
            .iter()
            .map(|&(doc_id, existing)| (doc_id, hamming_distance(fp, existing)))
            .find(|&(_, dist)| dist <= self.threshold)
    }

    pub fn add(&mut self, doc_id: u32, fp: u64) {
        self.fingerprints.push((doc_id, fp));
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Persists as `doc_id:fingerprint_u64_decimal` lines to `dir/fingerprints.txt`
    /// (SPEC_FULL.md §6's on-disk artifact table). Audit-only: not required at query
    /// startup.
    pub fn save(&self, dir: &std::path::Path) -> Result<(), crate::error::IndexError> {
        let path = dir.join("fingerprints.txt");
        let mut out = String::new();
        for (doc_id, fp) in &self.fingerprints {
            out.push_str(&format!("{doc_id}:{fp}\n"));
        }
        std::fs::write(&path, out).map_err(|source| crate::error::IndexError::MergeIo {
            path,
            source,
        })
    }

    pub fn load(dir: &std::path::Path, threshold: u32) -> Result<Self, crate::error::IndexError> {
        let path = dir.join("fingerprints.txt");
        let mut detector = Self::new(threshold);
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Ok(detector);
        };
        for line in contents.lines() {
            let Some((id_str, fp_str)) = line.split_once(':') else {
                continue;
            };
            let (Ok(doc_id), Ok(fp)) = (id_str.parse::<u32>(), fp_str.parse::<u64>()) else {
                continue;
            };
            detector.fingerprints.push((doc_id, fp));
        }
        Ok(detector)
    }
}
