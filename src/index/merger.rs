//! K-way external merge of partial segments into one sorted, deduplicated final index
//! (SPEC_FULL.md §4.6), grounded on the original Python implementation's
//! `InvertedIndex._merge_partial_indexes` (original_source
//! `inverted-index-engine/src/build_index.py`).

use crate::error::IndexError;
use ahash::AHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A partial segment's read cursor: the current `(term, postings_str)` line, or `None`
/// once exhausted.
struct Cursor {
    reader: BufReader<File>,
    current: Option<(String, String)>,
}

impl Cursor {
    fn open(path: &Path) -> Result<Self, IndexError> {
        let file = File::open(path).map_err(|source| IndexError::MergeIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cursor = Self {
            reader: BufReader::new(file),
            current: None,
        };
        cursor.advance(path)?;
        Ok(cursor)
    }

    fn advance(&mut self, path: &Path) -> Result<(), IndexError> {
        let mut line = String::new();
        let bytes_read = self
            .reader
            .read_line(&mut line)
            .map_err(|source| IndexError::MergeIo {
                path: path.to_path_buf(),
                source,
            })?;
        if bytes_read == 0 {
            self.current = None;
            return Ok(());
        }
        let trimmed = line.trim_end_matches('\n');
        self.current = trimmed
            .split_once(':')
            .map(|(term, postings)| (term.to_string(), postings.to_string()));
        Ok(())
    }
}

/// Parses a `doc_id:weight,doc_id:weight,...` postings string into `map`, summing
/// weights for any doc_id already present (the merge-time dedup rule).
fn accumulate_postings(map: &mut AHashMap<u32, u32>, postings: &str) {
    if postings.is_empty() {
        return;
    }
    for entry in postings.split(',') {
        if let Some((id_str, w_str)) = entry.split_once(':') {
            if let (Ok(doc_id), Ok(weight)) = (id_str.parse::<u32>(), w_str.parse::<u32>()) {
                *map.entry(doc_id).or_insert(0) += weight;
            }
        }
    }
}

/// Merges all `partial_paths` (each already sorted by term ascending) into one file at
/// `output_path`, with terms strictly increasing and, within a term, doc_ids strictly
/// increasing and summed across partials. Also applied (symmetrically) to a single
/// partial, satisfying §4.6's "no partials" case since the builder always spills at
/// least one segment before finalizing.
pub fn merge(partial_paths: &[PathBuf], output_path: &Path) -> Result<(), IndexError> {
    let mut cursors: Vec<Cursor> = partial_paths
        .iter()
        .map(|p| Cursor::open(p))
        .collect::<Result<_, _>>()?;

    let mut heap: BinaryHeap<Reverse<(String, usize)>> = BinaryHeap::new();
    for (i, cursor) in cursors.iter().enumerate() {
        if let Some((term, _)) = &cursor.current {
            heap.push(Reverse((term.clone(), i)));
        }
    }

    let out_file = File::create(output_path).map_err(|source| IndexError::MergeIo {
        path: output_path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(out_file);

    while let Some(Reverse((term, first_idx))) = heap.pop() {
        let mut doc_weights: AHashMap<u32, u32> = AHashMap::new();
        let mut contributing = vec![first_idx];
        accumulate_postings(&mut doc_weights, &cursors[first_idx].current.as_ref().unwrap().1);

        while let Some(Reverse((next_term, _))) = heap.peek() {
            if *next_term != term {
                break;
            }
            let Reverse((_, idx)) = heap.pop().unwrap();
            accumulate_postings(&mut doc_weights, &cursors[idx].current.as_ref().unwrap().1);
            contributing.push(idx);
        }

        let mut doc_ids: Vec<&u32> = doc_weights.keys().collect();
        doc_ids.sort_unstable();
        let rendered: Vec<String> = doc_ids.iter().map(|id| format!("{id}:{}", doc_weights[id])).collect();
        writeln!(writer, "{term}:{}", rendered.join(","))
            .map_err(|source| IndexError::MergeIo { path: output_path.to_path_buf(), source })?;

        for idx in contributing {
            cursors[idx].advance(&partial_paths[idx])?;
            if let Some((next_term, _)) = &cursors[idx].current {
                heap.push(Reverse((next_term.clone(), idx)));
            }
        }
    }

    writer
        .flush()
        .map_err(|source| IndexError::MergeIo { path: output_path.to_path_buf(), source })
}
