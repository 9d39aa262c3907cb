//! Term lexicon: byte-offset directory into the final index file, enabling O(1) seeks
//! at query time (SPEC_FULL.md §4.7), grounded on the original Python implementation's
//! lexicon-building scan in `InvertedIndex._write_final_index` (original_source
//! `inverted-index-engine/src/build_index.py`).

use crate::error::IndexError;
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// One lexicon entry: byte offset and length of the term's line in the final index
/// file (including its LF terminator), and its document frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconEntry {
    pub offset: u64,
    pub length: u64,
    pub doc_frequency: u64,
}

/// Scans `index_path` line by line, recording each term's byte offset, byte length,
/// and document frequency, and writes `term offset length df` lines to `lexicon_path`.
pub fn build(index_path: &Path, lexicon_path: &Path) -> Result<(), IndexError> {
    let file = File::open(index_path).map_err(|source| IndexError::MergeIo {
        path: index_path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut out = String::new();
    let mut offset: u64 = 0;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).map_err(|source| IndexError::MergeIo {
            path: index_path.to_path_buf(),
            source,
        })?;
        if bytes_read == 0 {
            break;
        }
        let byte_len = line.len() as u64;
        let trimmed = line.trim_end_matches('\n');
        if let Some((term, postings)) = trimmed.split_once(':') {
            let df = if postings.is_empty() {
                0
            } else {
                postings.matches(',').count() as u64 + 1
            };
            out.push_str(&format!("{term} {offset} {byte_len} {df}\n"));
        }
        offset += byte_len;
    }

    std::fs::write(lexicon_path, out).map_err(|source| IndexError::MergeIo {
        path: lexicon_path.to_path_buf(),
        source,
    })
}

/// The in-memory lexicon, loaded once at query-engine startup.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: AHashMap<String, LexiconEntry>,
}

impl Lexicon {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&LexiconEntry> {
        self.entries.get(term)
    }

    pub fn load(lexicon_path: &Path) -> Result<Self, IndexError> {
        let file = File::open(lexicon_path).map_err(|source| IndexError::IndexNotInitialized {
            dir: lexicon_path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default(),
            reason: source.to_string(),
        })?;
        let mut entries = AHashMap::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| IndexError::MergeIo {
                path: lexicon_path.to_path_buf(),
                source,
            })?;
            let mut parts = line.split(' ');
            let (Some(term), Some(offset), Some(length), Some(df)) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            let (Ok(offset), Ok(length), Ok(df)) =
                (offset.parse::<u64>(), length.parse::<u64>(), df.parse::<u64>())
            else {
                continue;
            };
            entries.insert(
                term.to_string(),
                LexiconEntry {
                    offset,
                    length,
                    doc_frequency: df,
                },
            );
        }
        Ok(Self { entries })
    }
}

/// Seeks to `entry.offset` in `index_path` and reads exactly `entry.length` bytes,
/// returning the raw `term:postings` line (including its LF terminator).
pub fn read_line_at(index_path: &Path, entry: &LexiconEntry) -> Result<String, IndexError> {
    let mut file = File::open(index_path).map_err(|source| IndexError::MergeIo {
        path: index_path.to_path_buf(),
        source,
    })?;
    file.seek(SeekFrom::Start(entry.offset)).map_err(|source| IndexError::MergeIo {
        path: index_path.to_path_buf(),
        source,
    })?;
    let mut buf = vec![0u8; entry.length as usize];
    file.read_exact(&mut buf).map_err(|source| IndexError::MergeIo {
        path: index_path.to_path_buf(),
        source,
    })?;
    String::from_utf8(buf).map_err(|e| IndexError::LexiconMismatch {
        term: String::new(),
        offset: entry.offset,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lexicon_offsets_are_contiguous_and_seekable() {
        let tmp = tempfile::tempdir().unwrap();
        let index_path = tmp.path().join("inverted_index.txt");
        fs::write(&index_path, "alpha:1:1\nbeta:1:2,2:1\n").unwrap();
        let lexicon_path = tmp.path().join("lexicon.txt");
        build(&index_path, &lexicon_path).unwrap();

        let lexicon = Lexicon::load(&lexicon_path).unwrap();
        assert_eq!(lexicon.len(), 2);

        let alpha = lexicon.get("alpha").unwrap();
        assert_eq!(alpha.offset, 0);
        assert_eq!(alpha.doc_frequency, 1);
        let beta = lexicon.get("beta").unwrap();
        assert_eq!(beta.offset, alpha.offset + alpha.length);
        assert_eq!(beta.doc_frequency, 2);

        let line = read_line_at(&index_path, beta).unwrap();
        assert_eq!(line, "beta:1:2,2:1\n");
    }

    #[test]
    fn doc_frequency_counts_comma_separated_postings() {
        let tmp = tempfile::tempdir().unwrap();
        let index_path = tmp.path().join("inverted_index.txt");
        fs::write(&index_path, "term:1:1,2:1,3:1\n").unwrap();
        let lexicon_path = tmp.path().join("lexicon.txt");
        build(&index_path, &lexicon_path).unwrap();
        let lexicon = Lexicon::load(&lexicon_path).unwrap();
        assert_eq!(lexicon.get("term").unwrap().doc_frequency, 3);
    }
}
