//! Line/offset indexer
//!
//! Scans one input file sequentially and records, for every data line, the byte
//! offset where that line starts, keyed by the value in the key column. Only one
//! line is held in memory at a time; the index costs O(distinct keys).
//!
//! ## Duplicate keys
//!
//! A key seen on several lines keeps the offset of the LAST occurrence. Earlier
//! rows for that key are unreachable afterwards, so the number of overwritten
//! entries is counted and logged.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use super::header::Header;
use super::line::{decode_line, nth_field, trim_line_ending};
use crate::error::{CompareError, Result};

const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Key value -> byte offset of the row's first byte.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    offsets: FxHashMap<String, u64>,
    duplicate_keys: u64,
    skipped_lines: u64,
}

impl KeyIndex {
    pub fn get(&self, key: &str) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.offsets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.offsets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.offsets.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Lines whose key replaced an earlier line's entry.
    pub fn duplicate_keys(&self) -> u64 {
        self.duplicate_keys
    }

    /// Non-empty lines with too few fields to reach the key column.
    pub fn skipped_lines(&self) -> u64 {
        self.skipped_lines
    }

    fn record(&mut self, key: &str, offset: u64) {
        match self.offsets.get_mut(key) {
            Some(existing) => {
                *existing = offset;
                self.duplicate_keys += 1;
            }
            None => {
                self.offsets.insert(key.to_string(), offset);
            }
        }
    }
}

/// An input file after indexing: where it lives, its header, and its index.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    path: PathBuf,
    header: Header,
    key_position: usize,
    index: KeyIndex,
}

impl IndexedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn key_position(&self) -> usize {
        self.key_position
    }

    pub fn index(&self) -> &KeyIndex {
        &self.index
    }

    /// File name without directories, as shown in the report's SourceFile column.
    pub fn source_name(&self) -> String {
        crate::utils::source_name(&self.path)
    }
}

/// Build the key -> offset index for `path`, joining on `key_column`.
///
/// Fails with `MissingKeyColumn` when the header lacks the key column. Data
/// lines that are empty or too short to hold the key column are skipped.
pub fn build_index(path: &Path, key_column: &str) -> Result<IndexedFile> {
    let start_time = Instant::now();

    let file = File::open(path).map_err(|e| CompareError::io(path, e))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut line: Vec<u8> = Vec::with_capacity(4096);

    let header_len = reader
        .read_until(b'\n', &mut line)
        .map_err(|e| CompareError::io(path, e))?;
    let header = Header::parse(decode_line(path, 0, trim_line_ending(&line))?);
    info!(path = %path.display(), columns = ?header.columns(), "read header");

    let key_position = match header.position(key_column) {
        Some(pos) => pos,
        None => {
            warn!(path = %path.display(), key_column, "key column missing from header");
            return Err(CompareError::MissingKeyColumn {
                path: path.to_path_buf(),
                key_column: key_column.to_string(),
                header: header.columns().to_vec(),
            });
        }
    };
    if header.occurrences(key_column) > 1 {
        warn!(
            path = %path.display(),
            key_column,
            position = key_position,
            "key column appears more than once, joining on the first"
        );
    }

    let mut index = KeyIndex::default();
    let mut offset = header_len as u64;

    loop {
        line.clear();
        let line_start = offset;
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| CompareError::io(path, e))?;
        if n == 0 {
            break;
        }
        offset += n as u64;

        let content = trim_line_ending(&line);
        if content.is_empty() {
            continue;
        }
        let text = decode_line(path, line_start, content)?;
        match nth_field(text, key_position) {
            Some(key) => index.record(key, line_start),
            None => index.skipped_lines += 1,
        }
    }

    debug!(
        path = %path.display(),
        bytes = offset,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "scan finished"
    );
    info!(path = %path.display(), keys = index.len(), "indexed");
    if index.duplicate_keys > 0 {
        warn!(
            path = %path.display(),
            duplicates = index.duplicate_keys,
            "duplicate keys found, keeping the last occurrence of each"
        );
    }
    if index.skipped_lines > 0 {
        debug!(
            path = %path.display(),
            skipped = index.skipped_lines,
            "skipped lines shorter than the key column position"
        );
    }

    Ok(IndexedFile {
        path: path.to_path_buf(),
        header,
        key_position,
        index,
    })
}
