//! Row materializer: re-read one indexed row on demand

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use rustc_hash::FxHashMap;

use super::header::Header;
use super::line::{decode_line, split_fields, trim_line_ending};
use crate::error::{CompareError, Result};

/// Column name -> raw value for a single row.
///
/// Columns the line was too short to fill are absent; [`RowRecord::value`]
/// reads them as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    fields: FxHashMap<String, String>,
}

impl RowRecord {
    /// Pair header names with the line's fields. Surplus fields are dropped;
    /// a repeated header name keeps the later field.
    pub fn from_line(line: &str, header: &Header) -> Self {
        let fields = header
            .columns()
            .iter()
            .zip(split_fields(line))
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Seek to `offset` in `path` and parse the line found there.
///
/// The file is opened per call and closed on return. `offset` must come from
/// the index built for this same file; an offset at or past the end of the file
/// is a `SeekFailure`.
pub fn fetch_row(path: &Path, offset: u64, header: &Header) -> Result<RowRecord> {
    let mut file = File::open(path).map_err(|e| CompareError::io(path, e))?;
    let file_len = file
        .metadata()
        .map_err(|e| CompareError::io(path, e))?
        .len();
    if offset >= file_len {
        return Err(CompareError::SeekFailure {
            path: path.to_path_buf(),
            offset,
            reason: format!("offset is past the end of the file ({file_len} bytes)"),
        });
    }

    file.seek(SeekFrom::Start(offset))
        .map_err(|e| CompareError::SeekFailure {
            path: path.to_path_buf(),
            offset,
            reason: e.to_string(),
        })?;

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    reader
        .read_until(b'\n', &mut line)
        .map_err(|e| CompareError::io(path, e))?;

    let text = decode_line(path, offset, trim_line_ending(&line))?;
    Ok(RowRecord::from_line(text, header))
}
