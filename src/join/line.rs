//! Line-level helpers shared by the indexer and the row materializer
//!
//! Splitting is a naive byte split on `,`: there is no quoting or escaping, so a
//! value containing a comma shifts every later field on its line.

use std::io;
use std::path::Path;

use memchr::memchr_iter;

use crate::error::{CompareError, Result};

pub const DELIMITER: u8 = b',';

const UTF8_BOM: &str = "\u{feff}";

/// Drop a trailing `\n` or `\r\n`.
pub fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

pub fn strip_bom(line: &str) -> &str {
    line.strip_prefix(UTF8_BOM).unwrap_or(line)
}

/// Decode one line read at `offset` of `path`.
pub fn decode_line<'a>(path: &Path, offset: u64, line: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(line).map_err(|e| CompareError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid UTF-8 in line at byte offset {offset}: {e}"),
        ),
    })
}

pub fn split_fields(line: &str) -> std::str::Split<'_, char> {
    line.split(DELIMITER as char)
}

/// Return the `n`-th field of `line`, or `None` when the line has fewer than
/// `n + 1` fields. Does not allocate.
pub fn nth_field(line: &str, n: usize) -> Option<&str> {
    let bytes = line.as_bytes();
    let mut start = 0;
    let mut seen = 0;
    for pos in memchr_iter(DELIMITER, bytes) {
        if seen == n {
            return Some(&line[start..pos]);
        }
        seen += 1;
        start = pos + 1;
    }
    (seen == n).then(|| &line[start..])
}
