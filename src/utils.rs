//! Path helpers

use std::path::{Path, PathBuf};

use chrono::Local;

/// File name without directories; falls back to the full path when there is
/// no final component.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Return `requested` if nothing exists there yet, otherwise a sibling named
/// `<stem>_<YYYYmmdd_HHMMSS>.<ext>` (local time).
pub fn resolve_output_path(requested: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    resolve_output_path_with_stamp(requested, &stamp)
}

/// Same as [`resolve_output_path`] with an explicit stamp. When the stamped
/// name is taken too, `_2`, `_3`, ... is appended.
pub fn resolve_output_path_with_stamp(requested: &Path, stamp: &str) -> PathBuf {
    if !requested.exists() {
        return requested.to_path_buf();
    }

    let stem = requested
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "comparison_output".to_string());
    let extension = requested
        .extension()
        .map(|e| e.to_string_lossy().into_owned());
    let sibling = |suffix: &str| {
        let name = match &extension {
            Some(ext) => format!("{stem}_{suffix}.{ext}"),
            None => format!("{stem}_{suffix}"),
        };
        requested.with_file_name(name)
    };

    let mut candidate = sibling(stamp);
    let mut n = 2;
    while candidate.exists() {
        candidate = sibling(&format!("{stamp}_{n}"));
        n += 1;
    }
    candidate
}
