//! Error taxonomy for a comparison run
//!
//! Every variant is fatal: the run aborts on the first error and no report is
//! committed. Variants carry the file path (and key column or offset) so the
//! caller can diagnose without a debugger.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Coarse category of a [`CompareError`], used for the exit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MissingKeyColumn,
    FileNotFound,
    PermissionDenied,
    SeekFailure,
    IoError,
    Unexpected,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::MissingKeyColumn => "MissingKeyColumn",
            ErrorCategory::FileNotFound => "FileNotFound",
            ErrorCategory::PermissionDenied => "PermissionDenied",
            ErrorCategory::SeekFailure => "SeekFailure",
            ErrorCategory::IoError => "IOError",
            ErrorCategory::Unexpected => "Unexpected",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("key column '{key_column}' not found in {} header: {header:?}", .path.display())]
    MissingKeyColumn {
        path: PathBuf,
        key_column: String,
        header: Vec<String>,
    },

    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf, source: io::Error },

    #[error("permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf, source: io::Error },

    #[error("cannot read row at offset {offset} in {}: {reason}", .path.display())]
    SeekFailure {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to render report: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    Unexpected(String),
}

impl CompareError {
    /// Classify an I/O error raised while touching `path`.
    pub fn io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => CompareError::FileNotFound { path, source },
            io::ErrorKind::PermissionDenied => CompareError::PermissionDenied { path, source },
            _ => CompareError::Io { path, source },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CompareError::MissingKeyColumn { .. } => ErrorCategory::MissingKeyColumn,
            CompareError::FileNotFound { .. } => ErrorCategory::FileNotFound,
            CompareError::PermissionDenied { .. } => ErrorCategory::PermissionDenied,
            CompareError::SeekFailure { .. } => ErrorCategory::SeekFailure,
            CompareError::Io { .. } => ErrorCategory::IoError,
            CompareError::Report(_) | CompareError::Unexpected(_) => ErrorCategory::Unexpected,
        }
    }
}

pub type Result<T, E = CompareError> = std::result::Result<T, E>;
