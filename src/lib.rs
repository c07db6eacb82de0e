//! csv-keydiff - key-joined comparison of large CSV files
//!
//! Each input is scanned once to build a key -> byte offset index; rows are
//! then re-read one at a time by seeking, so file contents never have to fit in
//! memory. Keys are split into "present in both", "only in file1" and "only in
//! file2", and the result is written as a paginated xlsx report with differing
//! cells highlighted.
//!
//! Inputs are split naively on commas. Quoted fields containing commas are not
//! supported.

/// Offset index, row materializer and key-set reconciler
pub mod join;

/// Report sinks (xlsx, in-memory)
pub mod report;

pub mod compare;
pub mod config;
pub mod error;
pub mod observer;
/// Path helpers
pub mod utils;

pub use compare::{compare_files, index_inputs, RunSummary};
pub use config::CompareConfig;
pub use error::{CompareError, ErrorCategory, Result};
pub use observer::{LogObserver, NoopObserver, RunObserver, Stage};
