//! End-to-end comparison run
//!
//! index file1 -> index file2 -> reconcile into the report -> save atomically.
//! Any error aborts the run before the report is committed.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::CompareConfig;
use crate::error::Result;
use crate::join::{build_index, IndexedFile, Partition, PartitionCounts, Reconciler};
use crate::observer::{RunObserver, Stage};
use crate::report::XlsxReport;
use crate::utils::resolve_output_path;

/// Per-input diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    pub path: String,
    pub keys: u64,
    pub duplicate_keys: u64,
    pub skipped_lines: u64,
}

impl InputSummary {
    fn of(file: &IndexedFile) -> Self {
        Self {
            path: file.path().display().to_string(),
            keys: file.index().len() as u64,
            duplicate_keys: file.index().duplicate_keys(),
            skipped_lines: file.index().skipped_lines(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCounts {
    pub matching: usize,
    pub only_in_file1: usize,
    pub only_in_file2: usize,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub file1: InputSummary,
    pub file2: InputSummary,
    pub key_column: String,
    pub output: PathBuf,
    pub counts: PartitionCounts,
    pub pages: PageCounts,
    pub elapsed_ms: u64,
}

/// Index both inputs, file1 first. A missing key column in either file stops
/// the run here, before any comparison work.
pub fn index_inputs<O: RunObserver + ?Sized>(
    file1: &Path,
    file2: &Path,
    key_column: &str,
    observer: &mut O,
) -> Result<(IndexedFile, IndexedFile)> {
    let stage_start = Instant::now();
    info!(key_column, "joining on key column");

    let left = build_index(file1, key_column)?;
    observer.on_progress(Stage::Indexing, left.index().len() as u64);
    let right = build_index(file2, key_column)?;
    observer.on_progress(Stage::Indexing, right.index().len() as u64);

    observer.on_timing(Stage::Indexing, stage_start.elapsed());
    Ok((left, right))
}

/// Compare `file1` with `file2` and write the xlsx report to `output`, or to a
/// timestamped sibling of it when `output` already exists.
pub fn compare_files<O: RunObserver + ?Sized>(
    file1: &Path,
    file2: &Path,
    output: &Path,
    config: &CompareConfig,
    observer: &mut O,
) -> Result<RunSummary> {
    let run_start = Instant::now();

    let (left, right) = index_inputs(file1, file2, &config.key_column, observer)?;
    let reconciler = Reconciler::new(&left, &right, &config.key_column);

    let mut report = XlsxReport::new(reconciler.report_header(), config.page_capacity);
    let counts = reconciler.run(&mut report, observer, config.progress_interval)?;
    let pages = PageCounts {
        matching: report.pages(Partition::Matching),
        only_in_file1: report.pages(Partition::OnlyInLeft),
        only_in_file2: report.pages(Partition::OnlyInRight),
    };

    let save_start = Instant::now();
    let output = resolve_output_path(output);
    info!(output = %output.display(), "saving report");
    report.save(&output)?;
    observer.on_timing(Stage::Saving, save_start.elapsed());

    let elapsed = run_start.elapsed();
    observer.on_timing(Stage::Total, elapsed);

    Ok(RunSummary {
        file1: InputSummary::of(&left),
        file2: InputSummary::of(&right),
        key_column: config.key_column.clone(),
        output,
        counts,
        pages,
        elapsed_ms: elapsed.as_millis() as u64,
    })
}
