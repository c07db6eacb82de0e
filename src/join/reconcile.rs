//! Key-set reconciler
//!
//! Splits the union of both key sets into Matching / OnlyInLeft / OnlyInRight,
//! materializes the rows each partition needs, and projects them onto the
//! unified columns. Matching rows carry per-cell difference flags.

use std::time::Instant;

use serde::Serialize;

use super::header::UnifiedColumns;
use super::indexer::{IndexedFile, KeyIndex};
use super::materialize::{fetch_row, RowRecord};
use super::Partition;
use crate::error::{CompareError, Result};
use crate::observer::{is_progress_tick, RunObserver, Stage};
use crate::report::{header_row, Cell, ReportRow, ReportSink};

/// Keys of each partition, in source-file order.
///
/// Matching and left-only keys follow the left file's line order, right-only
/// keys the right file's. Callers must not rely on the ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPartitions<'a> {
    pub matching: Vec<&'a str>,
    pub left_only: Vec<&'a str>,
    pub right_only: Vec<&'a str>,
}

impl<'a> KeyPartitions<'a> {
    pub fn compute(left: &'a KeyIndex, right: &'a KeyIndex) -> Self {
        let mut matching: Vec<(u64, &'a str)> = Vec::new();
        let mut left_only: Vec<(u64, &'a str)> = Vec::new();
        for (key, offset) in left.iter() {
            if right.contains_key(key) {
                matching.push((offset, key));
            } else {
                left_only.push((offset, key));
            }
        }
        let mut right_only: Vec<(u64, &'a str)> = right
            .iter()
            .filter(|(key, _)| !left.contains_key(key))
            .map(|(key, offset)| (offset, key))
            .collect();

        // Offsets are unique within one file, so this is a total order.
        matching.sort_unstable_by_key(|(offset, _)| *offset);
        left_only.sort_unstable_by_key(|(offset, _)| *offset);
        right_only.sort_unstable_by_key(|(offset, _)| *offset);

        let keys = |v: Vec<(u64, &'a str)>| -> Vec<&'a str> {
            v.into_iter().map(|(_, k)| k).collect()
        };
        Self {
            matching: keys(matching),
            left_only: keys(left_only),
            right_only: keys(right_only),
        }
    }

    pub fn keys(&self, partition: Partition) -> &[&'a str] {
        match partition {
            Partition::Matching => &self.matching,
            Partition::OnlyInLeft => &self.left_only,
            Partition::OnlyInRight => &self.right_only,
        }
    }
}

/// Keys emitted per partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionCounts {
    pub matching: u64,
    pub only_in_file1: u64,
    pub only_in_file2: u64,
}

pub struct Reconciler<'a> {
    left: &'a IndexedFile,
    right: &'a IndexedFile,
    columns: UnifiedColumns,
    left_name: String,
    right_name: String,
}

impl<'a> Reconciler<'a> {
    pub fn new(left: &'a IndexedFile, right: &'a IndexedFile, key_column: &str) -> Self {
        Self {
            left,
            right,
            columns: UnifiedColumns::new(key_column, left.header(), right.header()),
            left_name: left.source_name(),
            right_name: right.source_name(),
        }
    }

    pub fn columns(&self) -> &UnifiedColumns {
        &self.columns
    }

    /// `[SourceFile, <unified columns...>]`
    pub fn report_header(&self) -> Vec<String> {
        header_row(self.columns.names())
    }

    pub fn partitions(&self) -> KeyPartitions<'a> {
        KeyPartitions::compute(self.left.index(), self.right.index())
    }

    /// Rows for a key present in both files: left row first, then right.
    ///
    /// A column is flagged on both rows when it exists in both headers and the
    /// raw values differ. Columns from one header only are never flagged.
    pub fn matched_pair(&self, key: &str) -> Result<(ReportRow, ReportRow)> {
        let left_row = materialize(self.left, key)?;
        let right_row = materialize(self.right, key)?;

        let mut left_cells = Vec::with_capacity(self.columns.len());
        let mut right_cells = Vec::with_capacity(self.columns.len());
        for column in self.columns.iter() {
            let left_value = left_row.value(&column.name);
            let right_value = right_row.value(&column.name);
            let differs = column.is_compared() && left_value != right_value;
            left_cells.push(Cell::new(left_value, differs));
            right_cells.push(Cell::new(right_value, differs));
        }

        Ok((
            ReportRow {
                source: self.left_name.clone(),
                cells: left_cells,
            },
            ReportRow {
                source: self.right_name.clone(),
                cells: right_cells,
            },
        ))
    }

    pub fn left_only_row(&self, key: &str) -> Result<ReportRow> {
        let record = materialize(self.left, key)?;
        Ok(self.project(&self.left_name, &record))
    }

    pub fn right_only_row(&self, key: &str) -> Result<ReportRow> {
        let record = materialize(self.right, key)?;
        Ok(self.project(&self.right_name, &record))
    }

    fn project(&self, source: &str, record: &RowRecord) -> ReportRow {
        ReportRow {
            source: source.to_string(),
            cells: self
                .columns
                .names()
                .map(|name| Cell::plain(record.value(name)))
                .collect(),
        }
    }

    /// Emit every partition into `sink`: all matching pairs, then left-only
    /// rows, then right-only rows. Stops at the first error.
    pub fn run<S, O>(
        &self,
        sink: &mut S,
        observer: &mut O,
        progress_interval: u64,
    ) -> Result<PartitionCounts>
    where
        S: ReportSink + ?Sized,
        O: RunObserver + ?Sized,
    {
        let partitions = self.partitions();
        let mut counts = PartitionCounts::default();

        let stage_start = Instant::now();
        for key in &partitions.matching {
            let (left_row, right_row) = self.matched_pair(key)?;
            sink.append_row(Partition::Matching, &left_row)?;
            sink.append_row(Partition::Matching, &right_row)?;
            counts.matching += 1;
            if is_progress_tick(counts.matching, progress_interval) {
                observer.on_progress(Stage::Matching, counts.matching);
            }
        }
        finish_stage(
            observer,
            Stage::Matching,
            counts.matching,
            progress_interval,
            stage_start,
        );

        let stage_start = Instant::now();
        for key in &partitions.left_only {
            let row = self.left_only_row(key)?;
            sink.append_row(Partition::OnlyInLeft, &row)?;
            counts.only_in_file1 += 1;
            if is_progress_tick(counts.only_in_file1, progress_interval) {
                observer.on_progress(Stage::OnlyInLeft, counts.only_in_file1);
            }
        }
        finish_stage(
            observer,
            Stage::OnlyInLeft,
            counts.only_in_file1,
            progress_interval,
            stage_start,
        );

        let stage_start = Instant::now();
        for key in &partitions.right_only {
            let row = self.right_only_row(key)?;
            sink.append_row(Partition::OnlyInRight, &row)?;
            counts.only_in_file2 += 1;
            if is_progress_tick(counts.only_in_file2, progress_interval) {
                observer.on_progress(Stage::OnlyInRight, counts.only_in_file2);
            }
        }
        finish_stage(
            observer,
            Stage::OnlyInRight,
            counts.only_in_file2,
            progress_interval,
            stage_start,
        );

        Ok(counts)
    }
}

/// Report the final count (unless the last tick already did) and the timing.
fn finish_stage<O: RunObserver + ?Sized>(
    observer: &mut O,
    stage: Stage,
    count: u64,
    progress_interval: u64,
    stage_start: Instant,
) {
    if !is_progress_tick(count, progress_interval) || count == 0 {
        observer.on_progress(stage, count);
    }
    observer.on_timing(stage, stage_start.elapsed());
}

fn materialize(file: &IndexedFile, key: &str) -> Result<RowRecord> {
    let offset = file.index().get(key).ok_or_else(|| {
        CompareError::Unexpected(format!(
            "key '{key}' is not indexed for {}",
            file.path().display()
        ))
    })?;
    fetch_row(file.path(), offset, file.header())
}
