//! Report sink boundary
//!
//! The comparison core hands classified, column-projected rows to a
//! [`ReportSink`]. A sink owns everything about rendering: page rotation at the
//! row ceiling, the repeated header row, and how differing cells are marked.
//!
//! - [`xlsx::XlsxReport`]: styled workbook, one sheet per page
//! - [`memory::MemoryReport`]: in-memory pages, used by tests and tooling

pub mod memory;
pub mod pager;
pub mod xlsx;

pub use memory::MemoryReport;
pub use pager::{PageLayout, RowSlot};
pub use xlsx::XlsxReport;

use crate::error::Result;
use crate::join::Partition;

/// Name of the first report column.
pub const SOURCE_FILE_COLUMN: &str = "SourceFile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    /// Set when the other file holds a different value for this column.
    pub differs: bool,
}

impl Cell {
    pub fn new(value: impl Into<String>, differs: bool) -> Self {
        Self {
            value: value.into(),
            differs,
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(value, false)
    }
}

/// One output row: the source file name followed by one cell per unified column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub source: String,
    pub cells: Vec<Cell>,
}

impl ReportRow {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.value.as_str())
    }

    pub fn differing_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.differs)
            .map(|(i, _)| i)
    }
}

/// Capability the core writes through. Implementations serialize writes per
/// section and rotate pages on their own.
pub trait ReportSink {
    fn append_row(&mut self, section: Partition, row: &ReportRow) -> Result<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn append_row(&mut self, section: Partition, row: &ReportRow) -> Result<()> {
        (**self).append_row(section, row)
    }
}

/// `[SourceFile, <columns...>]`
pub fn header_row<'a>(columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    std::iter::once(SOURCE_FILE_COLUMN)
        .chain(columns)
        .map(str::to_string)
        .collect()
}
