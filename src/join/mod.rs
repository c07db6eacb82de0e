//! Offset-indexed key join of two delimited files
//!
//! Transforms "compare two files too big for memory" into two sequential scans
//! plus one seek per reported row.
//!
//! ## Strategy
//!
//! 1. **Index**: scan each file once, recording key -> byte offset of its line
//! 2. **Partition**: intersect / subtract the two key sets
//! 3. **Materialize**: for each key in a partition, seek to its offset(s) and
//!    parse that one line
//! 4. **Emit**: project onto the unified columns, flag differing cells, hand the
//!    rows to a report sink
//!
//! ## Memory Usage
//!
//! Both key sets are held at once, so memory is O(distinct keys across both
//! files). Rows are read one at a time and dropped after emission; the xlsx
//! sink flushes each row to disk once the next one starts.
//!
//! ## Limitations
//!
//! Fields are split on every comma. Quoted values containing the delimiter are
//! NOT supported and will misalign both the key and the other columns.

pub mod header;
pub mod indexer;
pub mod line;
pub mod materialize;
pub mod reconcile;

use std::fmt;

pub use header::{Header, UnifiedColumn, UnifiedColumns};
pub use indexer::{build_index, IndexedFile, KeyIndex};
pub use materialize::{fetch_row, RowRecord};
pub use reconcile::{KeyPartitions, PartitionCounts, Reconciler};

/// Classification of a key relative to the two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Matching,
    OnlyInLeft,
    OnlyInRight,
}

impl Partition {
    pub const COUNT: usize = 3;
    pub const ALL: [Partition; Partition::COUNT] =
        [Partition::Matching, Partition::OnlyInLeft, Partition::OnlyInRight];

    pub fn index(&self) -> usize {
        match self {
            Partition::Matching => 0,
            Partition::OnlyInLeft => 1,
            Partition::OnlyInRight => 2,
        }
    }

    /// Report section title.
    pub fn title(&self) -> &'static str {
        match self {
            Partition::Matching => "Matching Rows",
            Partition::OnlyInLeft => "Only in File1",
            Partition::OnlyInRight => "Only in File2",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
