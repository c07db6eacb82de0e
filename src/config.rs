//! Run configuration

/// Key column used when none is given.
pub const DEFAULT_KEY_COLUMN: &str = "keycol";

/// xlsx row limit per sheet (header row included).
pub const EXCEL_MAX_ROWS: u32 = 1_048_576;

/// Emit a progress event every this many processed keys.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareConfig {
    /// Column joined on in both files.
    pub key_column: String,
    /// Maximum rows per report page, header row included.
    pub page_capacity: u32,
    pub progress_interval: u64,
}

impl CompareConfig {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            ..Self::default()
        }
    }

    pub fn with_page_capacity(mut self, page_capacity: u32) -> Self {
        self.page_capacity = page_capacity;
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: u64) -> Self {
        self.progress_interval = progress_interval;
        self
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            page_capacity: EXCEL_MAX_ROWS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}
