//! Column headers and the unified column ordering used for output rows

use rustc_hash::FxHashSet;

use super::line::{split_fields, strip_bom};

/// Ordered column names read from a file's first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    /// Parse an already line-ending-trimmed header line. An empty line yields
    /// a single empty column name.
    pub fn parse(line: &str) -> Self {
        let columns = split_fields(strip_bom(line)).map(str::to_string).collect();
        Self { columns }
    }

    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of the first column named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn occurrences(&self, name: &str) -> usize {
        self.columns.iter().filter(|c| *c == name).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedColumn {
    pub name: String,
    pub in_left: bool,
    pub in_right: bool,
}

impl UnifiedColumn {
    /// Only columns present in both headers take part in difference flagging.
    pub fn is_compared(&self) -> bool {
        self.in_left && self.in_right
    }
}

/// Key column first, then the left header's other columns in order, then the
/// columns only the right header has. No duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedColumns {
    columns: Vec<UnifiedColumn>,
}

impl UnifiedColumns {
    pub fn new(key_column: &str, left: &Header, right: &Header) -> Self {
        let left_set: FxHashSet<&str> = left.columns().iter().map(String::as_str).collect();
        let right_set: FxHashSet<&str> = right.columns().iter().map(String::as_str).collect();

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut columns = Vec::with_capacity(left.len() + right.len());

        let ordered = std::iter::once(key_column)
            .chain(left.columns().iter().map(String::as_str))
            .chain(right.columns().iter().map(String::as_str));

        for name in ordered {
            if !seen.insert(name) {
                continue;
            }
            columns.push(UnifiedColumn {
                name: name.to_string(),
                in_left: left_set.contains(name),
                in_right: right_set.contains(name),
            });
        }

        Self { columns }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedColumn> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
