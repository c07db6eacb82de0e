//! Page rotation bookkeeping shared by the report sinks
//!
//! Every section starts with one page holding only the header row. When the
//! current page reaches the capacity, the next row opens a new page, which
//! again starts with the header. Pages after the first are named
//! `<section>_<n>`, counting from 2.

use crate::join::Partition;

/// Smallest usable capacity: the header plus one data row.
pub const MIN_PAGE_CAPACITY: u32 = 2;

/// Where a data row lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot {
    /// Zero-based page within the section.
    pub page: usize,
    /// Zero-based row within the page; row 0 is the header.
    pub row: u32,
    /// The row is the first data row of a freshly opened page.
    pub opens_page: bool,
}

#[derive(Debug, Clone, Copy)]
struct SectionPages {
    pages: usize,
    rows_on_page: u32,
}

impl Default for SectionPages {
    fn default() -> Self {
        Self {
            pages: 1,
            rows_on_page: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageLayout {
    capacity: u32,
    sections: [SectionPages; Partition::COUNT],
}

impl PageLayout {
    /// `capacity` counts the header row; values below [`MIN_PAGE_CAPACITY`]
    /// are raised to it.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity: capacity.max(MIN_PAGE_CAPACITY),
            sections: [SectionPages::default(); Partition::COUNT],
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Reserve the next row of `section`.
    pub fn place(&mut self, section: Partition) -> RowSlot {
        let capacity = self.capacity;
        let pages = &mut self.sections[section.index()];
        let mut opens_page = false;
        if pages.rows_on_page >= capacity {
            pages.pages += 1;
            pages.rows_on_page = 1;
            opens_page = true;
        }
        let row = pages.rows_on_page;
        pages.rows_on_page += 1;
        RowSlot {
            page: pages.pages - 1,
            row,
            opens_page,
        }
    }

    pub fn pages(&self, section: Partition) -> usize {
        self.sections[section.index()].pages
    }
}

pub fn page_name(section: Partition, page: usize) -> String {
    if page == 0 {
        section.title().to_string()
    } else {
        format!("{}_{}", section.title(), page + 1)
    }
}
