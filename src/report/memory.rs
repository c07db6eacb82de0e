//! In-memory report sink

use super::pager::{page_name, PageLayout};
use super::{ReportRow, ReportSink};
use crate::error::Result;
use crate::join::Partition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPage {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<ReportRow>,
}

/// Collects pages exactly as the xlsx sink would lay them out.
#[derive(Debug, Clone)]
pub struct MemoryReport {
    header: Vec<String>,
    layout: PageLayout,
    pages: [Vec<MemoryPage>; Partition::COUNT],
}

impl MemoryReport {
    pub fn new(header: Vec<String>, page_capacity: u32) -> Self {
        let pages = Partition::ALL.map(|section| {
            vec![MemoryPage {
                name: page_name(section, 0),
                header: header.clone(),
                rows: Vec::new(),
            }]
        });
        Self {
            header,
            layout: PageLayout::new(page_capacity),
            pages,
        }
    }

    pub fn pages(&self, section: Partition) -> &[MemoryPage] {
        &self.pages[section.index()]
    }

    /// Every data row of `section` across its pages, in append order.
    pub fn rows(&self, section: Partition) -> impl Iterator<Item = &ReportRow> {
        self.pages[section.index()].iter().flat_map(|p| p.rows.iter())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }
}

impl ReportSink for MemoryReport {
    fn append_row(&mut self, section: Partition, row: &ReportRow) -> Result<()> {
        let slot = self.layout.place(section);
        let pages = &mut self.pages[section.index()];
        if slot.opens_page {
            pages.push(MemoryPage {
                name: page_name(section, slot.page),
                header: self.header.clone(),
                rows: Vec::new(),
            });
        }
        pages[slot.page].rows.push(row.clone());
        Ok(())
    }
}
