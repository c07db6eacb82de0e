//! xlsx report sink
//!
//! Each page is one worksheet in constant memory mode: a row is flushed to a
//! scratch file as soon as the next row starts, so memory stays flat no matter
//! how large the report grows. Rows within a sheet must therefore arrive in
//! order, which the page layout guarantees.
//!
//! Sheets appear in the workbook in the order they are opened. A section's
//! first sheet is opened when that section receives its first row, after the
//! first sheets of every earlier section; sections left empty get their
//! header-only sheet at [`XlsxReport::save`].
//!
//! `save` writes the workbook to a scratch file next to the destination and
//! renames it into place, so a failed run never leaves a truncated report.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook};
use tracing::debug;

use super::pager::{page_name, PageLayout};
use super::{ReportRow, ReportSink};
use crate::config::EXCEL_MAX_ROWS;
use crate::error::{CompareError, Result};
use crate::join::Partition;

/// Fill for cells whose value differs between the two files.
const DIFF_FILL: Color = Color::RGB(0xFFFF00);

pub struct XlsxReport {
    workbook: Workbook,
    header: Vec<String>,
    layout: PageLayout,
    /// Workbook index of the sheet each section is filling.
    current: [Option<usize>; Partition::COUNT],
    sheet_count: usize,
    header_format: Format,
    diff_format: Format,
}

impl XlsxReport {
    /// `page_capacity` is clamped to the xlsx sheet limit.
    pub fn new(header: Vec<String>, page_capacity: u32) -> Self {
        Self {
            workbook: Workbook::new(),
            header,
            layout: PageLayout::new(page_capacity.min(EXCEL_MAX_ROWS)),
            current: [None; Partition::COUNT],
            sheet_count: 0,
            header_format: Format::new().set_bold(),
            diff_format: Format::new().set_background_color(DIFF_FILL),
        }
    }

    pub fn page_capacity(&self) -> u32 {
        self.layout.capacity()
    }

    pub fn pages(&self, section: Partition) -> usize {
        self.layout.pages(section)
    }

    fn open_sheet(&mut self, section: Partition, page: usize) -> Result<usize> {
        let name = page_name(section, page);
        let sheet = self.workbook.add_worksheet_with_constant_memory();
        sheet.set_name(&name)?;
        for (col, title) in self.header.iter().enumerate() {
            sheet.write_string_with_format(0, column_number(col)?, title, &self.header_format)?;
        }

        let index = self.sheet_count;
        self.sheet_count += 1;
        self.current[section.index()] = Some(index);
        debug!(sheet = %name, index, "opened sheet");
        Ok(index)
    }

    /// Open the first sheet of `section` and of every section before it.
    fn open_sections_through(&mut self, section: Partition) -> Result<()> {
        for earlier in Partition::ALL.into_iter().take(section.index() + 1) {
            if self.current[earlier.index()].is_none() {
                self.open_sheet(earlier, 0)?;
            }
        }
        Ok(())
    }

    /// Write the workbook to `path`, replacing it atomically.
    pub fn save(mut self, path: &Path) -> Result<()> {
        self.open_sections_through(Partition::OnlyInRight)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staging = tempfile::Builder::new()
            .prefix(".csv-keydiff-")
            .suffix(".xlsx.tmp")
            .tempfile_in(dir)
            .map_err(|e| CompareError::io(dir, e))?;

        self.workbook.save_to_writer(staging.as_file_mut())?;
        staging
            .as_file()
            .sync_all()
            .map_err(|e| CompareError::io(staging.path(), e))?;

        staging
            .persist(path)
            .map_err(|e| CompareError::io(path, e.error))?;
        Ok(())
    }
}

impl ReportSink for XlsxReport {
    fn append_row(&mut self, section: Partition, row: &ReportRow) -> Result<()> {
        let slot = self.layout.place(section);
        self.open_sections_through(section)?;
        let index = match self.current[section.index()] {
            Some(index) if !slot.opens_page => index,
            _ => self.open_sheet(section, slot.page)?,
        };

        let sheet = self.workbook.worksheet_from_index(index)?;
        sheet.write_string(slot.row, 0, &row.source)?;
        for (i, cell) in row.cells.iter().enumerate() {
            let col = column_number(i + 1)?;
            if cell.differs {
                sheet.write_string_with_format(slot.row, col, &cell.value, &self.diff_format)?;
            } else {
                sheet.write_string(slot.row, col, &cell.value)?;
            }
        }
        Ok(())
    }
}

fn column_number(col: usize) -> Result<u16> {
    u16::try_from(col)
        .map_err(|_| CompareError::Unexpected(format!("column {col} exceeds the sheet width")))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::error::ErrorCategory;
    use crate::report::{header_row, Cell};

    /// Read one part of a saved workbook as text.
    fn read_part(path: &Path, part: &str) -> String {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut contents = String::new();
        archive
            .by_name(part)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        contents
    }

    fn sheet_names(workbook_xml: &str) -> Vec<&str> {
        workbook_xml
            .split("<sheet ")
            .skip(1)
            .filter_map(|tag| tag.split("name=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .collect()
    }

    fn row(source: &str, key: &str, value: &str, differs: bool) -> ReportRow {
        ReportRow {
            source: source.to_string(),
            cells: vec![Cell::plain(key), Cell::new(value, differs)],
        }
    }

    #[test]
    fn test_save_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.xlsx");

        let mut report = XlsxReport::new(header_row(["keycol", "a"]), 2);
        for key in ["1", "2", "3"] {
            report
                .append_row(Partition::Matching, &row("file1.csv", key, "x", true))
                .unwrap();
        }
        assert_eq!(report.pages(Partition::Matching), 3);
        assert_eq!(report.pages(Partition::OnlyInRight), 1);

        report.save(&out).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_saved_sheets_are_ordered_and_styled() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.xlsx");

        let mut report = XlsxReport::new(header_row(["keycol", "a"]), 3);
        report
            .append_row(Partition::Matching, &row("file1.csv", "1", "x", true))
            .unwrap();
        report
            .append_row(Partition::Matching, &row("file2.csv", "1", "y", true))
            .unwrap();
        report
            .append_row(Partition::Matching, &row("file1.csv", "2", "same", false))
            .unwrap();
        // OnlyInLeft stays empty and still gets its header-only sheet.
        report
            .append_row(Partition::OnlyInRight, &row("file2.csv", "9", "w", false))
            .unwrap();
        report.save(&out).unwrap();

        assert_eq!(
            sheet_names(&read_part(&out, "xl/workbook.xml")),
            vec!["Matching Rows", "Matching Rows_2", "Only in File1", "Only in File2"]
        );

        // First page: differing cells carry a style, plain cells do not.
        let first = read_part(&out, "xl/worksheets/sheet1.xml");
        assert!(first.contains(r#"<c r="A1" s=""#));
        assert!(first.contains("<t>SourceFile</t>"));
        assert!(first.contains(r#"<c r="B2" t="inlineStr"><is><t>1</t></is></c>"#));
        assert!(first.contains(r#"<c r="C2" s=""#));
        assert!(first.contains("<t>y</t>"));

        // Second page repeats the header before its single data row.
        let second = read_part(&out, "xl/worksheets/sheet2.xml");
        assert!(second.contains(r#"<c r="A1" s=""#));
        assert!(second.contains("<t>SourceFile</t>"));
        assert!(second.contains("<t>keycol</t>"));
        assert!(second.contains(r#"<c r="C2" t="inlineStr"><is><t>same</t></is></c>"#));
        assert!(!second.contains(r#"r="A3""#));

        let empty_section = read_part(&out, "xl/worksheets/sheet3.xml");
        assert!(empty_section.contains("<t>keycol</t>"));
        assert!(!empty_section.contains(r#"r="A2""#));

        let styles = read_part(&out, "xl/styles.xml");
        assert!(styles.contains("<b/>"));
        assert!(styles.contains("FFFFFF00"));
    }

    #[test]
    fn test_page_capacity_is_capped_at_sheet_limit() {
        let report = XlsxReport::new(header_row(["keycol"]), 2_000_000);
        assert_eq!(report.page_capacity(), EXCEL_MAX_ROWS);

        let report = XlsxReport::new(header_row(["keycol"]), 1);
        assert_eq!(report.page_capacity(), 2);
    }

    #[test]
    fn test_unwritable_destination_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing_dir").join("report.xlsx");

        let report = XlsxReport::new(header_row(["keycol"]), 10);
        let err = report.save(&out).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::FileNotFound);
        assert!(!out.exists());
    }
}
