//! End-to-end comparison runs over small CSV fixtures

use std::path::{Path, PathBuf};
use std::time::Duration;

use csv_keydiff::join::{Partition, Reconciler};
use csv_keydiff::report::{MemoryReport, ReportRow};
use csv_keydiff::{compare_files, index_inputs, CompareConfig, ErrorCategory, NoopObserver};
use csv_keydiff::{RunObserver, Stage};

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn values(row: &ReportRow) -> Vec<&str> {
    row.values().collect()
}

/// Run the join into an in-memory report.
fn compare_in_memory(file1: &Path, file2: &Path, page_capacity: u32) -> MemoryReport {
    let (left, right) = index_inputs(file1, file2, "keycol", &mut NoopObserver).unwrap();
    let reconciler = Reconciler::new(&left, &right, "keycol");
    let mut report = MemoryReport::new(reconciler.report_header(), page_capacity);
    reconciler.run(&mut report, &mut NoopObserver, 1_000).unwrap();
    report
}

#[derive(Default)]
struct RecordingObserver {
    progress: Vec<(Stage, u64)>,
    timings: Vec<Stage>,
}

impl RunObserver for RecordingObserver {
    fn on_progress(&mut self, stage: Stage, count: u64) {
        self.progress.push((stage, count));
    }

    fn on_timing(&mut self, stage: Stage, _elapsed: Duration) {
        self.timings.push(stage);
    }
}

#[test]
fn test_disjoint_columns_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = write_csv(dir.path(), "file1.csv", "keycol,a\n1,x\n2,y");
    let f2 = write_csv(dir.path(), "file2.csv", "keycol,b\n2,z\n3,w");

    let report = compare_in_memory(&f1, &f2, 1_000);
    assert_eq!(report.header(), &["SourceFile", "keycol", "a", "b"]);

    let matching: Vec<&ReportRow> = report.rows(Partition::Matching).collect();
    assert_eq!(matching.len(), 2);
    assert_eq!(matching[0].source, "file1.csv");
    assert_eq!(values(matching[0]), vec!["2", "y", ""]);
    assert_eq!(matching[1].source, "file2.csv");
    assert_eq!(values(matching[1]), vec!["2", "", "z"]);
    assert!(matching.iter().all(|r| r.differing_columns().count() == 0));

    let only1: Vec<&ReportRow> = report.rows(Partition::OnlyInLeft).collect();
    assert_eq!(only1.len(), 1);
    assert_eq!(values(only1[0]), vec!["1", "x", ""]);

    let only2: Vec<&ReportRow> = report.rows(Partition::OnlyInRight).collect();
    assert_eq!(only2.len(), 1);
    assert_eq!(values(only2[0]), vec!["3", "", "w"]);
}

#[test]
fn test_missing_key_column_stops_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = write_csv(dir.path(), "file1.csv", "keycol,a\n1,x\n");
    let f2 = write_csv(dir.path(), "file2.csv", "id,a\n1,x\n");
    let out = dir.path().join("report.xlsx");

    let mut observer = RecordingObserver::default();
    let err = compare_files(&f1, &f2, &out, &CompareConfig::default(), &mut observer).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::MissingKeyColumn);
    assert!(err.to_string().contains("file2.csv"));
    assert!(!out.exists());
    // Only file1's indexing step reported anything.
    assert_eq!(observer.progress, vec![(Stage::Indexing, 1)]);
    assert!(observer.timings.is_empty());
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = write_csv(dir.path(), "file1.csv", "keycol,a\n1,x\n");
    let out = dir.path().join("report.xlsx");

    let err = compare_files(
        &f1,
        &dir.path().join("absent.csv"),
        &out,
        &CompareConfig::default(),
        &mut NoopObserver,
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::FileNotFound);
    assert!(!out.exists());
}

#[test]
fn test_short_lines_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = write_csv(dir.path(), "file1.csv", "a,b,keycol\n1,2,k1\n1,2\n");
    let f2 = write_csv(dir.path(), "file2.csv", "keycol\nk1\n");

    let report = compare_in_memory(&f1, &f2, 1_000);
    assert_eq!(report.rows(Partition::Matching).count(), 2);
    assert_eq!(report.rows(Partition::OnlyInLeft).count(), 0);
    assert_eq!(report.rows(Partition::OnlyInRight).count(), 0);
}

#[test]
fn test_duplicate_keys_compare_last_occurrence() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = write_csv(dir.path(), "file1.csv", "keycol,v\n1,old\n1,new\n");
    let f2 = write_csv(dir.path(), "file2.csv", "keycol,v\n1,new\n");

    let report = compare_in_memory(&f1, &f2, 1_000);
    let matching: Vec<&ReportRow> = report.rows(Partition::Matching).collect();
    assert_eq!(values(matching[0]), vec!["1", "new"]);
    assert_eq!(matching[0].differing_columns().count(), 0);
}

#[test]
fn test_matching_section_spans_pages() {
    let dir = tempfile::tempdir().unwrap();
    let rows: String = (0..5).map(|i| format!("{i},v{i}\n")).collect();
    let f1 = write_csv(dir.path(), "file1.csv", &format!("keycol,v\n{rows}"));
    let f2 = write_csv(dir.path(), "file2.csv", &format!("keycol,v\n{rows}"));

    // Header + 4 data rows per page: 10 matching rows -> 3 pages.
    let report = compare_in_memory(&f1, &f2, 5);
    let pages = report.pages(Partition::Matching);
    let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Matching Rows", "Matching Rows_2", "Matching Rows_3"]);
    assert_eq!(pages.iter().map(|p| p.rows.len()).sum::<usize>(), 10);
    assert!(pages.iter().all(|p| p.header[0] == "SourceFile"));
}

#[test]
fn test_comparison_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = write_csv(
        dir.path(),
        "file1.csv",
        "keycol,a,b\n10,x,1\n11,y,2\n12,z,3\n13,q,4\n",
    );
    let f2 = write_csv(
        dir.path(),
        "file2.csv",
        "keycol,b,a,c\n12,3,z,new\n11,20,y,new\n14,5,r,new\n",
    );

    let first = compare_in_memory(&f1, &f2, 1_000);
    let second = compare_in_memory(&f1, &f2, 1_000);
    for partition in Partition::ALL {
        assert_eq!(first.pages(partition), second.pages(partition));
    }
}

#[test]
fn test_compare_files_writes_report_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = write_csv(dir.path(), "file1.csv", "keycol,a\n1,x\n2,y\n");
    let f2 = write_csv(dir.path(), "file2.csv", "keycol,a\n2,CHANGED\n3,w\n");
    let out = dir.path().join("comparison_output.xlsx");

    let mut observer = RecordingObserver::default();
    let summary = compare_files(&f1, &f2, &out, &CompareConfig::default(), &mut observer).unwrap();

    assert_eq!(summary.output, out);
    assert!(out.exists());
    assert_eq!(summary.counts.matching, 1);
    assert_eq!(summary.counts.only_in_file1, 1);
    assert_eq!(summary.counts.only_in_file2, 1);
    assert_eq!(summary.pages.matching, 1);
    assert_eq!(summary.file1.keys, 2);
    assert_eq!(summary.key_column, "keycol");
    assert_eq!(
        observer.timings,
        vec![
            Stage::Indexing,
            Stage::Matching,
            Stage::OnlyInLeft,
            Stage::OnlyInRight,
            Stage::Saving,
            Stage::Total,
        ]
    );

    // A second run must not clobber the first report.
    let again =
        compare_files(&f1, &f2, &out, &CompareConfig::default(), &mut NoopObserver).unwrap();
    assert_ne!(again.output, out);
    assert!(again.output.exists());
    assert_eq!(again.counts, summary.counts);

    let json = serde_json::to_value(&again).unwrap();
    assert_eq!(json["counts"]["matching"], 1);
}
