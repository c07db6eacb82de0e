//! csv-keydiff CLI tool
//!
//! Compares two CSV files on a key column and writes an xlsx report with three
//! sections: "Matching Rows", "Only in File1", "Only in File2".
//!
//! Usage:
//!   csv-keydiff file1.csv file2.csv
//!   csv-keydiff file1.csv file2.csv -o report.xlsx -k customer_id
//!   csv-keydiff file1.csv file2.csv --json      # print run summary as JSON

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use csv_keydiff::config::{DEFAULT_KEY_COLUMN, DEFAULT_PROGRESS_INTERVAL, EXCEL_MAX_ROWS};
use csv_keydiff::{
    compare_files, CompareConfig, CompareError, ErrorCategory, LogObserver, RunSummary,
};

#[derive(Parser)]
#[command(name = "csv-keydiff")]
#[command(about = "Compare two CSV files on a key column and write an xlsx report")]
struct Cli {
    /// First input file
    file1: PathBuf,
    /// Second input file
    file2: PathBuf,
    /// Report path; a timestamped name is used if it already exists
    #[arg(short, long, default_value = "comparison_output.xlsx")]
    output: PathBuf,
    /// Column to join on
    #[arg(short, long, default_value = DEFAULT_KEY_COLUMN)]
    key_column: String,
    /// Rows per sheet, header included, before a section continues on a new sheet
    #[arg(
        long,
        default_value_t = EXCEL_MAX_ROWS,
        value_parser = clap::value_parser!(u32).range(2..=EXCEL_MAX_ROWS as i64)
    )]
    page_rows: u32,
    /// Log progress every N keys (0 disables periodic progress)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,
    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let category = err
                .downcast_ref::<CompareError>()
                .map(CompareError::category)
                .unwrap_or(ErrorCategory::Unexpected);
            eprintln!("Error [{category}]: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = CompareConfig::new(cli.key_column.as_str())
        .with_page_capacity(cli.page_rows)
        .with_progress_interval(cli.progress_interval);

    if !cli.json {
        println!("\n{}", "═".repeat(60));
        println!("CSV KEY COMPARISON");
        println!("{}", "═".repeat(60));
        println!("  File 1: {}", cli.file1.display());
        println!("  File 2: {}", cli.file2.display());
        println!("  Key column: {}", config.key_column);
        println!("  Output: {}", cli.output.display());
    }

    let summary = compare_files(&cli.file1, &cli.file2, &cli.output, &config, &mut LogObserver)
        .with_context(|| {
            format!(
                "comparing {} with {} on '{}'",
                cli.file1.display(),
                cli.file2.display(),
                config.key_column
            )
        })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("{}", "─".repeat(60));
    println!("  ✅ Comparison complete!");
    println!("  Matching keys: {}", summary.counts.matching);
    println!("  Only in file 1: {}", summary.counts.only_in_file1);
    println!("  Only in file 2: {}", summary.counts.only_in_file2);
    for input in [&summary.file1, &summary.file2] {
        if input.duplicate_keys > 0 {
            println!(
                "  ⚠️  {}: {} duplicate key line(s), last occurrence kept",
                input.path, input.duplicate_keys
            );
        }
        if input.skipped_lines > 0 {
            println!(
                "  ⚠️  {}: {} line(s) too short to hold the key column were skipped",
                input.path, input.skipped_lines
            );
        }
    }
    println!(
        "  Sheets: {} matching, {} only-in-file1, {} only-in-file2",
        summary.pages.matching, summary.pages.only_in_file1, summary.pages.only_in_file2
    );
    println!("  Output: {}", summary.output.display());
    println!("  Time: {:.2}s", summary.elapsed_ms as f64 / 1000.0);
}
