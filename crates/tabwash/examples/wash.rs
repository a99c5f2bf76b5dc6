//! Example: Load, clean and rank a tabular data file with Tabwash.
//!
//! Usage:
//!   cargo run --example wash -- <file_path>
//!
//! Example:
//!   cargo run --example wash -- measurements.csv

use std::env;
use std::path::Path;

use tabwash::{DataContainer, MissingStrategy};

fn main() -> tabwash::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example wash -- <file_path>");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example wash -- measurements.csv");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Tabwash: {}", file_path);
    println!("{}", separator);
    println!();

    let mut container = DataContainer::from_path(path)?;

    if let Some(metadata) = container.metadata() {
        println!("## Source Metadata");
        println!("  File: {}", metadata.file);
        println!("  Format: {}", metadata.format);
        println!("  SHA-256: {}", metadata.hash);
        println!();
    }

    let dataset = container.get_dataframe();
    println!("## Columns ({})", dataset.column_count());
    println!();
    for column in dataset.columns() {
        println!(
            "  {:20} {:10} unique={:<5} missing={}",
            column.name,
            column.dtype.to_string(),
            column.unique_count(),
            column.null_count()
        );
    }
    println!();

    println!("## Preview");
    println!("{}", container.preview());
    println!();

    let score = container.analyze();
    println!("## Quality");
    println!("  Completeness: {:.1}%", score.completeness * 100.0);
    println!("  Typed columns: {:.1}%", score.typed_ratio * 100.0);
    println!("  Band: {}", score.band);
    println!();

    if container.get_dataframe().has_missing() {
        container.missing(MissingStrategy::Median, &[])?;
        println!("Filled missing values with column medians");
        println!();
    }

    match container.contamination() {
        Ok(contamination) => {
            let report = container.outlier(&[0, 6, 7], contamination)?;
            println!(
                "## Outliers ({} of {} rows, contamination {:.3})",
                report.outlier_count(),
                container.get_dataframe().row_count(),
                report.contamination
            );
            println!("  Labels: {:?}", report.outliers);
        }
        Err(e) => println!("## Outliers\n  skipped: {}", e),
    }
    println!();

    println!("{}", separator);

    Ok(())
}
