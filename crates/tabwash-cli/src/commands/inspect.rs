//! Inspect command - show inferred types, a preview and source metadata.

use colored::Colorize;
use std::path::PathBuf;

use super::LoadOptions;

pub fn run(
    file: PathBuf,
    rows: usize,
    json: bool,
    options: &LoadOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let container = super::load(&file, options)?;
    let dataset = container.get_dataframe();
    let (row_count, column_count) = dataset.shape();

    if json {
        let columns: Vec<serde_json::Value> = dataset
            .columns()
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name,
                    "dtype": c.dtype,
                    "missing": c.null_count(),
                    "unique": c.unique_count(),
                })
            })
            .collect();
        let report = serde_json::json!({
            "name": container.name(),
            "rows": row_count,
            "columns": columns,
            "metadata": container.metadata(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Inspecting".cyan().bold(),
        file.display().to_string().white()
    );
    println!();

    if let Some(metadata) = container.metadata() {
        println!("  {} {}", "Format:".dimmed(), metadata.format);
        println!("  {} {} bytes", "Size:".dimmed(), metadata.size_bytes);
        println!("  {} {}", "SHA-256:".dimmed(), metadata.hash);
    }
    println!(
        "  {} {} rows x {} columns",
        "Shape:".dimmed(),
        row_count.to_string().bold(),
        column_count.to_string().bold()
    );
    println!();

    println!("{}", "Columns".bold().underline());
    let name_width = dataset
        .column_names()
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(0);
    for column in dataset.columns() {
        let missing = column.null_count();
        let missing_text = if missing > 0 {
            format!("{} missing", missing).yellow()
        } else {
            "complete".green()
        };
        println!(
            "  {:<width$}  {:<9}  {:>6} unique  {}",
            column.name,
            column.dtype.to_string().cyan(),
            column.unique_count(),
            missing_text,
            width = name_width
        );
    }
    println!();

    println!("{}", "Preview".bold().underline());
    println!("{}", dataset.head(rows));

    Ok(())
}
