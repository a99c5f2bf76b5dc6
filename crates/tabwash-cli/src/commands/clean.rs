//! Clean command - run cleaning steps and export the result.

use colored::Colorize;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tabwash::{ExportFormat, MissingStrategy, NormalizeStrategy, ScaleRange, SemanticType};

use super::LoadOptions;

/// Cleaning steps, applied in field order.
pub struct CleanSteps {
    pub remove: Vec<usize>,
    pub missing: Option<MissingStrategy>,
    pub na_values: Vec<String>,
    pub dtypes: Vec<String>,
    pub scale: Vec<String>,
    pub strategy: NormalizeStrategy,
    pub range: ScaleRange,
}

pub fn run(
    file: PathBuf,
    steps: CleanSteps,
    output: Option<PathBuf>,
    format: ExportFormat,
    name: Option<String>,
    options: &LoadOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let requested = parse_dtypes(&steps.dtypes)?;
    let mut container = super::load(&file, options)?;
    if let Some(name) = name {
        container.set_name(name);
    }

    println!(
        "{} {}",
        "Cleaning".cyan().bold(),
        container.to_string().white()
    );

    if !steps.remove.is_empty() {
        let labels: BTreeSet<usize> = steps.remove.iter().copied().collect();
        let removed = container.remove(&labels)?;
        println!("  {} removed {} rows", "✓".green(), removed);
    }

    if let Some(strategy) = steps.missing {
        let before = container.get_dataframe().missing_count();
        container.missing(strategy, &steps.na_values)?;
        println!(
            "  {} missing values ({}): {} -> {}",
            "✓".green(),
            strategy,
            before,
            container.get_dataframe().missing_count()
        );
    }

    if !requested.is_empty() {
        container.update_dtypes(&requested)?;
        for (column, dtype) in &requested {
            println!("  {} {} as {}", "✓".green(), column, dtype);
        }
    }

    if !steps.scale.is_empty() {
        container.scale(&steps.scale, steps.strategy, steps.range)?;
        println!(
            "  {} scaled {} ({})",
            "✓".green(),
            steps.scale.join(", "),
            steps.strategy
        );
    }

    let output = output.unwrap_or_else(|| default_output(&file, format));
    let contents = container.export(format)?;
    std::fs::write(&output, contents)?;

    let (rows, columns) = container.get_dataframe().shape();
    println!();
    println!(
        "{} {} ({} rows x {} columns)",
        "Saved".green().bold(),
        output.display(),
        rows,
        columns
    );

    Ok(())
}

/// Parse `column=type` pairs.
fn parse_dtypes(pairs: &[String]) -> Result<IndexMap<String, SemanticType>, Box<dyn std::error::Error>> {
    let mut requested = IndexMap::new();
    for pair in pairs {
        let (column, dtype) = pair
            .split_once('=')
            .ok_or_else(|| format!("Invalid --dtype '{}', expected COLUMN=TYPE", pair))?;
        requested.insert(column.trim().to_string(), dtype.parse::<SemanticType>()?);
    }
    Ok(requested)
}

fn default_output(input: &Path, format: ExportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "data".to_string());
    input.with_file_name(format!("{}_clean.{}", stem, format.extension()))
}
