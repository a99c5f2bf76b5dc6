//! Outliers command - rank rows with the detector ensemble.

use colored::Colorize;
use std::path::PathBuf;
use tabwash::OutlierAlgorithm;

use super::LoadOptions;

pub fn run(
    file: PathBuf,
    algorithms: Vec<usize>,
    contamination: Option<f64>,
    top: usize,
    json: bool,
    options: &LoadOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let container = super::load(&file, options)?;

    let contamination = match contamination {
        Some(c) => c,
        None => container.contamination()?,
    };
    let report = container.outlier(&algorithms, contamination)?;

    if json {
        let names: Vec<&str> = report.algorithm_scores.keys().map(|a| a.as_str()).collect();
        let result = serde_json::json!({
            "contamination": report.contamination,
            "algorithms": names,
            "outliers": report.outliers,
            "scores": report.scores,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Ranking".cyan().bold(),
        container.to_string().white()
    );
    println!();
    for algorithm in report.algorithm_scores.keys() {
        println!("  {} {}", "•".dimmed(), algorithm.display_name());
    }
    println!(
        "  {} {:.3}",
        "Contamination:".dimmed(),
        report.contamination
    );
    println!();

    let flagged = report
        .outliers
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{} {} ({})",
        "Outliers:".bold(),
        report.outlier_count().to_string().red().bold(),
        flagged
    );
    println!();
    println!("{}", report.ranked.head(top));

    Ok(())
}

/// Print the algorithm catalogue with the indices `--algorithms` expects.
pub fn list() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "Outlier detection algorithms".bold().underline());
    for (index, algorithm) in OutlierAlgorithm::ALL.iter().enumerate() {
        println!(
            "  {:>2}  {:<8} {}",
            index.to_string().cyan(),
            algorithm.as_str(),
            algorithm.display_name().dimmed()
        );
    }
    Ok(())
}
