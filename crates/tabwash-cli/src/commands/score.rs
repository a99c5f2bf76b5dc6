//! Score command - rate completeness and typing of a data file.

use colored::Colorize;
use std::path::PathBuf;
use tabwash::Band;

use super::LoadOptions;

pub fn run(file: PathBuf, json: bool, options: &LoadOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut container = super::load(&file, options)?;
    let score = container.analyze().clone();

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    let band = match score.band {
        Band::A => "A".green().bold(),
        Band::B => "B".yellow().bold(),
        Band::C => "C".red().bold(),
    };

    println!("{} {}", "Scoring".cyan().bold(), container.to_string().white());
    println!();
    println!("  {} {:.1}%", "Completeness:".dimmed(), score.completeness * 100.0);
    println!("  {} {:.1}%", "Typed columns:".dimmed(), score.typed_ratio * 100.0);
    println!("  {} {:.3}", "Score:".dimmed(), score.score);
    println!("  {} {}", "Band:".dimmed(), band);

    Ok(())
}
