//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tabwash::{ExportFormat, MissingStrategy, NormalizeStrategy, ScaleRange};

/// Tabwash: schema-free cleaning for tabular datasets
#[derive(Parser)]
#[command(name = "tabwash")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Container configuration file (JSON)
    #[arg(long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for type sampling and randomized detectors
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show inferred column types, a preview and source metadata
    Inspect {
        /// Path to the data file (CSV/TSV/ARFF)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of preview rows
        #[arg(short = 'n', long, default_value = "5")]
        rows: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clean a data file and export the result
    Clean {
        /// Path to the data file (CSV/TSV/ARFF)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: <file>_clean.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (csv, arff)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Row labels to drop, comma separated
        #[arg(long, value_delimiter = ',')]
        remove: Vec<usize>,

        /// Missing value strategy (remove, mean, median, mode, zero)
        #[arg(long)]
        missing: Option<MissingStrategy>,

        /// Extra values to treat as missing, comma separated
        #[arg(long = "na", value_delimiter = ',')]
        na_values: Vec<String>,

        /// Override a column type, e.g. --dtype age=float (repeatable)
        #[arg(long = "dtype", value_name = "COLUMN=TYPE")]
        dtypes: Vec<String>,

        /// Columns to rescale, comma separated
        #[arg(long, value_delimiter = ',')]
        scale: Vec<String>,

        /// Scaling strategy (minmax, zscore, maxabs, robust)
        #[arg(long, default_value = "minmax")]
        strategy: NormalizeStrategy,

        /// Target range for min-max scaling
        #[arg(long, default_value = "0,1")]
        range: ScaleRange,

        /// Dataset name written to ARFF output
        #[arg(long)]
        name: Option<String>,
    },

    /// Rank rows by outlier score
    Outliers {
        /// Path to the data file (CSV/TSV/ARFF)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Algorithm indices, comma separated (see `tabwash algorithms`)
        #[arg(short, long, value_delimiter = ',', default_values_t = vec![0, 6, 7])]
        algorithms: Vec<usize>,

        /// Expected outlier fraction (default: estimated from the data)
        #[arg(short, long)]
        contamination: Option<f64>,

        /// Number of ranked rows to show
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the data quality band
    Score {
        /// Path to the data file (CSV/TSV/ARFF)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the outlier detection algorithms and their indices
    Algorithms,
}
