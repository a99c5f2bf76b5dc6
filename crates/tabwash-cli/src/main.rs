//! Tabwash CLI - schema-free cleaning for tabular datasets.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::LoadOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(stderr_layer).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = LoadOptions {
        config: cli.config,
        seed: cli.seed,
    };

    let result = match cli.command {
        Commands::Inspect { file, rows, json } => commands::inspect::run(file, rows, json, &options),

        Commands::Clean {
            file,
            output,
            format,
            remove,
            missing,
            na_values,
            dtypes,
            scale,
            strategy,
            range,
            name,
        } => commands::clean::run(
            file,
            commands::clean::CleanSteps {
                remove,
                missing,
                na_values,
                dtypes,
                scale,
                strategy,
                range,
            },
            output,
            format,
            name,
            &options,
        ),

        Commands::Outliers {
            file,
            algorithms,
            contamination,
            top,
            json,
        } => commands::outliers::run(file, algorithms, contamination, top, json, &options),

        Commands::Score { file, json } => commands::score::run(file, json, &options),

        Commands::Algorithms => commands::outliers::list(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
