//! CLI command implementations.

pub mod clean;
pub mod inspect;
pub mod outliers;
pub mod score;

use std::path::{Path, PathBuf};

use tabwash::{ContainerConfig, DataContainer};
use tracing::debug;

/// Options shared by every command that loads a file.
pub struct LoadOptions {
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Load and type a data file.
pub fn load(file: &Path, options: &LoadOptions) -> Result<DataContainer, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = match &options.config {
        Some(path) => ContainerConfig::load(path)?,
        None => ContainerConfig::default(),
    };
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    debug!(path = %file.display(), seed = ?config.seed, "loading data file");
    Ok(DataContainer::builder().path(file).config(config).build()?)
}
