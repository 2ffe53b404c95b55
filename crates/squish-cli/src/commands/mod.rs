//! CLI command implementations

use anyhow::{Context, Result};
use squish_core::OptimizerConfig;
use squish_core::config::CONFIG_FILE;
use std::path::Path;

pub mod init;
pub mod optimize;
pub mod validate;

/// Load the configuration named on the command line, or `./squish.yaml` if it
/// exists, or the defaults.
pub fn load_config(config_path: Option<&str>) -> Result<OptimizerConfig> {
    match config_path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            OptimizerConfig::load(path).context("Failed to load configuration")
        }
        None if Path::new(CONFIG_FILE).exists() => {
            tracing::info!("Loading configuration from {}", CONFIG_FILE);
            OptimizerConfig::load(CONFIG_FILE).context("Failed to load configuration")
        }
        None => {
            tracing::info!("No {} found, using defaults", CONFIG_FILE);
            Ok(OptimizerConfig::default())
        }
    }
}
