//! Configuration parsing and validation
//!
//! `squish.yaml` is parsed into an [`OptimizerConfig`], which mirrors the file.
//! [`OptimizerConfig::resolve`] validates it and produces [`Settings`], the
//! compiled form the runtime consumes. All validation happens there, before
//! any asset is touched.
//!
//! # Example
//!
//! ```yaml
//! test:
//!   - "**/*.png"
//!   - regex: '\.gif$'
//! max_concurrency: 4
//! plugins:
//!   - name: pngquant
//!     options:
//!       quality: [0.65, 0.8]
//! ```

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::pattern::PatternMatcher;
use crate::transforms::{PluginEntry, TransformConfig};

/// Default configuration file name
pub const CONFIG_FILE: &str = "squish.yaml";

/// Configuration as written in `squish.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Asset name patterns; omitted means every asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<serde_yaml::Value>,

    /// Maximum number of transforms in flight; omitted means one per core
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Ordered plugin chain
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

/// Validated, compiled settings for an optimizer
#[derive(Debug, Clone)]
pub struct Settings {
    /// Compiled `test` patterns
    pub matcher: PatternMatcher,

    /// Maximum number of transforms in flight (at least 1)
    pub max_concurrency: usize,

    /// Enabled plugins in order
    pub transform: TransformConfig,
}

impl Settings {
    /// Create settings from already-compiled parts
    pub fn new(
        matcher: PatternMatcher,
        max_concurrency: usize,
        transform: TransformConfig,
    ) -> Result<Self> {
        Ok(Self {
            matcher,
            max_concurrency: validate_concurrency(max_concurrency)?,
            transform,
        })
    }
}

impl OptimizerConfig {
    /// Load configuration from a file or a directory containing `squish.yaml`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // an empty file is an all-defaults config
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Validate and compile, defaulting concurrency to the logical core count
    pub fn resolve(&self) -> Result<Settings> {
        self.resolve_with(logical_cores)
    }

    /// Validate and compile with an injected core count.
    ///
    /// `cores` is called at most once, and only when `max_concurrency` is
    /// not set.
    pub fn resolve_with<F>(&self, cores: F) -> Result<Settings>
    where
        F: FnOnce() -> usize,
    {
        let matcher = match &self.test {
            Some(value) => PatternMatcher::from_value(value)?,
            None => PatternMatcher::match_all(),
        };

        let max_concurrency = match self.max_concurrency {
            Some(n) => validate_concurrency(n)?,
            None => cores().max(1),
        };

        for entry in &self.plugins {
            if entry.name.trim().is_empty() {
                return Err(Error::ConfigInvalid {
                    message: "plugin name must not be empty".to_string(),
                });
            }
        }

        Ok(Settings {
            matcher,
            max_concurrency,
            transform: TransformConfig::from_entries(&self.plugins),
        })
    }
}

fn validate_concurrency(n: usize) -> Result<usize> {
    if n == 0 {
        return Err(Error::ConfigInvalid {
            message: "max_concurrency must be a positive integer".to_string(),
        });
    }
    Ok(n)
}

/// Number of logical cores reported by the platform, at least 1
pub fn logical_cores() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
