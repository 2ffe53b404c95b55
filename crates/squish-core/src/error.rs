//! Error types for squish-core

use thiserror::Error;

use crate::transforms::BoxError;

/// Result type alias for squish-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in squish-core
#[derive(Error, Debug)]
pub enum Error {
    /// A `test` pattern could not be turned into a predicate
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern, as written
        pattern: String,
        /// Why it was rejected
        message: String,
    },

    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// Plugin name has no known implementation
    #[error("unknown plugin '{name}'")]
    UnknownPlugin {
        /// Name of the plugin
        name: String,
    },

    /// A plugin process ran but did not succeed
    #[error("plugin '{plugin}' failed: {message}")]
    PluginFailed {
        /// Name of the plugin
        plugin: String,
        /// Description of the failure
        message: String,
        /// Captured stderr, if any
        stderr: Option<String>,
    },

    /// The external transform raised an error for one asset
    #[error("transform failed: {source}")]
    TransformExecution {
        /// Error raised by the transform, unchanged
        #[source]
        source: BoxError,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
