//! Runtime error types

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end an optimization run
#[derive(Error, Debug)]
pub enum Error {
    /// At least one candidate asset failed; carries the first failure seen
    #[error("failed to optimize '{asset}': {source}")]
    RunFailed {
        /// Name of the asset whose failure was observed first
        asset: String,
        /// The first failure
        #[source]
        source: squish_core::Error,
        /// Total number of candidates that failed
        failures: usize,
    },

    /// The limiter stopped admitting tasks
    #[error("concurrency limiter is closed")]
    LimiterClosed,

    /// Error from squish-core outside of a run
    #[error(transparent)]
    Core(#[from] squish_core::Error),
}
