//! Squish Runtime
//!
//! This crate drives optimization runs over a build host's asset set.
//!
//! # Features
//!
//! - Bounded concurrency via [`Limiter`]
//! - Pattern-filtered, non-regressing runs via [`Optimizer`]
//! - A build-host hook contract via [`EmitHook`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use squish_runtime::Optimizer;
//!
//! let optimizer = Optimizer::new(settings, Arc::new(ProcessTransform::new()));
//! let report = optimizer.run(&mut assets).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod hook;
pub mod limiter;

pub use engine::{AssetState, Optimizer, RunReport};
pub use error::{Error, Result};
pub use hook::{EmitHook, emit_with_callback};
pub use limiter::Limiter;
