//! Squish Core Library
//!
//! This crate provides the building blocks for Squish:
//! - Asset name patterns (globs and regexes)
//! - The in-memory asset model shared with the build host
//! - Configuration parsing and validation
//! - The external transform contract and the non-regressing asset transformer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Config    │────▶│   Pattern   │────▶│    Asset    │
//! │   (YAML)    │     │   Matcher   │     │ Transformer │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use squish_core::{OptimizerConfig, PatternMatcher};
//!
//! let settings = OptimizerConfig::load("./squish.yaml")?.resolve()?;
//! assert!(settings.matcher.test("images/logo.png"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod asset;
pub mod config;
pub mod error;
pub mod glob;
pub mod pattern;
pub mod process;
pub mod transformer;
pub mod transforms;

pub use asset::{Asset, AssetMap, RawAsset, Source};
pub use config::{OptimizerConfig, Settings};
pub use error::{Error, Result};
pub use pattern::{PatternMatcher, RawPattern};
pub use process::ProcessTransform;
pub use transformer::AssetTransformer;
pub use transforms::{BoxError, PluginConfig, PluginEntry, Transform, TransformConfig};
