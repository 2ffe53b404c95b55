//! Non-regressing asset transformer
//!
//! Runs the external transform once per asset and keeps the output only if it
//! is strictly smaller than the input.

use std::sync::Arc;

use crate::asset::Source;
use crate::error::{Error, Result};
use crate::transforms::{Transform, TransformConfig};

/// Applies an external transform under the non-regression rule
#[derive(Clone)]
pub struct AssetTransformer {
    transform: Arc<dyn Transform>,
    config: TransformConfig,
}

impl AssetTransformer {
    /// Create a transformer for the given transform and plugin chain
    pub fn new(transform: Arc<dyn Transform>, config: TransformConfig) -> Self {
        Self { transform, config }
    }

    /// The plugin chain passed to every call
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Transform one asset's contents.
    ///
    /// Text is encoded as UTF-8 first. Returns the transform's output when it
    /// is shorter than the input, otherwise the input itself. Transform errors
    /// come back as [`Error::TransformExecution`]; nothing is retried.
    pub async fn transform(&self, source: impl Into<Source>) -> Result<Vec<u8>> {
        let input = source.into().into_bytes();

        let output = self
            .transform
            .transform(&input, &self.config)
            .await
            .map_err(|source| Error::TransformExecution { source })?;

        if output.len() < input.len() {
            tracing::debug!(before = input.len(), after = output.len(), "transform reduced size");
            Ok(output)
        } else {
            tracing::debug!(
                before = input.len(),
                after = output.len(),
                "transform did not reduce size, keeping original"
            );
            Ok(input)
        }
    }
}

impl std::fmt::Debug for AssetTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetTransformer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
