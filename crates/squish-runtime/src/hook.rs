//! Build-host integration
//!
//! A build host calls its emit hooks once per emit phase, with the finalized
//! asset set, and waits for them before writing anything out.

use async_trait::async_trait;
use squish_core::AssetMap;

use crate::engine::Optimizer;
use crate::error::{Error, Result};

/// Something that runs during a build's emit phase
#[async_trait]
pub trait EmitHook: Send + Sync {
    /// Process the asset set; resolves once all work has settled
    async fn on_emit(&self, assets: &mut AssetMap) -> Result<()>;
}

#[async_trait]
impl EmitHook for Optimizer {
    async fn on_emit(&self, assets: &mut AssetMap) -> Result<()> {
        self.run(assets).await.map(|_| ())
    }
}

/// Run a hook and report completion through a callback instead of a result.
///
/// The callback is invoked exactly once, with `None` on success.
pub async fn emit_with_callback<H, F>(hook: &H, assets: &mut AssetMap, done: F)
where
    H: EmitHook + ?Sized,
    F: FnOnce(Option<Error>),
{
    match hook.on_emit(assets).await {
        Ok(()) => done(None),
        Err(error) => done(Some(error)),
    }
}
