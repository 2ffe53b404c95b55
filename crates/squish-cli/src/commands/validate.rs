//! Validate configuration command

use anyhow::{Context, Result};
use squish_core::ProcessTransform;

/// Run the validate command
pub async fn run(config_path: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let settings = config.resolve().context("Invalid configuration")?;
    ProcessTransform::validate(&settings.transform).context("Invalid plugin configuration")?;

    let patterns: Vec<&str> = settings.matcher.sources().collect();
    tracing::info!("✓ Test patterns: {}", patterns.join(", "));
    tracing::info!("✓ Max concurrency: {}", settings.max_concurrency);
    for plugin in settings.transform.plugins() {
        tracing::info!("✓ Plugin: {}", plugin.name);
    }
    if settings.transform.is_empty() {
        tracing::warn!("No plugins enabled; assets will be left as they are");
    }

    tracing::info!("✓ Configuration is valid");
    Ok(())
}
