//! Optimize a build output directory

use anyhow::{Context, Result};
use squish_core::ProcessTransform;
use squish_runtime::Optimizer;
use std::path::Path;
use std::sync::Arc;

use crate::workspace;

/// Command-line overrides for an optimize run
#[derive(Debug, Default)]
pub struct OptimizeOptions {
    /// Glob patterns replacing the configured `test`
    pub tests: Vec<String>,
    /// Concurrency override
    pub max_concurrency: Option<usize>,
    /// Skip writing results
    pub dry_run: bool,
    /// Print the report as JSON on stdout
    pub json: bool,
}

/// Run the optimize command
pub async fn run(config_path: Option<&str>, dir: &str, options: OptimizeOptions) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if !options.tests.is_empty() {
        config.test = Some(serde_yaml::Value::Sequence(
            options.tests.iter().cloned().map(Into::into).collect(),
        ));
    }
    if let Some(n) = options.max_concurrency {
        config.max_concurrency = Some(n);
    }

    let settings = config.resolve().context("Invalid configuration")?;
    ProcessTransform::validate(&settings.transform).context("Invalid plugin configuration")?;

    let root = Path::new(dir);
    let mut assets = workspace::load_assets(root)
        .with_context(|| format!("Failed to read assets from {}", root.display()))?;
    tracing::info!("Loaded {} assets from {}", assets.len(), root.display());

    let optimizer = Optimizer::new(settings, Arc::new(ProcessTransform::new()));
    let report = optimizer
        .run(&mut assets)
        .await
        .context("Optimization failed")?;

    if options.dry_run {
        tracing::info!("Dry run: {} assets would be rewritten", report.optimized);
    } else {
        let written = workspace::write_committed(root, &assets, &report)
            .context("Failed to write optimized assets")?;
        tracing::info!("Rewrote {} assets", written);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        tracing::info!(
            "{} optimized, {} unchanged, {} skipped, {} bytes saved",
            report.optimized,
            report.unchanged,
            report.skipped,
            report.bytes_saved()
        );
    }

    Ok(())
}
