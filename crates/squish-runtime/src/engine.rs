//! Optimization engine
//!
//! Scans an asset set, hands every asset whose name matches the `test`
//! patterns to the transformer under a concurrency limit, and writes back the
//! ones that got smaller.
//!
//! ```text
//! scan ──▶ skipped
//!   └────▶ queued ──▶ running ──▶ committed | unchanged | failed
//!                └──▶ abandoned (after the first failure)
//! ```
//!
//! All candidate futures are polled on the caller's task; only the collection
//! loop writes to the asset set, once per candidate at most.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use squish_core::{
    Asset, AssetMap, AssetTransformer, PatternMatcher, RawAsset, Settings, Transform,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::limiter::Limiter;

/// Final state of one asset in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Name did not match; never read
    Skipped,
    /// Replaced with a strictly smaller buffer
    Committed,
    /// Transformed, but the result was not smaller
    Unchanged,
    /// The transform failed
    Failed,
    /// Never transformed because an earlier candidate failed
    Abandoned,
}

/// Summary of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Assets whose names matched
    pub candidates: usize,
    /// Assets whose names did not match
    pub skipped: usize,
    /// Candidates replaced with a smaller buffer
    pub optimized: usize,
    /// Candidates left as they were
    pub unchanged: usize,
    /// Candidates whose transform failed
    pub failed: usize,
    /// Candidates never transformed because of an earlier failure
    pub abandoned: usize,
    /// Total size of optimized and unchanged candidates before the run
    pub bytes_before: u64,
    /// Total size of optimized and unchanged candidates after the run
    pub bytes_after: u64,
    /// Per-asset outcome
    pub assets: BTreeMap<String, AssetState>,
}

impl RunReport {
    /// Bytes removed by the run
    pub fn bytes_saved(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }

    fn record(&mut self, name: &str, state: AssetState) {
        match state {
            AssetState::Skipped => self.skipped += 1,
            AssetState::Committed => self.optimized += 1,
            AssetState::Unchanged => self.unchanged += 1,
            AssetState::Failed => self.failed += 1,
            AssetState::Abandoned => self.abandoned += 1,
        }
        self.assets.insert(name.to_string(), state);
    }
}

enum TaskOutcome {
    Optimized { before: usize, bytes: Vec<u8> },
    Unchanged { size: usize },
    Failed(squish_core::Error),
    Abandoned,
}

/// Pattern-filtered, non-regressing asset optimizer
#[derive(Debug, Clone)]
pub struct Optimizer {
    matcher: PatternMatcher,
    max_concurrency: usize,
    transformer: AssetTransformer,
}

impl Optimizer {
    /// Create an optimizer from validated settings and an external transform
    pub fn new(settings: Settings, transform: Arc<dyn Transform>) -> Self {
        Self {
            matcher: settings.matcher,
            max_concurrency: settings.max_concurrency,
            transformer: AssetTransformer::new(transform, settings.transform),
        }
    }

    /// Patterns selecting candidate assets
    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Maximum number of transforms in flight
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Optimize every matching asset in place.
    ///
    /// Returns once every started transform has settled. If any candidate
    /// fails, the first failure observed is returned as
    /// [`Error::RunFailed`]; candidates still waiting for a slot at that point
    /// are abandoned, while those already running finish and are committed if
    /// they succeed.
    pub async fn run(&self, assets: &mut AssetMap) -> Result<RunReport> {
        let limiter = Limiter::new(self.max_concurrency);
        self.run_with(&limiter, assets).await
    }

    /// Like [`run`](Self::run), but schedules transforms on a caller-supplied
    /// limiter.
    pub async fn run_with(&self, limiter: &Limiter, assets: &mut AssetMap) -> Result<RunReport> {
        tracing::info!(
            assets = assets.len(),
            max_concurrency = limiter.max_concurrency(),
            "optimization run started"
        );

        let abort = AtomicBool::new(false);
        let mut report = RunReport::default();
        let mut pending = FuturesUnordered::new();

        for (name, asset) in assets.iter() {
            if !self.matcher.test(name) {
                tracing::trace!(asset = %name, "skipped");
                report.record(name, AssetState::Skipped);
                continue;
            }
            report.candidates += 1;
            pending.push(self.optimize_one(limiter, &abort, name.clone(), Arc::clone(asset)));
        }

        let mut first_failure = None;
        while let Some((name, outcome)) = pending.next().await {
            match outcome {
                TaskOutcome::Optimized { before, bytes } => {
                    tracing::debug!(asset = %name, before, after = bytes.len(), "committed");
                    report.bytes_before += before as u64;
                    report.bytes_after += bytes.len() as u64;
                    report.record(&name, AssetState::Committed);
                    assets.insert(name, RawAsset::shared(bytes));
                }
                TaskOutcome::Unchanged { size } => {
                    tracing::debug!(asset = %name, size, "not smaller, kept original");
                    report.bytes_before += size as u64;
                    report.bytes_after += size as u64;
                    report.record(&name, AssetState::Unchanged);
                }
                TaskOutcome::Failed(error) => {
                    tracing::warn!(asset = %name, %error, "optimization failed");
                    abort.store(true, Ordering::SeqCst);
                    report.record(&name, AssetState::Failed);
                    if first_failure.is_none() {
                        first_failure = Some((name, error));
                    }
                }
                TaskOutcome::Abandoned => {
                    tracing::debug!(asset = %name, "abandoned after earlier failure");
                    report.record(&name, AssetState::Abandoned);
                }
            }
        }

        if let Some((asset, source)) = first_failure {
            return Err(Error::RunFailed {
                asset,
                source,
                failures: report.failed,
            });
        }

        tracing::info!(
            candidates = report.candidates,
            optimized = report.optimized,
            unchanged = report.unchanged,
            skipped = report.skipped,
            bytes_saved = report.bytes_saved(),
            "optimization run finished"
        );
        Ok(report)
    }

    async fn optimize_one(
        &self,
        limiter: &Limiter,
        abort: &AtomicBool,
        name: String,
        asset: Arc<dyn Asset>,
    ) -> (String, TaskOutcome) {
        let task = async {
            if abort.load(Ordering::SeqCst) {
                return TaskOutcome::Abandoned;
            }

            let source = asset.source();
            let before = source.len();
            tracing::trace!(asset = %name, size = before, "running transform");

            match self.transformer.transform(source).await {
                Ok(bytes) if bytes.len() < before => TaskOutcome::Optimized { before, bytes },
                Ok(_) => TaskOutcome::Unchanged { size: before },
                Err(error) => TaskOutcome::Failed(error),
            }
        };

        let outcome = limiter.run(task).await.unwrap_or(TaskOutcome::Abandoned);
        (name, outcome)
    }
}
