//! Windowed batch scheduler.
//!
//! Targets are processed in fixed-size windows. Every fetch in a window is
//! dispatched at once and the window settles completely before the next one
//! starts, which bounds open connections to the window size and gives a
//! clean point to checkpoint between windows.
//!
//! Results keep dispatch order inside a window (`join_all` preserves it), so
//! the output order always equals the target order no matter which fetch
//! finishes first.

use futures::future::join_all;
use std::time::Duration;
use tracing::{info, warn};

use crate::executor::HarvestExecutor;
use crate::harvest::checkpoint::{resume, CheckpointStore};
use crate::model::{HarvestRecord, ProgressMarker, Target};
use crate::traits::PageFetcher;

pub const DEFAULT_WINDOW_SIZE: usize = 10;
pub const DEFAULT_WINDOW_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_CHECKPOINT_EVERY: usize = 100;

// ============================================================================
// Progress
// ============================================================================

/// Running counts, accumulated by the scheduler after each window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTally {
    pub completed: usize,
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
}

impl ProgressTally {
    /// Starts from the records of a prior partial run.
    pub fn seeded(prior: &[HarvestRecord], total: usize) -> Self {
        let mut tally = Self {
            total,
            ..Self::default()
        };
        prior.iter().for_each(|r| tally.record(r));
        tally
    }

    pub fn record(&mut self, record: &HarvestRecord) {
        self.completed += 1;
        if record.is_ok() {
            self.ok += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn marker(&self) -> ProgressMarker {
        ProgressMarker {
            completed_count: self.completed,
            total_count: self.total,
        }
    }
}

/// What one scheduler pass produced.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Records for the targets processed in this pass, in target order.
    pub records: Vec<HarvestRecord>,
    /// Counts including any prior records the pass resumed from.
    pub tally: ProgressTally,
    pub windows: usize,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Batch scheduler with builder-style tuning.
///
/// ```ignore
/// let pipeline = HarvestPipeline::new(HarvestExecutor::new(fetcher))
///     .with_window_size(10)
///     .with_delay(Duration::from_millis(200))
///     .with_checkpoint(store, 100);
///
/// let run = pipeline.execute(&targets, &prior).await;
/// ```
pub struct HarvestPipeline<F: ?Sized> {
    executor: HarvestExecutor<F>,
    window_size: usize,
    window_delay: Duration,
    checkpoint: Option<CheckpointStore>,
    checkpoint_every: usize,
}

impl<F> HarvestPipeline<F>
where
    F: PageFetcher + ?Sized,
{
    /// Defaults: window of 10, 200ms between windows, no checkpointing.
    pub fn new(executor: HarvestExecutor<F>) -> Self {
        Self {
            executor,
            window_size: DEFAULT_WINDOW_SIZE,
            window_delay: DEFAULT_WINDOW_DELAY,
            checkpoint: None,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
        }
    }

    /// Sets the number of fetches in flight per window (minimum 1).
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    /// Pause between windows. Not applied after the last one.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.window_delay = delay;
        self
    }

    /// Persists progress whenever the completed count crosses a multiple of
    /// `every`, and after the final window.
    pub fn with_checkpoint(mut self, store: CheckpointStore, every: usize) -> Self {
        self.checkpoint = Some(store);
        self.checkpoint_every = every.max(1);
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Harvests every target not already covered by `prior`.
    ///
    /// Never fails: target failures are error records, and a checkpoint that
    /// cannot be written is logged and retried at the next opportunity.
    pub async fn execute(&self, targets: &[Target], prior: &[HarvestRecord]) -> PipelineRun {
        let remaining = resume(prior, targets);
        let mut tally = ProgressTally::seeded(prior, prior.len() + remaining.len());
        let mut records = Vec::with_capacity(remaining.len());

        let window_count = remaining.len().div_ceil(self.window_size);
        if !prior.is_empty() {
            info!(
                resumed = prior.len(),
                remaining = remaining.len(),
                "Resuming from checkpoint"
            );
        }

        for (idx, window) in remaining.chunks(self.window_size).enumerate() {
            let before = tally.completed;

            let settled = join_all(
                window
                    .iter()
                    .cloned()
                    .map(|target| self.executor.execute(target)),
            )
            .await;

            settled.iter().for_each(|r| tally.record(r));
            records.extend(settled);

            info!(
                window = idx + 1,
                completed = tally.completed,
                total = tally.total,
                ok = tally.ok,
                failed = tally.failed,
                "Window settled"
            );

            let last = idx + 1 == window_count;
            if last || self.crossed_checkpoint(before, tally.completed) {
                self.persist(prior, &records, tally).await;
            }

            if !last && !self.window_delay.is_zero() {
                tokio::time::sleep(self.window_delay).await;
            }
        }

        PipelineRun {
            records,
            tally,
            windows: window_count,
        }
    }

    fn crossed_checkpoint(&self, before: usize, after: usize) -> bool {
        before / self.checkpoint_every != after / self.checkpoint_every
    }

    async fn persist(&self, prior: &[HarvestRecord], fresh: &[HarvestRecord], tally: ProgressTally) {
        let Some(store) = &self.checkpoint else {
            return;
        };
        if let Err(e) = store.save(&[prior, fresh], tally.marker()).await {
            warn!(error = %e, "Failed to write checkpoint");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
