//! Full and incremental sync runs over one batched pipeline.
//!
//! A run moves `Idle → FullSync | IncrementalSync → Completed | Failed`.
//! Only setup steps (clearing the index, counting source rows) can fail a
//! run; fetch and upsert failures are isolated to their batch and counted.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use courtside_core::{SourceSelector, StoreReader, SyncConfig, SyncMode, SyncStats};
use courtside_index::{BatchUpserter, IndexSettings, IndexWriter, SearchDocument};
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::transform::transform;

/// Upper bound on rows read per fetch.
pub const MAX_FETCH_BATCH_SIZE: usize = 2000;
pub const FULL_SYNC_DELAY: Duration = Duration::from_millis(100);
pub const INCREMENTAL_SYNC_DELAY: Duration = Duration::from_millis(50);
/// How far back an incremental run looks.
pub const INCREMENTAL_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    FullSync,
    IncrementalSync,
    Completed,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::FullSync => "full_sync",
            SyncState::IncrementalSync => "incremental_sync",
            SyncState::Completed => "completed",
            SyncState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What one run reads and how it paces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelinePlan {
    pub selector: SourceSelector,
    pub fetch_batch_size: usize,
    pub upsert_batch_size: usize,
    pub inter_batch_delay: Duration,
}

impl PipelinePlan {
    fn fetch_size(batch_size: usize) -> usize {
        batch_size.saturating_mul(2).min(MAX_FETCH_BATCH_SIZE)
    }

    #[must_use]
    pub fn full(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            selector: SourceSelector::All,
            fetch_batch_size: Self::fetch_size(batch_size),
            upsert_batch_size: batch_size,
            inter_batch_delay: FULL_SYNC_DELAY,
        }
    }

    /// Rows modified within the last day, as of `now`.
    #[must_use]
    pub fn incremental(batch_size: usize, now: DateTime<Utc>) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            selector: SourceSelector::UpdatedSince(
                now - chrono::Duration::hours(INCREMENTAL_WINDOW_HOURS),
            ),
            fetch_batch_size: Self::fetch_size(batch_size),
            upsert_batch_size: batch_size,
            inter_batch_delay: INCREMENTAL_SYNC_DELAY,
        }
    }
}

pub struct SyncOrchestrator<R, W> {
    reader: R,
    writer: W,
    config: SyncConfig,
    cancel: CancellationToken,
    state: SyncState,
    delay_override: Option<Duration>,
    retry_delay_override: Option<Duration>,
}

impl<R: StoreReader, W: IndexWriter> SyncOrchestrator<R, W> {
    #[must_use]
    pub fn new(reader: R, writer: W, config: SyncConfig) -> Self {
        Self {
            reader,
            writer,
            config,
            cancel: CancellationToken::new(),
            state: SyncState::Idle,
            delay_override: None,
            retry_delay_override: None,
        }
    }

    /// Stop the run at the next batch boundary when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replace the plan's pause between fetch batches.
    #[must_use]
    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.delay_override = Some(delay);
        self
    }

    /// Replace the wait before retrying a rate-limited upsert.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_override = Some(delay);
        self
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn transition(&mut self, next: SyncState) {
        tracing::info!(from = %self.state, to = %next, "sync state transition");
        self.state = next;
    }

    fn fail(&mut self, err: SyncError) -> SyncError {
        tracing::error!(error = %err, "sync run failed");
        self.transition(SyncState::Failed);
        err
    }

    /// Run one sync pass in the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] for a zero batch size,
    /// [`SyncError::Index`] if a full run cannot clear the index, or
    /// [`SyncError::Store`] if the source rows cannot be counted.
    pub async fn run(&mut self) -> Result<SyncStats, SyncError> {
        if self.config.batch_size == 0 {
            return Err(self.fail(SyncError::Config(
                "batch size must be greater than zero".to_string(),
            )));
        }

        let mut stats = SyncStats::start();
        let plan = match self.config.mode {
            SyncMode::Full => {
                self.transition(SyncState::FullSync);
                if let Err(e) = self.writer.clear_objects().await {
                    return Err(self.fail(e.into()));
                }
                tracing::info!("cleared search index");
                PipelinePlan::full(self.config.batch_size)
            }
            SyncMode::Incremental => {
                self.transition(SyncState::IncrementalSync);
                PipelinePlan::incremental(self.config.batch_size, Utc::now())
            }
        };

        let total = match self.reader.count_locations(&plan.selector).await {
            Ok(n) => usize::try_from(n.max(0)).unwrap_or(usize::MAX),
            Err(e) => return Err(self.fail(e.into())),
        };
        tracing::info!(
            mode = %self.config.mode,
            total,
            fetch_batch_size = plan.fetch_batch_size,
            upsert_batch_size = plan.upsert_batch_size,
            "starting sync"
        );

        self.run_pipeline(&plan, total, &mut stats).await;

        stats.finish();
        self.transition(SyncState::Completed);
        tracing::info!(
            processed = stats.total_processed,
            succeeded = stats.successful_upserts,
            failed = stats.failed_upserts,
            interrupted = stats.interrupted,
            duration_ms = stats.duration().as_millis(),
            "sync finished"
        );
        Ok(stats)
    }

    async fn run_pipeline(&self, plan: &PipelinePlan, total: usize, stats: &mut SyncStats) {
        let mut upserter = BatchUpserter::new(&self.writer);
        if let Some(delay) = self.retry_delay_override {
            upserter = upserter.with_retry_delay(delay);
        }
        let pause = self.delay_override.unwrap_or(plan.inter_batch_delay);
        let width = plan.fetch_batch_size;

        let mut offset = 0usize;
        while offset < total {
            if self.cancel.is_cancelled() {
                stats.interrupted = true;
                break;
            }

            match self
                .reader
                .fetch_locations(&plan.selector, offset, width)
                .await
            {
                Ok(rows) => {
                    let synced_at = Utc::now();
                    let documents: Vec<SearchDocument> =
                        rows.iter().map(|row| transform(row, synced_at)).collect();
                    if self.config.debug {
                        let ids: Vec<&str> =
                            documents.iter().map(|d| d.object_id.as_str()).collect();
                        tracing::debug!(offset, ?ids, "transformed batch");
                    }
                    for chunk in documents.chunks(plan.upsert_batch_size) {
                        let outcome = upserter.upsert(chunk).await;
                        stats.successful_upserts += outcome.succeeded;
                        stats.failed_upserts += outcome.failed;
                        stats.total_processed += chunk.len() as u64;
                    }
                }
                Err(e) => {
                    let skipped = width.min(total - offset);
                    tracing::error!(
                        offset,
                        skipped,
                        error = %e,
                        "fetch failed; skipping batch"
                    );
                    stats.failed_upserts += skipped as u64;
                    stats.total_processed += skipped as u64;
                }
            }

            offset = offset.saturating_add(width);
            tracing::info!(
                processed = stats.total_processed,
                total,
                failed = stats.failed_upserts,
                "sync progress"
            );

            if offset < total {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => {
                        stats.interrupted = true;
                        break;
                    }
                    () = tokio::time::sleep(pause) => {}
                }
            }
        }
    }

    /// Remove one object from the index and count it in `stats`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Index`] if the delete call fails.
    pub async fn delete_location(&self, id: &str, stats: &mut SyncStats) -> Result<(), SyncError> {
        self.writer.delete_object(id).await?;
        stats.deletions += 1;
        tracing::info!(id, "deleted location from search index");
        Ok(())
    }

    /// Push the locations index settings.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Index`] if the settings call fails.
    pub async fn configure_index(&self) -> Result<(), SyncError> {
        self.writer.set_settings(&IndexSettings::locations()).await?;
        tracing::info!("search index settings updated");
        Ok(())
    }
}
