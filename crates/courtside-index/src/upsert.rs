//! Batch upserts with a single retry on rate limiting.
//!
//! Failures never propagate: a batch either lands whole or is counted as
//! failed whole, and the caller moves on to the next one.

use std::time::Duration;

use crate::client::IndexWriter;
use crate::document::SearchDocument;
use crate::error::IndexError;

/// Wait before the one retry after a `429`.
pub const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub succeeded: u64,
    pub failed: u64,
}

impl UpsertOutcome {
    fn succeeded(count: usize) -> Self {
        Self {
            succeeded: count as u64,
            failed: 0,
        }
    }

    fn failed(count: usize) -> Self {
        Self {
            succeeded: 0,
            failed: count as u64,
        }
    }
}

pub struct BatchUpserter<'a, W: ?Sized> {
    writer: &'a W,
    retry_delay: Duration,
}

impl<'a, W: IndexWriter + ?Sized> BatchUpserter<'a, W> {
    #[must_use]
    pub fn new(writer: &'a W) -> Self {
        Self {
            writer,
            retry_delay: RATE_LIMIT_RETRY_DELAY,
        }
    }

    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Save `documents` as one batch. Empty input is a no-op.
    pub async fn upsert(&self, documents: &[SearchDocument]) -> UpsertOutcome {
        if documents.is_empty() {
            return UpsertOutcome::default();
        }

        match self.writer.save_objects(documents).await {
            Ok(()) => UpsertOutcome::succeeded(documents.len()),
            Err(IndexError::RateLimited) => {
                tracing::warn!(
                    count = documents.len(),
                    delay_ms = self.retry_delay.as_millis(),
                    "search index rate limited; retrying batch once"
                );
                tokio::time::sleep(self.retry_delay).await;
                match self.writer.save_objects(documents).await {
                    Ok(()) => UpsertOutcome::succeeded(documents.len()),
                    Err(e) => {
                        tracing::error!(
                            count = documents.len(),
                            error = %e,
                            "batch upsert failed after rate-limit retry"
                        );
                        UpsertOutcome::failed(documents.len())
                    }
                }
            }
            Err(e) => {
                tracing::error!(count = documents.len(), error = %e, "batch upsert failed");
                UpsertOutcome::failed(documents.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::document::GeoLoc;
    use crate::settings::IndexSettings;

    /// Answers each `save_objects` call from a script; `None` means success.
    struct ScriptedWriter {
        script: Mutex<Vec<Option<IndexError>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedWriter {
        fn new(mut script: Vec<Option<IndexError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl IndexWriter for ScriptedWriter {
        async fn save_objects(&self, _documents: &[SearchDocument]) -> Result<(), IndexError> {
            *self.calls.lock().unwrap() += 1;
            match self.script.lock().unwrap().pop().flatten() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn clear_objects(&self) -> Result<(), IndexError> {
            Ok(())
        }

        async fn delete_object(&self, _object_id: &str) -> Result<(), IndexError> {
            Ok(())
        }

        async fn set_settings(&self, _settings: &IndexSettings) -> Result<(), IndexError> {
            Ok(())
        }
    }

    fn docs(n: usize) -> Vec<SearchDocument> {
        (0..n)
            .map(|i| SearchDocument {
                object_id: format!("loc-{i}"),
                name: None,
                address: None,
                geoloc: GeoLoc { lat: 0.0, lng: 0.0 },
                sports: vec![],
                address_id: None,
                synced_at: 0,
                updated_at: 0,
            })
            .collect()
    }

    fn server_error() -> IndexError {
        IndexError::UnexpectedStatus {
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let writer = ScriptedWriter::new(vec![]);
        let outcome = BatchUpserter::new(&writer).upsert(&[]).await;
        assert_eq!(outcome, UpsertOutcome::default());
        assert_eq!(writer.calls(), 0);
    }

    #[tokio::test]
    async fn success_counts_every_document() {
        let writer = ScriptedWriter::new(vec![None]);
        let outcome = BatchUpserter::new(&writer).upsert(&docs(3)).await;
        assert_eq!(outcome.succeeded, 3);
        assert_eq!(outcome.failed, 0);
    }

    #[tokio::test]
    async fn rate_limit_is_retried_once_after_delay() {
        let writer = ScriptedWriter::new(vec![Some(IndexError::RateLimited), None]);
        let delay = Duration::from_millis(20);
        let started = std::time::Instant::now();

        let outcome = BatchUpserter::new(&writer)
            .with_retry_delay(delay)
            .upsert(&docs(4))
            .await;

        assert_eq!(outcome.succeeded, 4);
        assert_eq!(writer.calls(), 2);
        assert!(started.elapsed() >= delay);
    }

    #[tokio::test]
    async fn second_rate_limit_fails_whole_batch() {
        let writer = ScriptedWriter::new(vec![
            Some(IndexError::RateLimited),
            Some(IndexError::RateLimited),
        ]);
        let outcome = BatchUpserter::new(&writer)
            .with_retry_delay(Duration::ZERO)
            .upsert(&docs(5))
            .await;
        assert_eq!(outcome.failed, 5);
        assert_eq!(writer.calls(), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let writer = ScriptedWriter::new(vec![Some(server_error()), None]);
        let outcome = BatchUpserter::new(&writer)
            .with_retry_delay(Duration::ZERO)
            .upsert(&docs(2))
            .await;
        assert_eq!(outcome.failed, 2);
        assert_eq!(writer.calls(), 1);
    }
}
