//! Value types shared by the sync pipeline and its callers.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Full,
    Incremental,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Full => write!(f, "full"),
            SyncMode::Incremental => write!(f, "incremental"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Documents per index upsert call.
    pub batch_size: usize,
    pub debug: bool,
    pub mode: SyncMode,
}

/// Counters for one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub total_processed: u64,
    pub successful_upserts: u64,
    pub failed_upserts: u64,
    pub deletions: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// The run stopped early on cancellation.
    pub interrupted: bool,
}

impl SyncStats {
    #[must_use]
    pub fn start() -> Self {
        Self {
            total_processed: 0,
            successful_upserts: 0,
            failed_upserts: 0,
            deletions: 0,
            started_at: Utc::now(),
            ended_at: None,
            interrupted: false,
        }
    }

    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    /// Wall time of the run; up to now while it is still going.
    #[must_use]
    pub fn duration(&self) -> Duration {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).to_std().unwrap_or_default()
    }

    /// True when nothing failed. Callers derive the exit status from this.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_upserts == 0
    }
}
