use courtside_core::StoreError;
use courtside_index::IndexError;
use thiserror::Error;

/// Setup failures that end a run. Per-batch failures are counted in
/// [`courtside_core::SyncStats`] instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync configuration error: {0}")]
    Config(String),

    #[error("location store error: {0}")]
    Store(#[from] StoreError),

    #[error("search index error: {0}")]
    Index(#[from] IndexError),
}
