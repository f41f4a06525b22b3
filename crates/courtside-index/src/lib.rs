//! Write-side client for the external search index.

pub mod client;
pub mod document;
pub mod error;
pub mod settings;
pub mod upsert;

pub use client::{AlgoliaClient, IndexWriter};
pub use document::{GeoLoc, SearchDocument};
pub use error::IndexError;
pub use settings::IndexSettings;
pub use upsert::{BatchUpserter, UpsertOutcome, RATE_LIMIT_RETRY_DELAY};
