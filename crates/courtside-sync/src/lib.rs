//! Mirrors the primary location store into the search index.

pub mod error;
pub mod orchestrator;
pub mod transform;

pub use error::SyncError;
pub use orchestrator::{PipelinePlan, SyncOrchestrator, SyncState};
pub use transform::{address_id, transform};
