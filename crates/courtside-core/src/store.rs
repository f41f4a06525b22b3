//! Storage seams. Services take these by constructor injection.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::locations::LocationRecord;
use crate::search::{Predicate, RankExpr};

/// Full position of a row in page order.
///
/// Page order is `rank DESC, created_at DESC, id ASC` when ranked, and
/// `created_at DESC, id ASC` otherwise. A key without a rank positions only
/// by `(created_at, id)`, even in a ranked query.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub rank: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub id: String,
}

impl SortKey {
    /// Compare two keys in page order; `Less` means `self` comes first.
    #[must_use]
    pub fn page_cmp(&self, other: &SortKey) -> Ordering {
        let by_rank = match (self.rank, other.rank) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            _ => Ordering::Equal,
        };
        by_rank
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Whether `self` sorts strictly after `anchor`.
    #[must_use]
    pub fn is_after(&self, anchor: &SortKey) -> bool {
        self.page_cmp(anchor) == Ordering::Greater
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageQuery<'a> {
    pub predicate: &'a Predicate,
    pub rank: Option<&'a RankExpr>,
    /// Keyset anchor; only rows strictly after it are returned.
    pub after: Option<&'a SortKey>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedLocation {
    pub record: LocationRecord,
    /// `Some` for ranked queries.
    pub score: Option<f64>,
}

/// Read path over the primary store.
#[async_trait]
pub trait LocationSearchStore: Send + Sync {
    /// Matching rows in page order, starting after `query.after`.
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<RankedLocation>, StoreError>;

    /// Number of rows matching `predicate`, ignoring rank and position.
    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError>;

    /// Sort key of row `id` under `rank`, or `None` when the row is gone.
    async fn sort_key(
        &self,
        id: &str,
        rank: Option<&RankExpr>,
    ) -> Result<Option<SortKey>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<LocationRecord>, StoreError>;
}

/// Which rows a sync pass reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSelector {
    /// Every row, ordered by `id`.
    All,
    /// Rows whose `COALESCE(updated_at, created_at)` is at or after the
    /// watermark, ordered by that time then `id`.
    UpdatedSince(DateTime<Utc>),
}

impl SourceSelector {
    #[must_use]
    pub fn includes(&self, record: &LocationRecord) -> bool {
        match self {
            SourceSelector::All => true,
            SourceSelector::UpdatedSince(watermark) => record.last_modified() >= *watermark,
        }
    }
}

/// Sync-side reads over the primary store.
#[async_trait]
pub trait StoreReader: Send + Sync {
    async fn count_locations(&self, selector: &SourceSelector) -> Result<i64, StoreError>;

    async fn fetch_locations(
        &self,
        selector: &SourceSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LocationRecord>, StoreError>;
}
