//! In-process store implementing both storage traits.
//!
//! Evaluates predicates and ranks with the in-process evaluators in
//! [`crate::search`] and [`crate::geo`]. Used by tests across the workspace and
//! for local runs without Postgres.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::locations::LocationRecord;
use crate::search::{Predicate, RankExpr};
use crate::store::{
    LocationSearchStore, PageQuery, RankedLocation, SortKey, SourceSelector, StoreReader,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<LocationRecord>>,
    offline: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new(rows: Vec<LocationRecord>) -> Self {
        Self {
            rows: RwLock::new(rows),
            offline: AtomicBool::new(false),
        }
    }

    /// Insert or replace a row by id.
    pub async fn upsert(&self, record: LocationRecord) {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => rows.push(record),
        }
    }

    pub async fn remove(&self, id: &str) -> bool {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        rows.len() != before
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

fn sort_key_of(record: &LocationRecord, rank: Option<&RankExpr>) -> SortKey {
    SortKey {
        rank: rank.map(|r| r.score(record)),
        created_at: record.created_at,
        id: record.id.clone(),
    }
}

#[async_trait]
impl LocationSearchStore for MemoryStore {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<RankedLocation>, StoreError> {
        self.check_online()?;
        let rows = self.rows.read().await;

        let mut hits: Vec<(SortKey, &LocationRecord)> = rows
            .iter()
            .filter(|r| query.predicate.matches(r))
            .map(|r| (sort_key_of(r, query.rank), r))
            .filter(|(key, _)| query.after.is_none_or(|anchor| key.is_after(anchor)))
            .collect();
        hits.sort_by(|(a, _), (b, _)| a.page_cmp(b));

        Ok(hits
            .into_iter()
            .take(query.limit)
            .map(|(key, record)| RankedLocation {
                record: record.clone(),
                score: key.rank,
            })
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        let n = rows.iter().filter(|r| predicate.matches(r)).count();
        Ok(i64::try_from(n).unwrap_or(i64::MAX))
    }

    async fn sort_key(
        &self,
        id: &str,
        rank: Option<&RankExpr>,
    ) -> Result<Option<SortKey>, StoreError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| r.id == id).map(|r| sort_key_of(r, rank)))
    }

    async fn get(&self, id: &str) -> Result<Option<LocationRecord>, StoreError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl StoreReader for MemoryStore {
    async fn count_locations(&self, selector: &SourceSelector) -> Result<i64, StoreError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        let n = rows.iter().filter(|r| selector.includes(r)).count();
        Ok(i64::try_from(n).unwrap_or(i64::MAX))
    }

    async fn fetch_locations(
        &self,
        selector: &SourceSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LocationRecord>, StoreError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        let mut selected: Vec<&LocationRecord> =
            rows.iter().filter(|r| selector.includes(r)).collect();
        match selector {
            SourceSelector::All => selected.sort_by(|a, b| a.id.cmp(&b.id)),
            SourceSelector::UpdatedSince(_) => selected.sort_by(|a, b| {
                a.last_modified()
                    .cmp(&b.last_modified())
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
        Ok(selected
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
