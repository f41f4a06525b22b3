//! Postgres-backed implementations of the core store traits.

use async_trait::async_trait;
use courtside_core::{
    LocationRecord, LocationSearchStore, PageQuery, Predicate, RankExpr, RankedLocation,
    SortKey, SourceSelector, StoreError, StoreReader,
};
use sqlx::PgPool;

use crate::locations;

fn unavailable(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "location store query failed");
    StoreError::Unavailable(err.to_string())
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Location store over a shared [`PgPool`].
#[derive(Debug, Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LocationSearchStore for PgLocationStore {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<RankedLocation>, StoreError> {
        let rows = locations::fetch_page(&self.pool, query)
            .await
            .map_err(unavailable)?;
        Ok(rows.into_iter().map(RankedLocation::from).collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError> {
        locations::count_matching(&self.pool, predicate)
            .await
            .map_err(unavailable)
    }

    async fn sort_key(
        &self,
        id: &str,
        rank: Option<&RankExpr>,
    ) -> Result<Option<SortKey>, StoreError> {
        locations::sort_key(&self.pool, id, rank)
            .await
            .map_err(unavailable)
    }

    async fn get(&self, id: &str) -> Result<Option<LocationRecord>, StoreError> {
        let row = locations::get_location(&self.pool, id)
            .await
            .map_err(unavailable)?;
        Ok(row.map(LocationRecord::from))
    }
}

#[async_trait]
impl StoreReader for PgLocationStore {
    async fn count_locations(&self, selector: &SourceSelector) -> Result<i64, StoreError> {
        locations::count_locations(&self.pool, selector)
            .await
            .map_err(unavailable)
    }

    async fn fetch_locations(
        &self,
        selector: &SourceSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LocationRecord>, StoreError> {
        let rows = locations::fetch_locations(&self.pool, selector, to_i64(offset), to_i64(limit))
            .await
            .map_err(unavailable)?;
        Ok(rows.into_iter().map(LocationRecord::from).collect())
    }
}
