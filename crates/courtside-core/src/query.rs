//! Location Query Service: validated, ranked, keyset-paginated reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cursor::{self, Cursor};
use crate::error::{CoreError, QueryError};
use crate::filter::{compose, LocationFilters};
use crate::locations::{Address, GeoPoint, LocationRecord, RegionInput};
use crate::search::{RankExpr, SearchMode, TextQuery, DEFAULT_SIMILARITY_THRESHOLD};
use crate::store::{LocationSearchStore, PageQuery, RankedLocation, SortKey};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Read request as a transport layer hands it over.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationSearchRequest {
    pub region: Option<RegionInput>,
    pub sports: Option<Vec<String>>,
    pub query: Option<String>,
    pub search_mode: Option<String>,
    pub similarity_threshold: Option<f64>,
    pub after: Option<String>,
    pub first: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNode {
    pub id: String,
    pub name: Option<String>,
    pub address: Option<Address>,
    pub latitude: f64,
    pub longitude: f64,
    pub sports: Vec<String>,
    pub bounds: Vec<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Relevance; present only for text queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl LocationNode {
    #[must_use]
    pub fn from_record(record: LocationRecord, score: Option<f64>) -> Self {
        Self {
            address: record.address(),
            updated_at: record.last_modified(),
            id: record.id,
            name: record.name,
            latitude: record.latitude,
            longitude: record.longitude,
            sports: record.sports,
            bounds: record.bounds,
            created_at: record.created_at,
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationEdge {
    pub node: LocationNode,
    pub cursor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationConnection {
    pub edges: Vec<LocationEdge>,
    pub page_info: PageInfo,
    pub total_count: i64,
}

/// Parsed and validated form of a [`LocationSearchRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub filters: LocationFilters,
    pub cursor: Option<Cursor>,
    pub page_size: usize,
}

impl LocationSearchRequest {
    /// Validate every field without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] for conflicting or out-of-range regions, an
    /// unknown search mode, a threshold outside `[0, 1]`, or a cursor that
    /// does not decode.
    pub fn validate(&self) -> Result<ValidatedRequest, CoreError> {
        let region = match &self.region {
            Some(input) => input.clone().into_region()?,
            None => None,
        };

        let sports: Vec<String> = self
            .sports
            .iter()
            .flatten()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let mode = match &self.search_mode {
            Some(raw) => raw.parse::<SearchMode>()?,
            None => SearchMode::default(),
        };
        let threshold = self
            .similarity_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CoreError::Validation(format!(
                "similarity threshold must be within [0, 1], got {threshold}"
            )));
        }
        let text = match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Some(TextQuery::new(q, mode, threshold)?),
            _ => None,
        };

        let cursor = self.after.as_deref().map(cursor::decode).transpose()?;

        Ok(ValidatedRequest {
            filters: LocationFilters {
                sports,
                region,
                text,
            },
            cursor,
            page_size: normalize_page_size(self.first),
        })
    }
}

/// Default 50, clamped to `1..=200`.
#[must_use]
pub fn normalize_page_size(first: Option<i64>) -> usize {
    let clamped = first.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    usize::try_from(clamped).unwrap_or(1)
}

pub struct LocationQueryService<S> {
    store: S,
}

impl<S: LocationSearchStore> LocationQueryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate `request`, then fetch one page.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] before any store access when the
    /// request is malformed, and [`QueryError::StoreUnavailable`] when the
    /// store fails.
    pub async fn find_page(
        &self,
        request: &LocationSearchRequest,
    ) -> Result<LocationConnection, QueryError> {
        let validated = request.validate()?;
        self.find_page_with(
            &validated.filters,
            validated.cursor.as_ref(),
            validated.page_size,
        )
        .await
    }

    /// Fetch one page of already-validated filters.
    ///
    /// Reads `page_size + 1` rows to learn whether another page exists, and
    /// runs the filter-only count alongside the page query.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] when the cursor row is gone and the
    /// cursor carries no timestamp to fall back on, and
    /// [`QueryError::StoreUnavailable`] when the store fails.
    pub async fn find_page_with(
        &self,
        filters: &LocationFilters,
        cursor: Option<&Cursor>,
        page_size: usize,
    ) -> Result<LocationConnection, QueryError> {
        let composed = compose(filters);
        let rank = composed.rank.as_ref();

        let after = match cursor {
            Some(c) => Some(self.resolve_anchor(c, rank).await?),
            None => None,
        };

        let page_query = PageQuery {
            predicate: &composed.predicate,
            rank,
            after: after.as_ref(),
            limit: page_size + 1,
        };

        let (mut rows, total_count) = tokio::try_join!(
            self.store.fetch_page(&page_query),
            self.store.count(&composed.predicate),
        )?;

        let has_next_page = rows.len() > page_size;
        rows.truncate(page_size);

        tracing::debug!(
            returned = rows.len(),
            has_next_page,
            total_count,
            ranked = rank.is_some(),
            "location page fetched"
        );

        let edges: Vec<LocationEdge> = rows.into_iter().map(edge).collect();
        let end_cursor = edges.last().map(|e| e.cursor.clone());

        Ok(LocationConnection {
            edges,
            page_info: PageInfo {
                has_next_page,
                end_cursor,
            },
            total_count,
        })
    }

    /// Single location by id; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] when the store fails.
    pub async fn get_location(&self, id: &str) -> Result<Option<LocationNode>, QueryError> {
        let record = self.store.get(id).await?;
        Ok(record.map(|r| LocationNode::from_record(r, None)))
    }

    /// Full sort key of the cursor row. Falls back to the `(created_at, id)`
    /// carried in the cursor when the row no longer exists.
    async fn resolve_anchor(
        &self,
        cursor: &Cursor,
        rank: Option<&RankExpr>,
    ) -> Result<SortKey, QueryError> {
        if let Some(key) = self.store.sort_key(&cursor.id, rank).await? {
            return Ok(key);
        }
        match cursor.created_at() {
            Some(created_at) => {
                tracing::debug!(id = %cursor.id, "cursor row missing; resuming from cursor timestamp");
                Ok(SortKey {
                    rank: None,
                    created_at,
                    id: cursor.id.clone(),
                })
            }
            None => Err(CoreError::InvalidCursor(format!(
                "cursor row {} no longer exists",
                cursor.id
            ))
            .into()),
        }
    }
}

fn edge(row: RankedLocation) -> LocationEdge {
    let cursor = Cursor::for_row(&row.record.id, row.record.created_at).encode();
    LocationEdge {
        node: LocationNode::from_record(row.record, row.score),
        cursor,
    }
}
