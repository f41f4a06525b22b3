//! Plain reads of the `locations` table, used by the sync pipeline.

use courtside_core::SourceSelector;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::types::LocationRow;
use super::LOCATION_COLUMNS;

fn push_selector_filter(qb: &mut QueryBuilder<'_, Postgres>, selector: &SourceSelector) {
    if let SourceSelector::UpdatedSince(watermark) = selector {
        qb.push(" WHERE COALESCE(updated_at, created_at) >= ")
            .push_bind(*watermark);
    }
}

/// Count the rows `selector` would read.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_locations(pool: &PgPool, selector: &SourceSelector) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM locations");
    push_selector_filter(&mut qb, selector);
    let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// Read one batch of rows in the selector's stable order.
///
/// `All` is ordered by `id`; `UpdatedSince` by modification time, then `id`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn fetch_locations(
    pool: &PgPool,
    selector: &SourceSelector,
    offset: i64,
    limit: i64,
) -> Result<Vec<LocationRow>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(LOCATION_COLUMNS).push(" FROM locations");
    push_selector_filter(&mut qb, selector);
    qb.push(match selector {
        SourceSelector::All => " ORDER BY id ASC",
        SourceSelector::UpdatedSince(_) => " ORDER BY COALESCE(updated_at, created_at) ASC, id ASC",
    });
    qb.push(" OFFSET ")
        .push_bind(offset)
        .push(" LIMIT ")
        .push_bind(limit);
    let rows = qb.build_query_as::<LocationRow>().fetch_all(pool).await?;
    Ok(rows)
}

/// Fetch a single location by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_location(pool: &PgPool, id: &str) -> Result<Option<LocationRow>, sqlx::Error> {
    let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1");
    let row = sqlx::query_as::<_, LocationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
