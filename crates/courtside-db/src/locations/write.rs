//! Write operations for the `locations` table.

use sqlx::{types::Json, PgPool};

use super::types::NewLocation;

/// Insert a location and return its generated id.
///
/// Sport tags are stored lower-cased and trimmed; empty tags are dropped.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails, including coordinate
/// `CHECK` violations.
pub async fn insert_location(pool: &PgPool, location: &NewLocation) -> Result<String, sqlx::Error> {
    let sports: Vec<String> = location
        .sports
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let id = sqlx::query_scalar::<_, String>(
        "INSERT INTO locations \
             (name, street, street2, city, state, postal_code, \
              latitude, longitude, sports, bounds, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, NOW())) \
         RETURNING id",
    )
    .bind(location.name.as_deref())
    .bind(location.street.as_deref())
    .bind(location.street2.as_deref())
    .bind(location.city.as_deref())
    .bind(location.state.as_deref())
    .bind(location.postal_code.as_deref())
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(&sports)
    .bind(Json(&location.bounds))
    .bind(location.created_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Mark a location as modified now. Returns `false` when no row has `id`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the update fails.
pub async fn touch_location(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE locations SET updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a location. Returns `false` when no row has `id`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the delete fails.
pub async fn delete_location(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM locations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
