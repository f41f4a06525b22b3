//! Row types for the `locations` table.

use chrono::{DateTime, Utc};
use courtside_core::{GeoPoint, LocationRecord, RankedLocation};
use sqlx::types::Json;

/// Input record for inserting a location.
#[derive(Debug, Clone, Default)]
pub struct NewLocation {
    pub name: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Stored lower-cased.
    pub sports: Vec<String>,
    pub bounds: Vec<GeoPoint>,
    /// Defaults to `NOW()` when unset.
    pub created_at: Option<DateTime<Utc>>,
}

/// A row from the `locations` table.
///
/// The generated `location` and `search_vector` columns are never read back.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: String,
    pub name: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub sports: Vec<String>,
    pub bounds: Json<Vec<GeoPoint>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<LocationRow> for LocationRecord {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            street: row.street,
            street2: row.street2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            latitude: row.latitude,
            longitude: row.longitude,
            sports: row.sports,
            bounds: row.bounds.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A page row: the location plus its computed score (`NULL` when unranked).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RankedLocationRow {
    #[sqlx(flatten)]
    pub location: LocationRow,
    pub score: Option<f64>,
}

impl From<RankedLocationRow> for RankedLocation {
    fn from(row: RankedLocationRow) -> Self {
        Self {
            record: row.location.into(),
            score: row.score,
        }
    }
}
