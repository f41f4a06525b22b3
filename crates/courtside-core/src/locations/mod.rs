//! Location records as stored in the primary store, plus derived views.

mod address;
mod region;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub use address::{state_code, Address};
pub use region::{BoundingBox, CenterPoint, Region, RegionInput};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check the coordinate ranges. Called at the read-path boundary only.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when latitude is outside [-90, 90],
    /// longitude is outside [-180, 180], or either is not finite.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::Validation(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::Validation(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A row of the `locations` table.
///
/// Read-only from this crate's perspective; ingestion happens elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub id: String,
    pub name: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Lowercase sport tags.
    pub sports: Vec<String>,
    /// Ordered boundary polygon; empty when unknown.
    pub bounds: Vec<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocationRecord {
    #[must_use]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// The full address, or `None` unless street, city, state and postal
    /// code are all non-empty.
    #[must_use]
    pub fn address(&self) -> Option<Address> {
        Address::from_parts(
            self.street.as_deref(),
            self.street2.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.postal_code.as_deref(),
        )
    }

    /// Update time, falling back to creation time.
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}
