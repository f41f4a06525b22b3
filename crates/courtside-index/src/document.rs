//! The record shape stored in the search index.

use courtside_core::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLoc {
    pub lat: f64,
    pub lng: f64,
}

/// One location as the search index sees it, keyed by `objectID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub name: Option<String>,
    /// `null` unless every required address part is present.
    pub address: Option<Address>,
    #[serde(rename = "_geoloc")]
    pub geoloc: GeoLoc,
    /// Upper-cased sport tags.
    pub sports: Vec<String>,
    /// Content hash of the address; `null` with the address.
    #[serde(rename = "addressId")]
    pub address_id: Option<String>,
    /// Epoch millis.
    #[serde(rename = "_syncedAt")]
    pub synced_at: i64,
    /// Epoch millis.
    #[serde(rename = "_updatedAt")]
    pub updated_at: i64,
}
