//! Store row → search document.

use chrono::{DateTime, Utc};
use courtside_core::{Address, LocationRecord};
use courtside_index::{GeoLoc, SearchDocument};
use sha2::{Digest, Sha256};

/// Stable id for an address: the first 8 bytes of SHA-256 over the JSON
/// array `[street, city, state, postal_code]`, as 16 lowercase hex digits.
#[must_use]
pub fn address_id(address: &Address) -> String {
    let canonical = serde_json::json!([
        address.street,
        address.city,
        address.state,
        address.postal_code
    ])
    .to_string();
    let hash = Sha256::digest(canonical.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    format!("{:016x}", u64::from_be_bytes(bytes))
}

/// Build the index document for `record`, stamped with `synced_at`.
#[must_use]
pub fn transform(record: &LocationRecord, synced_at: DateTime<Utc>) -> SearchDocument {
    let address = record.address();
    let address_id = address.as_ref().map(address_id);

    SearchDocument {
        object_id: record.id.clone(),
        name: record.name.clone(),
        address,
        geoloc: GeoLoc {
            lat: record.latitude,
            lng: record.longitude,
        },
        sports: record.sports.iter().map(|s| s.to_uppercase()).collect(),
        address_id,
        synced_at: synced_at.timestamp_millis(),
        updated_at: record.last_modified().timestamp_millis(),
    }
}
