//! Database operations for the `locations` table.

mod read;
mod search;
mod types;
mod write;

pub use read::{count_locations, fetch_locations, get_location};
pub use search::{count_matching, fetch_page, sort_key};
pub use types::{LocationRow, NewLocation, RankedLocationRow};
pub use write::{delete_location, insert_location, touch_location};

/// Column list shared by every read of a full row.
const LOCATION_COLUMNS: &str = "id, name, street, street2, city, state, postal_code, \
     latitude, longitude, sports, bounds, created_at, updated_at";
