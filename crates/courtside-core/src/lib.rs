//! Domain core for courtside: location types, search ranking, filter
//! composition, cursor pagination and the read-path query service.
//!
//! Storage is reached only through the traits in [`store`]; the Postgres
//! implementation lives in `courtside-db` and an in-process one in [`memory`].

pub mod app_config;
pub mod config;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod geo;
pub mod locations;
pub mod memory;
pub mod query;
pub mod search;
pub mod store;
pub mod sync;

pub use app_config::{AppConfig, IndexCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use cursor::Cursor;
pub use error::{ConfigError, CoreError, QueryError, StoreError};
pub use filter::{compose, ComposedFilter, LocationFilters};
pub use geo::region_predicate;
pub use locations::{
    state_code, Address, BoundingBox, CenterPoint, GeoPoint, LocationRecord, Region, RegionInput,
};
pub use memory::MemoryStore;
pub use query::{
    LocationConnection, LocationEdge, LocationNode, LocationQueryService, LocationSearchRequest,
    PageInfo,
};
pub use search::{normalize_query, Predicate, RankExpr, SearchMode, TextField, TextQuery};
pub use store::{
    LocationSearchStore, PageQuery, RankedLocation, SortKey, SourceSelector, StoreReader,
};
pub use sync::{SyncConfig, SyncMode, SyncStats};
