/// Search-index credentials. Both halves are required together.
#[derive(Clone, PartialEq, Eq)]
pub struct IndexCredentials {
    pub app_id: String,
    pub admin_key: String,
}

impl std::fmt::Debug for IndexCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCredentials")
            .field("app_id", &self.app_id)
            .field("admin_key", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    /// `None` when either credential variable is unset. Sync, configure and
    /// delete operations fail fast on `None`; the read path never needs it.
    pub index_credentials: Option<IndexCredentials>,
    pub index_name: String,
    pub sync_batch_size: usize,
    pub sync_debug: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub index_request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("index_credentials", &self.index_credentials)
            .field("index_name", &self.index_name)
            .field("sync_batch_size", &self.sync_batch_size)
            .field("sync_debug", &self.sync_debug)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "index_request_timeout_secs",
                &self.index_request_timeout_secs,
            )
            .finish()
    }
}
