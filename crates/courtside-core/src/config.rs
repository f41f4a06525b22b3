use crate::app_config::{AppConfig, IndexCredentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let log_level = or_default("COURTSIDE_LOG_LEVEL", "info");

    let index_credentials = match (lookup("ALGOLIA_APP_ID"), lookup("ALGOLIA_ADMIN_KEY")) {
        (Ok(app_id), Ok(admin_key)) if !app_id.is_empty() && !admin_key.is_empty() => {
            Some(IndexCredentials { app_id, admin_key })
        }
        _ => None,
    };
    let index_name = or_default("ALGOLIA_INDEX_NAME", "locations");

    let sync_batch_size = parse_batch_size(&or_default("SYNC_BATCH_SIZE", "1000"))?;
    let sync_debug = parse_flag("SYNC_DEBUG", &or_default("SYNC_DEBUG", "false"))?;

    let db_max_connections = parse_u32("COURTSIDE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("COURTSIDE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("COURTSIDE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let index_request_timeout_secs = parse_u64("COURTSIDE_INDEX_REQUEST_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        database_url,
        log_level,
        index_credentials,
        index_name,
        sync_batch_size,
        sync_debug,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        index_request_timeout_secs,
    })
}

fn parse_batch_size(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "SYNC_BATCH_SIZE".to_string(),
        reason,
    };
    let size = raw.parse::<usize>().map_err(|e| invalid(e.to_string()))?;
    if size == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(size)
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}
