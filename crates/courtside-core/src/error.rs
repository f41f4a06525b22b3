use thiserror::Error;

/// Validation failures raised before any store access.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid search mode \"{0}\" (expected exact, fuzzy, phrase or combined)")]
    InvalidSearchMode(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Failure reaching or querying the primary store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the read path.
///
/// Transport layers map `Validation` to a 4xx and `StoreUnavailable` to a 5xx.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}
