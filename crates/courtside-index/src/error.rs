use thiserror::Error;

/// Errors returned by the search-index client.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The index answered `429 Too Many Requests`.
    #[error("search index rate limit exceeded")]
    RateLimited,

    #[error("search index returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Missing credentials or an unusable base URL or index name.
    #[error("search index configuration error: {0}")]
    Config(String),
}
