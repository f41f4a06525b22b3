//! HTTP client for an Algolia-compatible search index.
//!
//! Only the write side is covered: batch updates, clear, single deletes and
//! settings. Non-2xx answers surface as [`IndexError::RateLimited`] (429) or
//! [`IndexError::UnexpectedStatus`].

use std::time::Duration;

use async_trait::async_trait;
use courtside_core::{AppConfig, IndexCredentials};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;

use crate::document::SearchDocument;
use crate::error::IndexError;
use crate::settings::IndexSettings;

const APP_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

/// Write operations the sync pipeline needs from a search index.
#[async_trait]
pub trait IndexWriter: Send + Sync {
    /// Create or replace each document by `objectID`.
    async fn save_objects(&self, documents: &[SearchDocument]) -> Result<(), IndexError>;

    /// Remove every record from the index. Irreversible.
    async fn clear_objects(&self) -> Result<(), IndexError>;

    async fn delete_object(&self, object_id: &str) -> Result<(), IndexError>;

    async fn set_settings(&self, settings: &IndexSettings) -> Result<(), IndexError>;
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a SearchDocument,
}

/// Client for one index. Use [`AlgoliaClient::new`] for production or
/// [`AlgoliaClient::with_base_url`] to point at a mock server in tests.
pub struct AlgoliaClient {
    client: Client,
    credentials: IndexCredentials,
    index_name: String,
    base_url: Url,
}

impl std::fmt::Debug for AlgoliaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaClient")
            .field("credentials", &self.credentials)
            .field("index_name", &self.index_name)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl AlgoliaClient {
    /// Creates a client for the hosted service of `credentials.app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`IndexError::Config`] for an empty index name.
    pub fn new(
        credentials: IndexCredentials,
        index_name: &str,
        timeout_secs: u64,
    ) -> Result<Self, IndexError> {
        let base_url = format!("https://{}.algolia.net", credentials.app_id);
        Self::with_base_url(credentials, index_name, timeout_secs, &base_url)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`IndexError::Config`] for an empty index name or a base URL that
    /// cannot carry a path.
    pub fn with_base_url(
        credentials: IndexCredentials,
        index_name: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, IndexError> {
        if index_name.trim().is_empty() {
            return Err(IndexError::Config("index name must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("courtside/0.1 (index-sync)")
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| IndexError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(IndexError::Config(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            client,
            credentials,
            index_name: index_name.to_string(),
            base_url,
        })
    }

    /// Builds a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] when the index credentials are not
    /// configured, or any error from [`AlgoliaClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, IndexError> {
        let credentials = config.index_credentials.clone().ok_or_else(|| {
            IndexError::Config("ALGOLIA_APP_ID and ALGOLIA_ADMIN_KEY must both be set".to_string())
        })?;
        Self::new(
            credentials,
            &config.index_name,
            config.index_request_timeout_secs,
        )
    }

    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// `<base>/1/indexes/<index>/<tail...>`, with every segment percent-encoded.
    fn index_url(&self, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["1", "indexes", self.index_name.as_str()])
                .extend(tail);
        }
        url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(), IndexError> {
        let mut request = self
            .client
            .request(method, url)
            .header(APP_ID_HEADER, &self.credentials.app_id)
            .header(API_KEY_HEADER, &self.credentials.admin_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(IndexError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IndexWriter for AlgoliaClient {
    async fn save_objects(&self, documents: &[SearchDocument]) -> Result<(), IndexError> {
        if documents.is_empty() {
            return Ok(());
        }
        let body = BatchRequest {
            requests: documents
                .iter()
                .map(|doc| BatchOperation {
                    action: "updateObject",
                    body: doc,
                })
                .collect(),
        };
        self.send(Method::POST, self.index_url(&["batch"]), Some(&body))
            .await?;
        tracing::debug!(
            index = %self.index_name,
            count = documents.len(),
            "saved objects"
        );
        Ok(())
    }

    async fn clear_objects(&self) -> Result<(), IndexError> {
        self.send::<()>(Method::POST, self.index_url(&["clear"]), None)
            .await
    }

    async fn delete_object(&self, object_id: &str) -> Result<(), IndexError> {
        self.send::<()>(Method::DELETE, self.index_url(&[object_id]), None)
            .await
    }

    async fn set_settings(&self, settings: &IndexSettings) -> Result<(), IndexError> {
        self.send(Method::PUT, self.index_url(&["settings"]), Some(settings))
            .await
    }
}
