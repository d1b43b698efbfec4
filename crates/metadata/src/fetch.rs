use std::sync::Arc;

use crate::MetadataError;

/// Name under which the host stores the IMDb-API key.
pub const IMDB_API_KEY_PARAM: &str = "imdbApiKey";
/// Name under which the host stores the TMDB key.
pub const TMDB_API_KEY_PARAM: &str = "tmdbApiKey";

/// Transport supplied by the host. One call is one GET; no retries.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, MetadataError>;
}

/// Per-invocation context handed in by the host.
///
/// Credentials never pass through this layer: URLs carry a
/// `{{param-token}}` placeholder that the host swaps for the secret
/// before the request leaves the process.
#[derive(Clone)]
pub struct ExecutionContext {
    invocation_token: String,
    fetcher: Arc<dyn Fetcher>,
}

impl ExecutionContext {
    pub fn new(invocation_token: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            invocation_token: invocation_token.into(),
            fetcher,
        }
    }

    pub fn invocation_token(&self) -> &str {
        &self.invocation_token
    }

    pub fn credential_placeholder(&self, param: &str) -> String {
        credential_placeholder(param, &self.invocation_token)
    }

    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, MetadataError> {
        self.fetcher.get_json(url).await
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("invocation_token", &self.invocation_token)
            .finish_non_exhaustive()
    }
}

pub fn credential_placeholder(param: &str, invocation_token: &str) -> String {
    format!("{{{{{param}-{invocation_token}}}}}")
}
