use std::sync::Arc;

use reelpack_metadata::fetch::ExecutionContext;
use reelpack_metadata::resolve::Resolver;

use crate::config::ServerConfig;
use crate::fetcher::{Credentials, HostFetcher};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub http: reqwest::Client,
    pub credentials: Arc<Credentials>,
    pub network_domains: Arc<[String]>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(config.providers)),
            http: reqwest::Client::new(),
            credentials: Arc::new(config.credentials),
            network_domains: config.network_domains.into(),
        }
    }

    /// A fresh context with its own token for one formula or autocomplete call.
    pub fn invocation(&self) -> ExecutionContext {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let fetcher = HostFetcher::new(
            self.http.clone(),
            self.credentials.clone(),
            self.network_domains.clone(),
            token.clone(),
        );
        ExecutionContext::new(token, Arc::new(fetcher))
    }
}
