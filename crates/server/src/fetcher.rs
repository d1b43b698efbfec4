//! The host side of the `Fetcher` seam: credential substitution, the
//! network-domain allow-list and the actual HTTP GET.

use std::sync::Arc;

use async_trait::async_trait;
use reelpack_metadata::MetadataError;
use reelpack_metadata::fetch::{
    Fetcher, IMDB_API_KEY_PARAM, TMDB_API_KEY_PARAM, credential_placeholder,
};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

/// System-wide API keys. Never logged.
#[derive(Clone)]
pub struct Credentials {
    pub imdb_api_key: String,
    pub tmdb_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("imdb_api_key", &"[redacted]")
            .field("tmdb_api_key", &"[redacted]")
            .finish()
    }
}

impl Credentials {
    /// Replace the placeholders minted for `invocation_token` with the
    /// percent-encoded secrets. Placeholders for other tokens are left alone.
    pub fn substitute(&self, url: &str, invocation_token: &str) -> String {
        let mut resolved = url.to_string();
        for (param, secret) in [
            (IMDB_API_KEY_PARAM, &self.imdb_api_key),
            (TMDB_API_KEY_PARAM, &self.tmdb_api_key),
        ] {
            let placeholder = credential_placeholder(param, invocation_token);
            resolved = resolved.replace(&placeholder, &urlencoding::encode(secret));
        }
        resolved
    }
}

/// Whether `host` is one of `domains` or a subdomain of one.
pub fn domain_allowed(domains: &[String], host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}

/// Transport for a single invocation.
pub struct HostFetcher {
    client: reqwest::Client,
    credentials: Arc<Credentials>,
    network_domains: Arc<[String]>,
    invocation_token: String,
}

impl HostFetcher {
    pub fn new(
        client: reqwest::Client,
        credentials: Arc<Credentials>,
        network_domains: Arc<[String]>,
        invocation_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            network_domains,
            invocation_token: invocation_token.into(),
        }
    }

    /// Substitute credentials and check the destination. The returned URL
    /// carries secrets and must not be logged.
    fn prepare(&self, url: &str) -> Result<Url, MetadataError> {
        let resolved = self.credentials.substitute(url, &self.invocation_token);
        if resolved.contains("{{") {
            return Err(MetadataError::Provider(format!(
                "unresolved credential placeholder in {url}"
            )));
        }

        let parsed = Url::parse(&resolved)
            .map_err(|e| MetadataError::Provider(format!("invalid upstream url {url}: {e}")))?;
        let host = parsed.host_str().unwrap_or_default();
        if !domain_allowed(&self.network_domains, host) {
            warn!(host, "blocked request to undeclared host");
            return Err(MetadataError::Provider(format!(
                "{host} is not a declared network domain"
            )));
        }
        Ok(parsed)
    }
}

#[async_trait]
impl Fetcher for HostFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, MetadataError> {
        let target = self.prepare(url)?;
        debug!(url, "upstream GET");

        // Error messages from reqwest embed the URL; strip it so the key stays out.
        let resp = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MetadataError::Provider(format!(
                "upstream returned HTTP {status} for {url}"
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| MetadataError::Provider(format!("invalid JSON from {url}: {}", e.without_url())))
    }
}
