//! Startup configuration, read once from the environment.

use reelpack_metadata::ProviderConfig;
use reelpack_metadata::pack::MANIFEST;
use thiserror::Error;

use crate::fetcher::Credentials;

pub const DEFAULT_BIND: &str = "0.0.0.0:8097";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub credentials: Credentials,
    pub providers: ProviderConfig,
    /// Hosts the transport may reach. Subdomains are allowed too.
    pub network_domains: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let credentials = Credentials {
            imdb_api_key: require("REELPACK_IMDB_API_KEY")?,
            tmdb_api_key: require("REELPACK_TMDB_API_KEY")?,
        };

        let defaults = ProviderConfig::default();
        let providers = ProviderConfig {
            imdb_base_url: get("REELPACK_IMDB_BASE_URL").unwrap_or(defaults.imdb_base_url),
            tmdb_base_url: get("REELPACK_TMDB_BASE_URL").unwrap_or(defaults.tmdb_base_url),
            tmdb_image_base_url: get("REELPACK_TMDB_IMAGE_BASE_URL")
                .unwrap_or(defaults.tmdb_image_base_url),
            imdb_site_url: defaults.imdb_site_url,
            default_country: get("REELPACK_DEFAULT_COUNTRY")
                .map(|c| c.trim().to_ascii_uppercase())
                .unwrap_or(defaults.default_country),
        };

        let network_domains = match get("REELPACK_NETWORK_DOMAINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect(),
            None => MANIFEST
                .network_domains
                .iter()
                .map(|d| d.to_string())
                .collect(),
        };

        Ok(Self {
            bind_addr: get("REELPACK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            credentials,
            providers,
            network_domains,
        })
    }
}
