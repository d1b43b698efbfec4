//! Movie, series and people lookups backed by IMDb-API and TMDB.
//!
//! Each lookup resolves an IMDb id (searching only when the query is not
//! already an id), fetches detail from IMDb-API while cross-referencing the
//! id on TMDB, and merges both into one of the result shapes declared in
//! [`reelpack_core::schema`].

pub mod fetch;
pub mod imdb;
pub mod normalize;
pub mod pack;
pub mod regions;
pub mod resolve;
pub mod tmdb;

use reelpack_core::types::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// Upstream explained what went wrong; shown to the user verbatim.
    #[error("{0}")]
    UserVisible(String),
    #[error("Couldn't find a {kind} with that {noun}", kind = .0, noun = .0.query_noun())]
    NotFound(EntityKind),
    #[error("network error: {0}")]
    Network(String),
    #[error("provider error: {0}")]
    Provider(String),
}

impl MetadataError {
    /// Whether the message is meant for the end user rather than the logs.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::UserVisible(_) | Self::NotFound(_))
    }
}

/// Upstream locations, injected into the resolver at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub imdb_base_url: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub imdb_site_url: String,
    /// Country used for watch providers when the caller gives none.
    pub default_country: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            imdb_base_url: "https://imdb-api.com/en/API".to_string(),
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/w780".to_string(),
            imdb_site_url: "https://imdb.com".to_string(),
            default_country: "US".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn imdb_title_link(&self, id: &str) -> String {
        format!("{}/title/{id}", self.imdb_site_url.trim_end_matches('/'))
    }

    pub fn imdb_name_link(&self, id: &str) -> String {
        format!("{}/name/{id}", self.imdb_site_url.trim_end_matches('/'))
    }

    pub fn tmdb_image(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.tmdb_image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_kind() {
        assert_eq!(
            MetadataError::NotFound(EntityKind::Movie).to_string(),
            "Couldn't find a movie with that title"
        );
        assert_eq!(
            MetadataError::NotFound(EntityKind::Person).to_string(),
            "Couldn't find a person with that name"
        );
    }

    #[test]
    fn only_search_failures_are_user_visible() {
        assert!(MetadataError::UserVisible("Invalid API Key".into()).is_user_visible());
        assert!(MetadataError::NotFound(EntityKind::Series).is_user_visible());
        assert!(!MetadataError::Network("reset".into()).is_user_visible());
        assert!(!MetadataError::Provider("HTTP 500".into()).is_user_visible());
    }

    #[test]
    fn links_tolerate_trailing_slashes() {
        let config = ProviderConfig {
            imdb_site_url: "https://imdb.com/".into(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/w780/".into(),
            ..Default::default()
        };
        assert_eq!(config.imdb_title_link("tt1255953"), "https://imdb.com/title/tt1255953");
        assert_eq!(config.imdb_name_link("nm0898288"), "https://imdb.com/name/nm0898288");
        assert_eq!(
            config.tmdb_image("/backdrop.jpg"),
            "https://image.tmdb.org/t/p/w780/backdrop.jpg"
        );
    }
}
