//! TMDB (The Movie Database) client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use tracing::debug;

use crate::MetadataError;
use crate::fetch::{ExecutionContext, TMDB_API_KEY_PARAM};

/// TMDB media namespace for title-scoped endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbMedia {
    Movie,
    Tv,
}

impl TmdbMedia {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TmdbApi {
    base_url: String,
}

impl TmdbApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// `{base}/{endpoint}[/{id}][/{sub_endpoint}]?{params}&api_key={key}`
    pub fn url(
        &self,
        ctx: &ExecutionContext,
        endpoint: &str,
        id: Option<&str>,
        sub_endpoint: Option<&str>,
        params: &[(&str, &str)],
    ) -> String {
        let mut url = format!("{}/{endpoint}", self.base_url.trim_end_matches('/'));
        if let Some(id) = id {
            url.push('/');
            url.push_str(id);
        }
        if let Some(sub) = sub_endpoint {
            url.push('/');
            url.push_str(sub);
        }

        url.push('?');
        for (key, value) in params {
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            url.push('&');
        }
        url.push_str("api_key=");
        url.push_str(&ctx.credential_placeholder(TMDB_API_KEY_PARAM));
        url
    }

    pub async fn fetch(
        &self,
        ctx: &ExecutionContext,
        endpoint: &str,
        id: Option<&str>,
        sub_endpoint: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, MetadataError> {
        let url = self.url(ctx, endpoint, id, sub_endpoint, params);
        debug!(url = %url, "TMDB request");
        ctx.get_json(&url).await
    }

    /// Cross-reference an IMDb id. The body holds `movie_results`,
    /// `tv_results` and `person_results`, any of which may be empty.
    pub async fn find_by_imdb_id(
        &self,
        ctx: &ExecutionContext,
        imdb_id: &str,
    ) -> Result<serde_json::Value, MetadataError> {
        self.fetch(
            ctx,
            "find",
            Some(imdb_id),
            None,
            &[("external_source", "imdb_id")],
        )
        .await
    }

    pub async fn watch_providers(
        &self,
        ctx: &ExecutionContext,
        media: TmdbMedia,
        tmdb_id: i64,
    ) -> Result<serde_json::Value, MetadataError> {
        let id = tmdb_id.to_string();
        self.fetch(ctx, media.as_str(), Some(&id), Some("watch/providers"), &[])
            .await
    }

    pub async fn tv_details(
        &self,
        ctx: &ExecutionContext,
        tmdb_id: i64,
    ) -> Result<serde_json::Value, MetadataError> {
        let id = tmdb_id.to_string();
        self.fetch(ctx, TmdbMedia::Tv.as_str(), Some(&id), None, &[])
            .await
    }

    /// Countries TMDB has watch-provider data for.
    pub async fn watch_provider_regions(
        &self,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, MetadataError> {
        self.fetch(ctx, "watch/providers/regions", None, None, &[])
            .await
    }
}
