//! IMDb-API client.
//!
//! The key travels as a path segment rather than a query parameter:
//! `{base}/SearchMovie/{key}/incendies`.

use tracing::debug;

use crate::MetadataError;
use crate::fetch::{ExecutionContext, IMDB_API_KEY_PARAM};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImdbEndpoint {
    SearchMovie,
    SearchSeries,
    SearchName,
    Title,
    Name,
}

impl ImdbEndpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SearchMovie => "SearchMovie",
            Self::SearchSeries => "SearchSeries",
            Self::SearchName => "SearchName",
            Self::Title => "Title",
            Self::Name => "Name",
        }
    }
}

/// Extra sections requested alongside a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOption {
    Ratings,
    Trailer,
}

impl TitleOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ratings => "Ratings",
            Self::Trailer => "Trailer",
        }
    }
}

/// Percent-encode `raw` as one path segment. URL parsing resolves `.` and
/// `..` (encoded or not) against the preceding segments, so dot-only
/// queries are refused.
fn path_segment(raw: &str) -> Result<String, MetadataError> {
    if !raw.is_empty() && raw.chars().all(|c| c == '.') {
        return Err(MetadataError::UserVisible(format!(
            "\"{raw}\" is not a searchable query"
        )));
    }
    Ok(urlencoding::encode(raw).into_owned())
}

#[derive(Debug, Clone)]
pub struct ImdbApi {
    base_url: String,
}

impl ImdbApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn url(
        &self,
        ctx: &ExecutionContext,
        endpoint: ImdbEndpoint,
        query: &str,
        options: &[TitleOption],
    ) -> Result<String, MetadataError> {
        let mut url = format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.as_str(),
            ctx.credential_placeholder(IMDB_API_KEY_PARAM),
            path_segment(query)?,
        );
        if !options.is_empty() {
            let joined: Vec<&str> = options.iter().map(|o| o.as_str()).collect();
            url.push('/');
            url.push_str(&joined.join(","));
        }
        Ok(url)
    }

    pub async fn fetch(
        &self,
        ctx: &ExecutionContext,
        endpoint: ImdbEndpoint,
        query: &str,
        options: &[TitleOption],
    ) -> Result<serde_json::Value, MetadataError> {
        let url = self.url(ctx, endpoint, query, options)?;
        debug!(url = %url, "IMDb-API request");
        ctx.get_json(&url).await
    }

    pub async fn title(
        &self,
        ctx: &ExecutionContext,
        imdb_id: &str,
    ) -> Result<serde_json::Value, MetadataError> {
        self.fetch(
            ctx,
            ImdbEndpoint::Title,
            imdb_id,
            &[TitleOption::Ratings, TitleOption::Trailer],
        )
        .await
    }

    pub async fn name(
        &self,
        ctx: &ExecutionContext,
        imdb_id: &str,
    ) -> Result<serde_json::Value, MetadataError> {
        self.fetch(ctx, ImdbEndpoint::Name, imdb_id, &[]).await
    }
}
