//! Lookup resolvers: query in, normalized result out.
//!
//! Two phases. Resolving the IMDb id (skipped when the query already is
//! one) and enriching it with detail from both upstreams. The detail and
//! cross-reference requests run concurrently and must both succeed; what
//! TMDB does not know about simply stays empty.

use std::sync::LazyLock;

use regex::Regex;
use reelpack_core::types::{EntityKind, Movie, Person, Series};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::fetch::ExecutionContext;
use crate::imdb::{ImdbApi, ImdbEndpoint};
use crate::normalize::{
    self, FieldExt, PersonSources, TitleSources, WatchAvailability,
};
use crate::tmdb::{TmdbApi, TmdbMedia};
use crate::{MetadataError, ProviderConfig};

static TITLE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^tt\d+$").unwrap());
static PERSON_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^nm\d+$").unwrap());

/// Whether `query` already is an IMDb id for `kind`.
pub fn is_canonical_id(kind: EntityKind, query: &str) -> bool {
    match kind {
        EntityKind::Movie | EntityKind::Series => TITLE_ID_RE.is_match(query),
        EntityKind::Person => PERSON_ID_RE.is_match(query),
    }
}

fn search_endpoint(kind: EntityKind) -> ImdbEndpoint {
    match kind {
        EntityKind::Movie => ImdbEndpoint::SearchMovie,
        EntityKind::Series => ImdbEndpoint::SearchSeries,
        EntityKind::Person => ImdbEndpoint::SearchName,
    }
}

// Bucket of a TMDB `find` response holding matches of this kind.
fn find_bucket(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Movie => "movie_results",
        EntityKind::Series => "tv_results",
        EntityKind::Person => "person_results",
    }
}

/// An IMDb id plus the search hit it came from, if a search was needed.
#[derive(Debug, Clone)]
pub struct ResolvedId {
    pub imdb_id: String,
    pub search_hit: Option<Value>,
}

pub struct Resolver {
    config: ProviderConfig,
    imdb: ImdbApi,
    tmdb: TmdbApi,
}

impl Resolver {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            imdb: ImdbApi::new(config.imdb_base_url.clone()),
            tmdb: TmdbApi::new(config.tmdb_base_url.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn tmdb(&self) -> &TmdbApi {
        &self.tmdb
    }

    /// Trimmed and upper-cased, or the configured default when blank.
    pub fn country_code(&self, country: Option<&str>) -> String {
        country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.config.default_country.as_str())
            .to_ascii_uppercase()
    }

    /// Turn a query into an IMDb id, searching only when the query is not
    /// already one. The first search hit wins.
    pub async fn resolve_id(
        &self,
        ctx: &ExecutionContext,
        kind: EntityKind,
        query: &str,
    ) -> Result<ResolvedId, MetadataError> {
        let query = query.trim();
        if is_canonical_id(kind, query) {
            debug!(%kind, imdb_id = query, "query is already an id, skipping search");
            return Ok(ResolvedId {
                imdb_id: query.to_string(),
                search_hit: None,
            });
        }

        let body = self
            .imdb
            .fetch(ctx, search_endpoint(kind), query, &[])
            .await?;
        if let Some(message) = body.text("errorMessage") {
            return Err(MetadataError::UserVisible(message.to_string()));
        }

        let hit = body
            .list("results")
            .first()
            .cloned()
            .ok_or(MetadataError::NotFound(kind))?;
        let imdb_id = hit
            .owned_text("id")
            .ok_or_else(|| MetadataError::Provider("IMDb-API search hit has no id".into()))?;

        info!(%kind, query, imdb_id = %imdb_id, "resolved search to id");
        Ok(ResolvedId {
            imdb_id,
            search_hit: Some(hit),
        })
    }

    /// Fetch the IMDb detail record and the TMDB cross-reference together.
    async fn detail_and_match(
        &self,
        ctx: &ExecutionContext,
        kind: EntityKind,
        imdb_id: &str,
    ) -> Result<(Value, Option<Value>), MetadataError> {
        let detail = async {
            match kind {
                EntityKind::Person => self.imdb.name(ctx, imdb_id).await,
                EntityKind::Movie | EntityKind::Series => self.imdb.title(ctx, imdb_id).await,
            }
        };
        let (detail, found) =
            tokio::try_join!(detail, self.tmdb.find_by_imdb_id(ctx, imdb_id))?;

        let matched = found.list(find_bucket(kind)).first().cloned();
        match &matched {
            Some(m) => debug!(%kind, imdb_id, tmdb_id = ?m.integer("id"), "TMDB match"),
            None => debug!(%kind, imdb_id, "no TMDB match"),
        }
        Ok((detail, matched))
    }

    fn availability(&self, body: &Value, country: &str, imdb_id: &str) -> WatchAvailability {
        if body.field("results").field(country).is_null() {
            warn!(imdb_id, country, "no watch providers for this country");
        }
        normalize::watch_availability(Some(body), country, &self.config)
    }

    pub async fn movie(
        &self,
        ctx: &ExecutionContext,
        query: &str,
        country: Option<&str>,
    ) -> Result<Movie, MetadataError> {
        let country = self.country_code(country);
        let resolved = self.resolve_id(ctx, EntityKind::Movie, query).await?;
        let (imdb, tmdb) = self
            .detail_and_match(ctx, EntityKind::Movie, &resolved.imdb_id)
            .await?;

        let watch = match tmdb.as_ref().integer("id") {
            Some(tmdb_id) => {
                let body = self
                    .tmdb
                    .watch_providers(ctx, TmdbMedia::Movie, tmdb_id)
                    .await?;
                self.availability(&body, &country, &resolved.imdb_id)
            }
            None => WatchAvailability::default(),
        };

        normalize::normalize_movie(
            TitleSources {
                imdb_id: &resolved.imdb_id,
                search_hit: resolved.search_hit.as_ref(),
                imdb: &imdb,
                tmdb: tmdb.as_ref(),
                tv_details: None,
            },
            watch,
            &self.config,
        )
    }

    pub async fn series(
        &self,
        ctx: &ExecutionContext,
        query: &str,
        country: Option<&str>,
    ) -> Result<Series, MetadataError> {
        let country = self.country_code(country);
        let resolved = self.resolve_id(ctx, EntityKind::Series, query).await?;
        let (imdb, tmdb) = self
            .detail_and_match(ctx, EntityKind::Series, &resolved.imdb_id)
            .await?;

        let (watch, tv_details) = match tmdb.as_ref().integer("id") {
            Some(tmdb_id) => {
                let (providers, details) = tokio::try_join!(
                    self.tmdb.watch_providers(ctx, TmdbMedia::Tv, tmdb_id),
                    self.tmdb.tv_details(ctx, tmdb_id),
                )?;
                (
                    self.availability(&providers, &country, &resolved.imdb_id),
                    Some(details),
                )
            }
            None => (WatchAvailability::default(), None),
        };

        normalize::normalize_series(
            TitleSources {
                imdb_id: &resolved.imdb_id,
                search_hit: resolved.search_hit.as_ref(),
                imdb: &imdb,
                tmdb: tmdb.as_ref(),
                tv_details: tv_details.as_ref(),
            },
            watch,
            &self.config,
        )
    }

    pub async fn person(
        &self,
        ctx: &ExecutionContext,
        query: &str,
    ) -> Result<Person, MetadataError> {
        let resolved = self.resolve_id(ctx, EntityKind::Person, query).await?;
        let (imdb, tmdb) = self
            .detail_and_match(ctx, EntityKind::Person, &resolved.imdb_id)
            .await?;

        normalize::normalize_person(
            PersonSources {
                imdb_id: &resolved.imdb_id,
                search_hit: resolved.search_hit.as_ref(),
                imdb: &imdb,
                tmdb: tmdb.as_ref(),
            },
            &self.config,
        )
    }
}
