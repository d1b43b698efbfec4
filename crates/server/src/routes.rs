use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use reelpack_core::error::ApiError;
use reelpack_core::schema::{ObjectSchema, schema_for};
use reelpack_core::types::{AutocompleteOption, EntityKind};
use reelpack_metadata::pack::{MANIFEST, PackManifest};
use reelpack_metadata::regions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        // Formulas
        .route("/formulas/movie", get(movie_formula))
        .route("/formulas/series", get(series_formula))
        .route("/formulas/person", get(person_formula))
        // Parameter autocomplete
        .route("/autocomplete/countries", get(country_autocomplete))
        // Registration
        .route("/schemas/{kind}", get(get_schema))
        .route("/pack", get(get_pack))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TitleQuery {
    query: String,
    country: Option<String>,
}

#[derive(Deserialize)]
struct PersonQuery {
    query: String,
}

fn require_query(query: &str) -> Result<(), AppError> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()).into());
    }
    Ok(())
}

/// Serialize a lookup result and check it against the declared schema.
fn conform<T: Serialize>(kind: EntityKind, result: &T) -> Result<Json<Value>, AppError> {
    let value = serde_json::to_value(result)
        .map_err(|e| ApiError::Internal(format!("failed to serialize {kind}: {e}")))?;
    if let Err(violation) = schema_for(kind).validate(&value) {
        error!(%kind, %violation, "result does not match its declared schema");
        return Err(AppError {
            error: ApiError::Internal(format!("{kind} result does not match its schema")),
            kind: Some(kind),
        });
    }
    Ok(Json(value))
}

async fn movie_formula(
    State(state): State<AppState>,
    Query(q): Query<TitleQuery>,
) -> Result<Json<Value>, AppError> {
    require_query(&q.query)?;
    let ctx = state.invocation();
    let movie = state
        .resolver
        .movie(&ctx, &q.query, q.country.as_deref())
        .await
        .map_err(|e| AppError::lookup(EntityKind::Movie, e))?;
    conform(EntityKind::Movie, &movie)
}

async fn series_formula(
    State(state): State<AppState>,
    Query(q): Query<TitleQuery>,
) -> Result<Json<Value>, AppError> {
    require_query(&q.query)?;
    let ctx = state.invocation();
    let series = state
        .resolver
        .series(&ctx, &q.query, q.country.as_deref())
        .await
        .map_err(|e| AppError::lookup(EntityKind::Series, e))?;
    conform(EntityKind::Series, &series)
}

async fn person_formula(
    State(state): State<AppState>,
    Query(q): Query<PersonQuery>,
) -> Result<Json<Value>, AppError> {
    require_query(&q.query)?;
    let ctx = state.invocation();
    let person = state
        .resolver
        .person(&ctx, &q.query)
        .await
        .map_err(|e| AppError::lookup(EntityKind::Person, e))?;
    conform(EntityKind::Person, &person)
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AutocompleteQuery {
    #[serde(default)]
    search: String,
}

async fn country_autocomplete(
    State(state): State<AppState>,
    Query(q): Query<AutocompleteQuery>,
) -> Result<Json<Vec<AutocompleteOption>>, AppError> {
    let ctx = state.invocation();
    let options = regions::country_options(state.resolver.tmdb(), &ctx, &q.search).await?;
    Ok(Json(options))
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

async fn get_schema(Path(kind): Path<String>) -> Result<Json<&'static ObjectSchema>, AppError> {
    let kind: EntityKind = kind
        .parse()
        .map_err(|_| ApiError::NotFound(format!("no schema named {kind}")))?;
    Ok(Json(schema_for(kind)))
}

async fn get_pack() -> Json<&'static PackManifest> {
    Json(&MANIFEST)
}
