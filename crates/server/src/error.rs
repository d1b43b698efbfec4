use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reelpack_core::error::{ApiError, ErrorEnvelope};
use reelpack_core::types::EntityKind;
use reelpack_metadata::MetadataError;
use tracing::error;

/// An `ApiError` plus the entity kind the request was about, if any.
pub struct AppError {
    pub error: ApiError,
    pub kind: Option<EntityKind>,
}

const GENERIC_FAILURE: &str = "Lookup failed, please try again later";

/// User-visible failures pass through verbatim; everything else is logged
/// and replaced with a generic message.
fn api_error(e: MetadataError) -> ApiError {
    match e {
        MetadataError::NotFound(_) => ApiError::NotFound(e.to_string()),
        MetadataError::UserVisible(message) => ApiError::BadRequest(message),
        MetadataError::Network(_) | MetadataError::Provider(_) => {
            error!(error = %e, "lookup failed");
            ApiError::Upstream(GENERIC_FAILURE.into())
        }
    }
}

impl AppError {
    pub fn lookup(kind: EntityKind, e: MetadataError) -> Self {
        Self {
            error: api_error(e),
            kind: Some(kind),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut envelope = ErrorEnvelope::from(&self.error);
        if let Some(kind) = self.kind {
            envelope = envelope.with_detail("kind", kind.as_str());
        }
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        Self { error, kind: None }
    }
}

impl From<MetadataError> for AppError {
    fn from(e: MetadataError) -> Self {
        Self::from(api_error(e))
    }
}
