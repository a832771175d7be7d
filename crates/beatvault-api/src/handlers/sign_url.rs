use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use beatvault_core::models::signed_url::{SignUrlRequest, SignUrlResponse};
use std::sync::Arc;

/// Resolve a stored object key to a time-limited download URL.
///
/// Missing or empty keys are rejected before any signing happens. A request without a
/// JSON body carries no key either.
#[tracing::instrument(skip(state, payload), fields(key, operation = "sign_url"))]
pub async fn sign_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignUrlRequest>, JsonRejection>,
) -> Result<Json<SignUrlResponse>, HttpAppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => SignUrlRequest::default(),
        Err(rejection) => return Err(HttpAppError::from(rejection)),
    };
    tracing::Span::current().record("key", tracing::field::debug(&request.key));

    let signed = state.broker.issue_read_url(request.key.as_deref()).await?;

    Ok(Json(SignUrlResponse {
        download_url: signed.url,
    }))
}
