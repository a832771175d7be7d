use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use beatvault_core::models::signed_url::{SignUploadUrlRequest, SignUploadUrlResponse};
use beatvault_core::AppError;
use std::sync::Arc;

/// Issue a write URL for one slot of an upload session. The object key is derived here,
/// never taken from the caller.
#[tracing::instrument(
    skip(state, request),
    fields(
        owner_id = ?request.owner_id,
        session_id = %request.session_id,
        slot = %request.slot,
        operation = "sign_upload_url"
    )
)]
pub async fn sign_upload_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SignUploadUrlRequest>,
) -> Result<Json<SignUploadUrlResponse>, HttpAppError> {
    let owner_id = required(request.owner_id.as_deref(), "ownerId")?;
    let filename = required(request.filename.as_deref(), "filename")?;

    let signed = state
        .broker
        .issue_upload_url(owner_id, request.session_id, request.slot, filename)
        .await?;

    tracing::debug!(key = %signed.key, "Upload URL issued");

    Ok(Json(SignUploadUrlResponse {
        upload_url: signed.url,
        key: signed.key,
        expires_at: signed.expires_at,
    }))
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::InvalidInput(format!("{} is required", field))),
    }
}
