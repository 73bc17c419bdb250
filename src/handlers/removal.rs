//! Removal API handlers: verification-gated, email-confirmed takedowns

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::claims::TokenQuery;
use crate::error::{ApiError, ApiResult};
use crate::removal::{RemovalConfirmResponse, RemovalRequest, RemovalRequestResponse};
use crate::reports::ReportKind;
use crate::state::AppState;

/// Request removal of a listing. Nothing changes until the emailed
/// confirmation link is visited.
pub async fn request_removal(
    State(app_state): State<AppState>,
    Path((report_type, id)): Path<(String, i64)>,
    Json(request): Json<RemovalRequest>,
) -> ApiResult<Json<RemovalRequestResponse>> {
    let kind = ReportKind::parse(&report_type)
        .ok_or_else(|| ApiError::BadRequest("Invalid report type.".to_string()))?;

    app_state.removal_service.request_removal(kind, id, request).await?;

    Ok(Json(RemovalRequestResponse { success: true }))
}

/// Confirm a removal via the emailed token. The token is single-use, so
/// replaying the link reports an invalid token instead of removing twice.
pub async fn confirm_removal(
    State(app_state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<RemovalConfirmResponse>> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing token.".to_string()))?;

    let response = app_state.removal_service.confirm_removal(token).await?;

    Ok(Json(response))
}
