//! Claim API handlers: start and token verification

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::claims::{StartClaimRequest, StartClaimResponse};
use crate::error::{ApiError, ApiResult};
use crate::reports::ReportView;
use crate::state::AppState;

/// Start a claim against a listing. The claimant proves control of the
/// submitted email address by following the emailed link.
pub async fn start_claim(
    State(app_state): State<AppState>,
    Json(request): Json<StartClaimRequest>,
) -> ApiResult<Json<StartClaimResponse>> {
    request.validate()?;

    app_state.claim_service.start_claim(request).await?;

    Ok(Json(StartClaimResponse {
        detail: "Verification email sent. Please check your inbox.".to_string(),
    }))
}

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Exchange an emailed token for the full record. The counterparty's
/// contact block is attached only once a payment has unlocked it.
pub async fn verify_claim(
    State(app_state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<ReportView>> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing token.".to_string()))?;

    let view = app_state.claim_service.verify_claim(token).await?;

    Ok(Json(view))
}
