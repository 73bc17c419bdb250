//! Premium upgrade API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::payments::PaymentStatusResponse;
use crate::premium::{UpgradeRequest, UpgradeResponse};
use crate::state::AppState;

/// Verify ownership of a lost listing and start the premium charge
pub async fn upgrade_premium(
    State(app_state): State<AppState>,
    Json(request): Json<UpgradeRequest>,
) -> ApiResult<Json<UpgradeResponse>> {
    let payment = app_state.premium_service.upgrade(request).await?;

    Ok(Json(UpgradeResponse {
        success: true,
        payment_id: Some(payment.id),
    }))
}

/// Poll a premium charge. The first successful poll also activates the
/// listing boost; the response shape matches the contact-unlock polls.
pub async fn premium_status(
    State(app_state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let status = app_state.payment_service.check_status(payment_id).await?;
    Ok(Json(status))
}
