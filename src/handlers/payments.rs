//! Payment API handlers: contact-unlock charges and status polls

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::payments::{PaymentRequest, PaymentRequestResponse, PaymentStatusResponse};
use crate::state::AppState;

/// Request a mobile-money charge that unlocks a report's contact block
pub async fn request_payment(
    State(app_state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<Json<PaymentRequestResponse>> {
    let payment = app_state.payment_service.request_contact_unlock(request).await?;

    Ok(Json(PaymentRequestResponse {
        success: true,
        payment_id: Some(payment.id),
    }))
}

/// Poll a payment's settlement status
pub async fn payment_status(
    State(app_state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let status = app_state.payment_service.check_status(payment_id).await?;
    Ok(Json(status))
}
