//! Contact-form handler: relays messages to the support mailbox

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactMessageRequest {
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    pub category: String,
    pub subject: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ContactMessageResponse {
    pub success: bool,
}

pub async fn submit_contact(
    State(app_state): State<AppState>,
    Json(request): Json<ContactMessageRequest>,
) -> ApiResult<Json<ContactMessageResponse>> {
    request.validate()?;

    if request.message.trim().is_empty() {
        return Err(ApiError::ValidationError("A message is required.".to_string()));
    }

    app_state
        .mailer
        .send_contact_message(
            &request.email,
            &request.category,
            &request.subject,
            &request.message,
        )
        .await
        .map_err(|e| ApiError::ExternalServiceError(e.to_string()))?;

    tracing::info!(category = %request.category, "Contact message relayed");

    Ok(Json(ContactMessageResponse { success: true }))
}
