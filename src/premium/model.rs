//! Premium upgrade request/response shapes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request DTO for upgrading a lost listing to premium
#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub lost_doc_id: i64,
    pub verification_input: String,
    pub phone_number: String,
}

impl UpgradeRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.verification_input.trim().is_empty() || self.phone_number.trim().is_empty() {
            return Err("Please fill in all fields".to_string());
        }
        Ok(())
    }
}

/// Response DTO for an accepted upgrade charge
#[derive(Debug, Serialize, Deserialize)]
pub struct UpgradeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<Uuid>,
}
