//! Claim models and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::reports::ReportKind;

/// An emailed, time-boxed claim verification token
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct VerificationToken {
    pub token: Uuid,
    pub kind: ReportKind,
    pub report_id: i64,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Request DTO for starting a claim
#[derive(Debug, Deserialize, Validate)]
pub struct StartClaimRequest {
    pub report_type: String,
    pub report_id: i64,
    #[validate(email(message = "A valid email address is required."))]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    /// Optional hint; when present it must match the record
    #[serde(default)]
    pub document_number: Option<String>,
}

/// Acknowledgment for a started claim
#[derive(Debug, Serialize, Deserialize)]
pub struct StartClaimResponse {
    pub detail: String,
}
