//! Removal models and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reports::ReportKind;

/// Why a reporter wants a listing taken down
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "removal_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalReason {
    Found,
    NoLongerNeeded,
    Duplicate,
}

/// An emailed, single-use removal confirmation token
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct RemovalToken {
    pub token: Uuid,
    pub kind: ReportKind,
    pub report_id: i64,
    pub reason: RemovalReason,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RemovalToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Request DTO for starting a removal
#[derive(Debug, Deserialize)]
pub struct RemovalRequest {
    pub verification_input: String,
    pub reason: RemovalReason,
}

/// Acknowledgment for a requested removal
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovalRequestResponse {
    pub success: bool,
}

/// Confirmation payload naming the removed listing
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovalConfirmResponse {
    pub document_name: String,
}
