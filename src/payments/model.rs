//! Payment models and the status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One mobile-money charge attempt
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub momo_reference_id: String,
    pub phone_number: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment lifecycle status. Transitions are monotonic: once terminal,
/// a payment never changes again.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
}

/// Result of one poll against the payment provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomoPollOutcome {
    Pending,
    Successful,
    Failed,
}

impl PaymentStatus {
    /// Apply a provider poll result. Terminal states absorb everything.
    pub fn apply(self, poll: MomoPollOutcome) -> PaymentStatus {
        match self {
            PaymentStatus::Successful | PaymentStatus::Failed => self,
            PaymentStatus::Pending => match poll {
                MomoPollOutcome::Pending => PaymentStatus::Pending,
                MomoPollOutcome::Successful => PaymentStatus::Successful,
                MomoPollOutcome::Failed => PaymentStatus::Failed,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn paid(&self) -> bool {
        matches!(self, PaymentStatus::Successful)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Successful => "SUCCESSFUL",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

/// Request DTO for a contact-unlock charge
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub phone_number: String,
    pub report_type: String,
    pub report_id: i64,
    pub user_email: String,
}

impl PaymentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.phone_number.trim().is_empty() {
            return Err("Phone number is required.".to_string());
        }
        Ok(())
    }
}

/// Response DTO for charge creation
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRequestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<Uuid>,
}

/// Response DTO for status polls
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub paid: bool,
    pub status: String,
}

impl From<PaymentStatus> for PaymentStatusResponse {
    fn from(status: PaymentStatus) -> Self {
        PaymentStatusResponse {
            paid: status.paid(),
            status: status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert_eq!(
            PaymentStatus::Pending.apply(MomoPollOutcome::Pending),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::Pending.apply(MomoPollOutcome::Successful),
            PaymentStatus::Successful
        );
        assert_eq!(
            PaymentStatus::Pending.apply(MomoPollOutcome::Failed),
            PaymentStatus::Failed
        );
    }

    #[test]
    fn test_terminal_states_absorb() {
        for poll in [
            MomoPollOutcome::Pending,
            MomoPollOutcome::Successful,
            MomoPollOutcome::Failed,
        ] {
            assert_eq!(
                PaymentStatus::Successful.apply(poll),
                PaymentStatus::Successful
            );
            assert_eq!(PaymentStatus::Failed.apply(poll), PaymentStatus::Failed);
        }
    }

    #[test]
    fn test_status_response_shape() {
        let response = PaymentStatusResponse::from(PaymentStatus::Successful);
        assert!(response.paid);
        assert_eq!(response.status, "SUCCESSFUL");

        let response = PaymentStatusResponse::from(PaymentStatus::Failed);
        assert!(!response.paid);
        assert_eq!(response.status, "FAILED");

        let response = PaymentStatusResponse::from(PaymentStatus::Pending);
        assert!(!response.paid);
        assert_eq!(response.status, "PENDING");
    }
}
