//! Claim form state
//!
//! Requires an email before any request fires, blocks double submission
//! while a request is in flight, and resets its fields only on success so
//! a failed attempt can be corrected in place.

use crate::client::api::StartClaimPayload;
use crate::reports::ReportKind;

pub const CLAIM_FAILED_MESSAGE: &str = "Failed to start your claim. Please try again.";
pub const CLAIM_STARTED_MESSAGE: &str = "Verification email sent. Please check your inbox.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimFormStatus {
    Idle,
    InFlight,
    Succeeded(String),
    Failed(String),
}

/// Claim form for one listing
pub struct ClaimForm {
    report_kind: ReportKind,
    report_id: i64,
    contact_email: String,
    contact_phone: String,
    document_number: String,
    status: ClaimFormStatus,
}

impl ClaimForm {
    pub fn new(report_kind: ReportKind, report_id: i64) -> Self {
        Self {
            report_kind,
            report_id,
            contact_email: String::new(),
            contact_phone: String::new(),
            document_number: String::new(),
            status: ClaimFormStatus::Idle,
        }
    }

    pub fn set_contact_email(&mut self, email: &str) {
        self.contact_email = email.to_string();
    }

    pub fn set_contact_phone(&mut self, phone: &str) {
        self.contact_phone = phone.to_string();
    }

    pub fn set_document_number(&mut self, number: &str) {
        self.document_number = number.to_string();
    }

    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    pub fn contact_phone(&self) -> &str {
        &self.contact_phone
    }

    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    pub fn status(&self) -> &ClaimFormStatus {
        &self.status
    }

    pub fn in_flight(&self) -> bool {
        self.status == ClaimFormStatus::InFlight
    }

    /// Build the request payload and mark the form in flight. Returns None
    /// (and sends nothing) without an email, or while a prior submission
    /// is still pending. Blank optional fields are dropped from the
    /// payload rather than sent as empty strings.
    pub fn submit(&mut self) -> Option<StartClaimPayload> {
        if self.in_flight() {
            return None;
        }

        let email = self.contact_email.trim();
        if email.is_empty() {
            return None;
        }

        let payload = StartClaimPayload {
            report_type: self.report_kind.as_str().to_string(),
            report_id: self.report_id,
            contact_email: email.to_string(),
            contact_phone: non_blank(&self.contact_phone),
            document_number: non_blank(&self.document_number),
        };

        self.status = ClaimFormStatus::InFlight;
        Some(payload)
    }

    /// The claim started; reset the form so a fresh claim carries nothing
    /// over from this one.
    pub fn on_success(&mut self) {
        self.contact_email.clear();
        self.contact_phone.clear();
        self.document_number.clear();
        self.status = ClaimFormStatus::Succeeded(CLAIM_STARTED_MESSAGE.to_string());
    }

    /// The claim failed; keep the fields for correction and show the
    /// backend's message when it sent one.
    pub fn on_failure(&mut self, detail: Option<String>) {
        self.status =
            ClaimFormStatus::Failed(detail.unwrap_or_else(|| CLAIM_FAILED_MESSAGE.to_string()));
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
