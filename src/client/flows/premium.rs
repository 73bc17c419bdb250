//! Premium upgrade flow
//!
//! `Verification → Processing → {Success | Failed}`, with manual retry
//! from Failed that clears both fields. The processing phase polls the
//! premium status endpoint with the same cadence and deadline as the
//! contact-unlock flow.

use std::time::Instant;
use uuid::Uuid;

use super::{PAYMENT_DEADLINE, POLL_INTERVAL};

pub const FILL_ALL_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const UPGRADE_FAILED_MESSAGE: &str = "Upgrade failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumFlowState {
    Verification,
    Processing,
    Success,
    Failed,
}

struct Processing {
    payment_id: Uuid,
    next_poll_at: Instant,
    deadline: Instant,
}

/// Premium upgrade flow for one lost listing
pub struct PremiumFlow {
    verification_input: String,
    phone_number: String,
    state: PremiumFlowState,
    processing: Option<Processing>,
    error: Option<String>,
}

impl Default for PremiumFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PremiumFlow {
    pub fn new() -> Self {
        Self {
            verification_input: String::new(),
            phone_number: String::new(),
            state: PremiumFlowState::Verification,
            processing: None,
            error: None,
        }
    }

    pub fn state(&self) -> PremiumFlowState {
        self.state
    }

    pub fn set_verification_input(&mut self, input: &str) {
        self.verification_input = input.to_string();
    }

    pub fn set_phone_number(&mut self, phone: &str) {
        self.phone_number = phone.to_string();
    }

    pub fn verification_input(&self) -> &str {
        &self.verification_input
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The (verification_input, phone_number) pair to submit. Both fields
    /// are required before any request leaves the client.
    pub fn submission(&mut self) -> Option<(String, String)> {
        if self.state != PremiumFlowState::Verification {
            return None;
        }
        let input = self.verification_input.trim();
        let phone = self.phone_number.trim();
        if input.is_empty() || phone.is_empty() {
            self.error = Some(FILL_ALL_FIELDS_MESSAGE.to_string());
            return None;
        }
        self.error = None;
        Some((input.to_string(), phone.to_string()))
    }

    /// The upgrade charge was accepted; start polling
    pub fn on_request_accepted(&mut self, payment_id: Uuid, now: Instant) {
        self.state = PremiumFlowState::Processing;
        self.error = None;
        self.processing = Some(Processing {
            payment_id,
            next_poll_at: now + POLL_INTERVAL,
            deadline: now + PAYMENT_DEADLINE,
        });
    }

    /// The upgrade was rejected; the backend's message is shown when it
    /// sent one.
    pub fn on_request_failed(&mut self, detail: Option<String>) {
        self.state = PremiumFlowState::Failed;
        self.processing = None;
        self.error = Some(detail.unwrap_or_else(|| UPGRADE_FAILED_MESSAGE.to_string()));
    }

    /// The payment id to poll, when a poll is due
    pub fn poll_due(&self, now: Instant) -> Option<Uuid> {
        let processing = self.processing.as_ref()?;
        if self.state != PremiumFlowState::Processing || now < processing.next_poll_at {
            return None;
        }
        Some(processing.payment_id)
    }

    /// Apply one status poll result. Returns true exactly when this poll
    /// confirmed the upgrade; the caller then refreshes the listing.
    pub fn on_status(&mut self, paid: bool, status: &str, now: Instant) -> bool {
        if self.state != PremiumFlowState::Processing {
            return false;
        }

        if paid {
            self.state = PremiumFlowState::Success;
            self.processing = None;
            return true;
        }

        if status == "FAILED" {
            self.on_request_failed(None);
            return false;
        }

        if let Some(processing) = self.processing.as_mut() {
            processing.next_poll_at = now + POLL_INTERVAL;
        }
        false
    }

    /// A thrown status poll fails the flow
    pub fn on_poll_error(&mut self) {
        if self.state == PremiumFlowState::Processing {
            self.on_request_failed(None);
        }
    }

    /// Advance time: processing past the deadline fails
    pub fn tick(&mut self, now: Instant) {
        if self.state != PremiumFlowState::Processing {
            return;
        }
        if let Some(processing) = &self.processing {
            if now >= processing.deadline {
                self.on_request_failed(None);
            }
        }
    }

    /// Manual retry, clearing both inputs
    pub fn retry(&mut self) {
        if self.state == PremiumFlowState::Failed {
            self.state = PremiumFlowState::Verification;
            self.verification_input.clear();
            self.phone_number.clear();
            self.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_both_fields_required() {
        let mut flow = PremiumFlow::new();
        assert!(flow.submission().is_none());
        assert_eq!(flow.error(), Some(FILL_ALL_FIELDS_MESSAGE));

        flow.set_verification_input("Jean Bosco");
        assert!(flow.submission().is_none());

        flow.set_phone_number("250788123456");
        assert_eq!(
            flow.submission(),
            Some(("Jean Bosco".to_string(), "250788123456".to_string()))
        );
        assert!(flow.error().is_none());
    }

    #[test]
    fn test_processing_then_paid() {
        let t0 = Instant::now();
        let mut flow = PremiumFlow::new();
        flow.set_verification_input("Jean Bosco");
        flow.set_phone_number("250788123456");
        flow.submission().unwrap();

        let payment_id = Uuid::new_v4();
        flow.on_request_accepted(payment_id, t0);
        assert_eq!(flow.state(), PremiumFlowState::Processing);

        let t1 = t0 + Duration::from_millis(3000);
        assert_eq!(flow.poll_due(t1), Some(payment_id));
        assert!(!flow.on_status(false, "PENDING", t1));

        let t2 = t1 + Duration::from_millis(3000);
        assert!(flow.on_status(true, "SUCCESSFUL", t2));
        assert_eq!(flow.state(), PremiumFlowState::Success);
        assert!(flow.poll_due(t2 + Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_backend_message_surfaces_on_rejection() {
        let mut flow = PremiumFlow::new();
        flow.on_request_failed(Some("Verification failed.".to_string()));
        assert_eq!(flow.state(), PremiumFlowState::Failed);
        assert_eq!(flow.error(), Some("Verification failed."));

        let mut flow = PremiumFlow::new();
        flow.on_request_failed(None);
        assert_eq!(flow.error(), Some(UPGRADE_FAILED_MESSAGE));
    }

    #[test]
    fn test_retry_clears_both_fields() {
        let t0 = Instant::now();
        let mut flow = PremiumFlow::new();
        flow.set_verification_input("Jean Bosco");
        flow.set_phone_number("250788123456");
        flow.on_request_accepted(Uuid::new_v4(), t0);
        flow.on_poll_error();
        assert_eq!(flow.state(), PremiumFlowState::Failed);

        flow.retry();
        assert_eq!(flow.state(), PremiumFlowState::Verification);
        assert_eq!(flow.verification_input(), "");
        assert_eq!(flow.phone_number(), "");
    }

    #[test]
    fn test_deadline_fails_processing() {
        let t0 = Instant::now();
        let mut flow = PremiumFlow::new();
        flow.on_request_accepted(Uuid::new_v4(), t0);

        flow.tick(t0 + Duration::from_secs(299));
        assert_eq!(flow.state(), PremiumFlowState::Processing);

        flow.tick(t0 + Duration::from_secs(300));
        assert_eq!(flow.state(), PremiumFlowState::Failed);
    }
}
