//! Masked-to-revealed window for ownership verification
//!
//! A successful check swaps the masked record for the unmasked one for a
//! fixed window, then reverts. The unmasked record lives only in this flow
//! while the window is open; it is never written anywhere longer-lived.

use std::time::Instant;

use super::REVEAL_WINDOW;
use crate::reports::ReportView;

/// Fixed failure message. Never replaced by backend error text, so a failed
/// guess can't leak which field was wrong.
pub const VERIFY_FAILED_MESSAGE: &str =
    "Verification failed. Please check your input and try again.";

struct Revealed {
    document: ReportView,
    deadline: Instant,
}

/// Reveal flow for one listing card
pub struct RevealFlow {
    input: String,
    revealed: Option<Revealed>,
    error: Option<&'static str>,
}

impl Default for RevealFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealFlow {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            revealed: None,
            error: None,
        }
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
        self.error = None;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The guess to submit: trimmed, but otherwise unrestricted. An empty
    /// guess is legal and simply never matches.
    pub fn submission(&self) -> String {
        self.input.trim().to_string()
    }

    /// The unmasked record, while the window is open
    pub fn document(&self) -> Option<&ReportView> {
        self.revealed.as_ref().map(|r| &r.document)
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed.is_some()
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// A successful check opens the reveal window
    pub fn on_verified(&mut self, document: ReportView, now: Instant) {
        self.error = None;
        self.revealed = Some(Revealed {
            document,
            deadline: now + REVEAL_WINDOW,
        });
    }

    /// A failed check (mismatch or network error) shows the fixed message
    /// and keeps the input so the user can adjust and retry.
    pub fn on_failure(&mut self) {
        self.revealed = None;
        self.error = Some(VERIFY_FAILED_MESSAGE);
    }

    /// Advance time. At or past the deadline the flow reverts to masked
    /// and clears the input in the same step; there is no state where one
    /// has happened without the other.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.revealed {
            Some(revealed) if now >= revealed.deadline => {
                self.revealed = None;
                self.input.clear();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{DocumentType, ReportView};
    use chrono::Utc;
    use std::time::Duration;

    fn unmasked() -> ReportView {
        ReportView {
            id: 42,
            document_type: DocumentType {
                id: 1,
                name: "National ID".to_string(),
            },
            owner_name: None,
            finder_name: Some("Jean Bosco".to_string()),
            document_number: Some("A1234567".to_string()),
            where_lost: None,
            where_found: Some("Kigali".to_string()),
            when_lost: None,
            when_found: None,
            description: None,
            image: Some("found_docs/42.jpg".to_string()),
            image_original: Some("found_docs/42.jpg".to_string()),
            created_at: Utc::now(),
            is_premium: None,
            premium_expires_at: None,
            contact: None,
        }
    }

    #[test]
    fn test_reveal_window_reverts_and_clears_input() {
        let t0 = Instant::now();
        let mut flow = RevealFlow::new();
        flow.set_input("A1234567");

        flow.on_verified(unmasked(), t0);
        assert!(flow.is_revealed());
        assert_eq!(
            flow.document().unwrap().document_number.as_deref(),
            Some("A1234567")
        );

        // Still revealed just before the deadline
        assert!(!flow.tick(t0 + Duration::from_millis(2999)));
        assert!(flow.is_revealed());

        // Reverted and cleared at the deadline, atomically
        assert!(flow.tick(t0 + Duration::from_millis(3000)));
        assert!(!flow.is_revealed());
        assert!(flow.document().is_none());
        assert_eq!(flow.input(), "");
    }

    #[test]
    fn test_failure_keeps_input_and_shows_fixed_message() {
        let mut flow = RevealFlow::new();
        flow.set_input("wrong guess");

        flow.on_failure();
        assert!(!flow.is_revealed());
        assert_eq!(flow.input(), "wrong guess");
        assert_eq!(flow.error(), Some(VERIFY_FAILED_MESSAGE));
    }

    #[test]
    fn test_submission_trims_but_allows_empty() {
        let mut flow = RevealFlow::new();
        flow.set_input("  A1234567 ");
        assert_eq!(flow.submission(), "A1234567");

        flow.set_input("   ");
        assert_eq!(flow.submission(), "");
    }

    #[test]
    fn test_tick_before_any_reveal_is_inert() {
        let mut flow = RevealFlow::new();
        flow.set_input("keep me");
        assert!(!flow.tick(Instant::now()));
        assert_eq!(flow.input(), "keep me");
    }

    #[test]
    fn test_new_verification_restarts_window() {
        let t0 = Instant::now();
        let mut flow = RevealFlow::new();
        flow.set_input("A1234567");
        flow.on_verified(unmasked(), t0);
        assert!(flow.tick(t0 + Duration::from_millis(3000)));

        // A second successful check opens a fresh window
        flow.set_input("A1234567");
        let t1 = t0 + Duration::from_secs(60);
        flow.on_verified(unmasked(), t1);
        assert!(!flow.tick(t1 + Duration::from_millis(1000)));
        assert!(flow.is_revealed());
        assert!(flow.tick(t1 + Duration::from_millis(3001)));
    }
}
