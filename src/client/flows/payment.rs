//! Contact-unlock payment flow
//!
//! `Input → Pending → {Success | Failed}`, with `Failed → Input` as the
//! only retry path. While pending, the flow schedules status polls on a
//! fixed cadence and fails itself once the wall-clock deadline passes, so
//! a payment the provider never settles cannot be polled forever.

use std::time::Instant;
use uuid::Uuid;

use super::{PAYMENT_DEADLINE, POLL_INTERVAL};

pub const PAYMENT_FAILED_MESSAGE: &str = "Payment failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentFlowState {
    Input,
    Pending,
    Success,
    Failed,
}

struct Pending {
    payment_id: Uuid,
    next_poll_at: Instant,
    deadline: Instant,
}

/// Payment flow for one contact unlock
pub struct PaymentFlow {
    phone_number: String,
    state: PaymentFlowState,
    pending: Option<Pending>,
    error: Option<&'static str>,
}

impl Default for PaymentFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentFlow {
    pub fn new() -> Self {
        Self {
            phone_number: String::new(),
            state: PaymentFlowState::Input,
            pending: None,
            error: None,
        }
    }

    pub fn state(&self) -> PaymentFlowState {
        self.state
    }

    pub fn set_phone_number(&mut self, phone: &str) {
        self.phone_number = phone.to_string();
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// The phone number to charge, if the flow is ready to submit. Empty
    /// input never submits.
    pub fn submission(&self) -> Option<String> {
        if self.state != PaymentFlowState::Input {
            return None;
        }
        let phone = self.phone_number.trim();
        if phone.is_empty() {
            return None;
        }
        Some(phone.to_string())
    }

    /// The charge was accepted; start polling
    pub fn on_request_accepted(&mut self, payment_id: Uuid, now: Instant) {
        self.state = PaymentFlowState::Pending;
        self.error = None;
        self.pending = Some(Pending {
            payment_id,
            next_poll_at: now + POLL_INTERVAL,
            deadline: now + PAYMENT_DEADLINE,
        });
    }

    /// The charge was rejected (falsy success or a thrown request)
    pub fn on_request_failed(&mut self) {
        self.fail();
    }

    /// The payment id to poll, when a poll is due. Terminal states and
    /// not-yet-due pending states return None.
    pub fn poll_due(&self, now: Instant) -> Option<Uuid> {
        let pending = self.pending.as_ref()?;
        if self.state != PaymentFlowState::Pending || now < pending.next_poll_at {
            return None;
        }
        Some(pending.payment_id)
    }

    /// Apply one status poll result. Returns true exactly when this poll
    /// settled the payment as paid, which is the single point where the
    /// caller unlocks the contact block.
    pub fn on_status(&mut self, paid: bool, status: &str, now: Instant) -> bool {
        if self.state != PaymentFlowState::Pending {
            return false;
        }

        if paid {
            self.state = PaymentFlowState::Success;
            self.pending = None;
            return true;
        }

        if status == "FAILED" {
            self.fail();
            return false;
        }

        // Still pending: schedule the next poll
        if let Some(pending) = self.pending.as_mut() {
            pending.next_poll_at = now + POLL_INTERVAL;
        }
        false
    }

    /// A thrown status poll is terminal for the flow; the user retries
    /// manually rather than the client looping on a broken connection.
    pub fn on_poll_error(&mut self) {
        if self.state == PaymentFlowState::Pending {
            self.fail();
        }
    }

    /// Advance time: a pending payment past its deadline fails
    pub fn tick(&mut self, now: Instant) {
        if self.state != PaymentFlowState::Pending {
            return;
        }
        if let Some(pending) = &self.pending {
            if now >= pending.deadline {
                self.fail();
            }
        }
    }

    /// Manual retry from the failed state, with a fresh form
    pub fn retry(&mut self) {
        if self.state == PaymentFlowState::Failed {
            self.state = PaymentFlowState::Input;
            self.phone_number.clear();
            self.error = None;
        }
    }

    fn fail(&mut self) {
        self.state = PaymentFlowState::Failed;
        self.pending = None;
        self.error = Some(PAYMENT_FAILED_MESSAGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn accepted_flow(now: Instant) -> (PaymentFlow, Uuid) {
        let mut flow = PaymentFlow::new();
        flow.set_phone_number("250788123456");
        assert_eq!(flow.submission().as_deref(), Some("250788123456"));

        let payment_id = Uuid::new_v4();
        flow.on_request_accepted(payment_id, now);
        (flow, payment_id)
    }

    #[test]
    fn test_empty_phone_never_submits() {
        let mut flow = PaymentFlow::new();
        assert!(flow.submission().is_none());
        flow.set_phone_number("   ");
        assert!(flow.submission().is_none());
    }

    #[test]
    fn test_poll_cadence() {
        let t0 = Instant::now();
        let (flow, payment_id) = accepted_flow(t0);

        assert!(flow.poll_due(t0).is_none(), "first poll waits one interval");
        assert!(flow.poll_due(t0 + Duration::from_millis(2999)).is_none());
        assert_eq!(flow.poll_due(t0 + Duration::from_millis(3000)), Some(payment_id));
    }

    #[test]
    fn test_pending_then_paid_unlocks_exactly_once() {
        let t0 = Instant::now();
        let (mut flow, _) = accepted_flow(t0);

        // First poll: not yet paid, next poll scheduled
        let t1 = t0 + Duration::from_millis(3000);
        assert!(!flow.on_status(false, "PENDING", t1));
        assert_eq!(flow.state(), PaymentFlowState::Pending);
        assert!(flow.poll_due(t1).is_none());

        // Second poll: paid. The unlock fires here and only here
        let t2 = t1 + Duration::from_millis(3000);
        assert!(flow.poll_due(t2).is_some());
        assert!(flow.on_status(true, "SUCCESSFUL", t2));
        assert_eq!(flow.state(), PaymentFlowState::Success);

        // Terminal: no further polls, no second unlock
        assert!(flow.poll_due(t2 + Duration::from_secs(60)).is_none());
        assert!(!flow.on_status(true, "SUCCESSFUL", t2 + Duration::from_secs(60)));
    }

    #[test]
    fn test_failed_status_stops_polling() {
        let t0 = Instant::now();
        let (mut flow, _) = accepted_flow(t0);

        let t1 = t0 + Duration::from_millis(3000);
        assert!(!flow.on_status(false, "FAILED", t1));
        assert_eq!(flow.state(), PaymentFlowState::Failed);
        assert!(flow.poll_due(t1 + Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_poll_error_is_terminal() {
        let t0 = Instant::now();
        let (mut flow, _) = accepted_flow(t0);

        flow.on_poll_error();
        assert_eq!(flow.state(), PaymentFlowState::Failed);
        assert_eq!(flow.error(), Some(PAYMENT_FAILED_MESSAGE));
    }

    #[test]
    fn test_deadline_bounds_polling() {
        let t0 = Instant::now();
        let (mut flow, _) = accepted_flow(t0);

        flow.tick(t0 + Duration::from_secs(299));
        assert_eq!(flow.state(), PaymentFlowState::Pending);

        flow.tick(t0 + Duration::from_secs(300));
        assert_eq!(flow.state(), PaymentFlowState::Failed);
        assert!(flow.poll_due(t0 + Duration::from_secs(301)).is_none());
    }

    #[test]
    fn test_retry_clears_the_form() {
        let t0 = Instant::now();
        let (mut flow, _) = accepted_flow(t0);
        flow.on_poll_error();

        flow.retry();
        assert_eq!(flow.state(), PaymentFlowState::Input);
        assert_eq!(flow.phone_number(), "");
        assert!(flow.error().is_none());
    }

    #[test]
    fn test_request_failure_goes_straight_to_failed() {
        let mut flow = PaymentFlow::new();
        flow.set_phone_number("250788123456");
        flow.on_request_failed();
        assert_eq!(flow.state(), PaymentFlowState::Failed);
    }
}
