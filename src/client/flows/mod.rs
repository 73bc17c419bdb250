//! Client-side flow state machines
//!
//! Pure types with no timers or I/O: the host drives them with events and
//! the current `Instant`, so tests advance virtual time deterministically.

pub mod claim;
pub mod payment;
pub mod premium;
pub mod reveal;

use std::time::Duration;

/// How long a successful ownership verification stays unmasked
pub const REVEAL_WINDOW: Duration = Duration::from_millis(3000);

/// Cadence of payment status polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Wall-clock bound on a pending payment before the flow gives up
pub const PAYMENT_DEADLINE: Duration = Duration::from_secs(300);

pub use claim::ClaimForm;
pub use payment::{PaymentFlow, PaymentFlowState};
pub use premium::{PremiumFlow, PremiumFlowState};
pub use reveal::RevealFlow;
