//! Client-side protocol layer
//!
//! The typed API client and the flow state machines a frontend drives:
//! reveal windows, payment polling, premium upgrades and claim forms.

pub mod api;
pub mod flows;

pub use api::{ApiClient, ClientError, StartClaimPayload, VerifyOutcome};
pub use flows::{ClaimForm, PaymentFlow, PaymentFlowState, PremiumFlow, PremiumFlowState, RevealFlow};
