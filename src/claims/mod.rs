//! Claim workflow: email-token verification of ownership claims

pub mod model;
pub mod service;

pub use model::{StartClaimRequest, StartClaimResponse, VerificationToken};
pub use service::ClaimService;
