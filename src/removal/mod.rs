//! Listing removal: verification-gated, email-confirmed deactivation

pub mod model;
pub mod service;

pub use model::{
    RemovalConfirmResponse, RemovalReason, RemovalRequest, RemovalRequestResponse, RemovalToken,
};
pub use service::RemovalService;
