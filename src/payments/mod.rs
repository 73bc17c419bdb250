//! Mobile-money payments: contact unlocks and premium charges

pub mod model;
pub mod momo;
pub mod poller;
pub mod service;

pub use model::{
    MomoPollOutcome, Payment, PaymentRequest, PaymentRequestResponse, PaymentStatus,
    PaymentStatusResponse,
};
pub use momo::MomoClient;
pub use service::PaymentService;
