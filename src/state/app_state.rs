//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::claims::ClaimService;
use crate::mailer::Mailer;
use crate::payments::PaymentService;
use crate::premium::PremiumService;
use crate::removal::RemovalService;
use crate::reports::ReportService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub report_service: Arc<ReportService>,
    pub claim_service: Arc<ClaimService>,
    pub payment_service: Arc<PaymentService>,
    pub premium_service: Arc<PremiumService>,
    pub removal_service: Arc<RemovalService>,
    pub mailer: Arc<Mailer>,
    /// Directory for uploaded report images
    pub upload_dir: String,
    /// Displayed (backend-enforced) fees
    pub contact_fee: i64,
    pub premium_fee: i64,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        report_service: Arc<ReportService>,
        claim_service: Arc<ClaimService>,
        payment_service: Arc<PaymentService>,
        premium_service: Arc<PremiumService>,
        removal_service: Arc<RemovalService>,
        mailer: Arc<Mailer>,
        upload_dir: String,
        contact_fee: i64,
        premium_fee: i64,
    ) -> Self {
        Self {
            report_service,
            claim_service,
            payment_service,
            premium_service,
            removal_service,
            mailer,
            upload_dir,
            contact_fee,
            premium_fee,
        }
    }
}

impl FromRef<AppState> for Arc<ReportService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.report_service.clone()
    }
}

impl FromRef<AppState> for Arc<ClaimService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.claim_service.clone()
    }
}

impl FromRef<AppState> for Arc<PaymentService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.payment_service.clone()
    }
}

impl FromRef<AppState> for Arc<PremiumService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.premium_service.clone()
    }
}

impl FromRef<AppState> for Arc<RemovalService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.removal_service.clone()
    }
}
