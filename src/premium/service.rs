//! Premium service layer - ownership check plus charge in one step

use std::sync::Arc;

use super::model::UpgradeRequest;
use crate::error::ApiError;
use crate::payments::{Payment, PaymentService};
use crate::reports::{ReportKind, ReportService};

/// Premium upgrade service
pub struct PremiumService {
    reports: Arc<ReportService>,
    payments: Arc<PaymentService>,
    premium_fee: i64,
}

impl PremiumService {
    pub fn new(reports: Arc<ReportService>, payments: Arc<PaymentService>, premium_fee: i64) -> Self {
        Self {
            reports,
            payments,
            premium_fee,
        }
    }

    /// Verify ownership of a lost listing and fire the premium charge.
    /// Activation happens when the payment settles (status poll or sweep).
    pub async fn upgrade(&self, request: UpgradeRequest) -> Result<Payment, ApiError> {
        request.validate().map_err(ApiError::ValidationError)?;

        let report = self
            .reports
            .get_report(ReportKind::Lost, request.lost_doc_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Report not found.".to_string()))?;

        if !report.matches_verification(&request.verification_input) {
            // Generic on purpose: never confirm which field was wrong
            return Err(ApiError::Forbidden(
                "Verification failed. Please enter the correct owner name or document number."
                    .to_string(),
            ));
        }

        let payment = self
            .payments
            .create_charge(
                request.phone_number.trim(),
                self.premium_fee,
                "Premium listing upgrade",
                "DocuFind premium listing fee",
            )
            .await?;

        self.payments
            .record_premium_order(payment.id, report.id)
            .await?;

        tracing::info!(
            report_id = report.id,
            payment_id = %payment.id,
            "Premium upgrade charge accepted"
        );

        Ok(payment)
    }
}
