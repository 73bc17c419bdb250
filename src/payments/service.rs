//! Payment service layer - charge creation, status resolution, unlock side effects

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::model::{Payment, PaymentRequest, PaymentStatus, PaymentStatusResponse};
use super::momo::MomoClient;
use crate::error::ApiError;
use crate::reports::{ReportKind, ReportService};

/// Payment service shared by the contact-unlock and premium flows
pub struct PaymentService {
    db_pool: PgPool,
    momo: Arc<MomoClient>,
    reports: Arc<ReportService>,
    contact_fee: i64,
    premium_days: i64,
}

impl PaymentService {
    pub fn new(
        db_pool: PgPool,
        momo: Arc<MomoClient>,
        reports: Arc<ReportService>,
        contact_fee: i64,
        premium_days: i64,
    ) -> Self {
        Self {
            db_pool,
            momo,
            reports,
            contact_fee,
            premium_days,
        }
    }

    /// Request a charge that unlocks a report's contact block once paid
    pub async fn request_contact_unlock(
        &self,
        request: PaymentRequest,
    ) -> Result<Payment, ApiError> {
        request.validate().map_err(ApiError::ValidationError)?;

        let kind = ReportKind::parse(&request.report_type)
            .ok_or_else(|| ApiError::BadRequest("Invalid report type.".to_string()))?;

        self.reports
            .get_report(kind, request.report_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Report not found.".to_string()))?;

        let payment = self
            .create_charge(
                request.phone_number.trim(),
                self.contact_fee,
                "Payment for document contact access",
                "DocuFind contact access fee",
            )
            .await?;

        sqlx::query(
            r#"
            INSERT INTO contact_access (payment_id, kind, report_id, user_email)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(payment.id)
        .bind(kind)
        .bind(request.report_id)
        .bind(request.user_email.trim())
        .execute(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(payment)
    }

    /// Create a PENDING payment row and fire the provider charge.
    ///
    /// When the provider rejects the charge the row is marked FAILED before
    /// the error is surfaced, so status polls stay consistent.
    pub async fn create_charge(
        &self,
        phone_number: &str,
        amount: i64,
        payer_message: &str,
        payee_note: &str,
    ) -> Result<Payment, ApiError> {
        let now = Utc::now();
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (
                id, momo_reference_id, phone_number, amount, currency,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, 'RWF', 'PENDING', $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4().to_string())
        .bind(phone_number)
        .bind(amount)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if let Err(e) = self
            .momo
            .request_to_pay(
                &payment.momo_reference_id,
                &payment.phone_number,
                payment.amount,
                &payment.currency,
                payer_message,
                payee_note,
            )
            .await
        {
            tracing::warn!(payment_id = %payment.id, error = %e, "MoMo charge rejected");
            self.transition(&payment.id, PaymentStatus::Failed).await.ok();
            return Err(ApiError::ExternalServiceError(e.to_string()));
        }

        tracing::info!(payment_id = %payment.id, amount, "Charge created");

        Ok(payment)
    }

    /// Resolve a payment's current status for a client poll.
    ///
    /// Terminal payments are answered from the database and never re-polled
    /// against the provider. A provider error while pending leaves the
    /// payment pending rather than failing it spuriously.
    pub async fn check_status(&self, payment_id: Uuid) -> Result<PaymentStatusResponse, ApiError> {
        let payment = self
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Payment not found.".to_string()))?;

        if payment.status.is_terminal() {
            return Ok(payment.status.into());
        }

        let outcome = match self.momo.fetch_status(&payment.momo_reference_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(payment_id = %payment.id, error = %e, "MoMo status poll failed");
                return Ok(PaymentStatus::Pending.into());
            }
        };

        let next = payment.status.apply(outcome);
        if next == payment.status {
            return Ok(next.into());
        }

        let won = self.transition(&payment.id, next).await?;
        if won && next == PaymentStatus::Successful {
            self.apply_success_effects(&payment.id).await?;
        }

        Ok(next.into())
    }

    /// Background sweep: fail pending charges that outlived the deadline,
    /// then poll the provider for the remainder.
    pub async fn sweep_pending(&self, timeout_seconds: i64) -> Result<()> {
        let cutoff = Utc::now() - Duration::seconds(timeout_seconds);

        let expired: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE payments
            SET status = 'FAILED', updated_at = NOW()
            WHERE status = 'PENDING' AND created_at < $1
            RETURNING id
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to expire stale payments")?;

        for (id,) in &expired {
            tracing::warn!(payment_id = %id, "Payment timed out without settlement");
        }

        let pending = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE status = 'PENDING' ORDER BY created_at",
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to list pending payments")?;

        for payment in pending {
            let outcome = match self.momo.fetch_status(&payment.momo_reference_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::debug!(payment_id = %payment.id, error = %e, "Provider poll failed");
                    continue;
                }
            };

            let next = payment.status.apply(outcome);
            if next == payment.status {
                continue;
            }

            let won = self.transition(&payment.id, next).await?;
            if won && next == PaymentStatus::Successful {
                self.apply_success_effects(&payment.id).await?;
            }
        }

        Ok(())
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load payment")?;

        Ok(payment)
    }

    /// Record a premium order so the payment's settlement activates the boost
    pub async fn record_premium_order(&self, payment_id: Uuid, report_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO premium_orders (payment_id, report_id) VALUES ($1, $2)")
            .bind(payment_id)
            .bind(report_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to record premium order")?;

        Ok(())
    }

    /// Move a PENDING payment to a terminal status. Returns true when this
    /// call performed the transition; the guard keeps terminal states
    /// immutable and success side effects single-shot.
    async fn transition(&self, payment_id: &Uuid, next: PaymentStatus) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = 'PENDING'
            "#,
        )
        .bind(next)
        .bind(payment_id)
        .execute(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let won = result.rows_affected() > 0;
        if won {
            tracing::info!(payment_id = %payment_id, status = next.as_str(), "Payment settled");
        }
        Ok(won)
    }

    /// Side effects of a settled payment. Contact unlocks need nothing
    /// beyond the status itself; premium orders activate the listing boost.
    async fn apply_success_effects(&self, payment_id: &Uuid) -> Result<(), ApiError> {
        let order: Option<(i64,)> =
            sqlx::query_as("SELECT report_id FROM premium_orders WHERE payment_id = $1")
                .bind(payment_id)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if let Some((report_id,)) = order {
            let expires_at = Utc::now() + Duration::days(self.premium_days);
            sqlx::query(
                r#"
                UPDATE document_reports
                SET is_premium = TRUE, premium_expires_at = $1, premium_payment_id = $2
                WHERE id = $3 AND kind = 'lost'
                "#,
            )
            .bind(expires_at)
            .bind(payment_id)
            .bind(report_id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

            tracing::info!(
                report_id,
                payment_id = %payment_id,
                expires_at = %expires_at,
                "Premium listing activated"
            );
        }

        Ok(())
    }
}
