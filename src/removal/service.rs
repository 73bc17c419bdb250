//! Removal service layer - two-step verified deactivation

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::model::{RemovalConfirmResponse, RemovalRequest, RemovalToken};
use crate::error::ApiError;
use crate::mailer::Mailer;
use crate::reports::{ReportKind, ReportService};

/// Removal service for the verification-gated takedown workflow
pub struct RemovalService {
    db_pool: PgPool,
    reports: Arc<ReportService>,
    mailer: Arc<Mailer>,
    token_ttl_hours: i64,
}

impl RemovalService {
    pub fn new(
        db_pool: PgPool,
        reports: Arc<ReportService>,
        mailer: Arc<Mailer>,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            db_pool,
            reports,
            mailer,
            token_ttl_hours,
        }
    }

    /// Verify ownership and email a confirmation link to the address on
    /// file. The listing itself is untouched until the link is visited.
    pub async fn request_removal(
        &self,
        kind: ReportKind,
        report_id: i64,
        request: RemovalRequest,
    ) -> Result<(), ApiError> {
        let report = self
            .reports
            .get_report(kind, report_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Document not found.".to_string()))?;

        if !report.matches_verification(&request.verification_input) {
            return Err(ApiError::Forbidden(
                "Verification failed. Please enter the correct owner name or document number."
                    .to_string(),
            ));
        }

        let contact = self.reports.get_contact(report.contact_id).await?;
        let email = contact.email.as_deref().filter(|e| !e.is_empty()).ok_or_else(|| {
            ApiError::BadRequest(
                "No email address on file for this listing; removal cannot be confirmed."
                    .to_string(),
            )
        })?;

        let dtype = self.reports.get_document_type(report.document_type_id).await?;

        let now = Utc::now();
        let token = sqlx::query_as::<_, RemovalToken>(
            r#"
            INSERT INTO removal_tokens (
                token, kind, report_id, reason, contact_email, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(report_id)
        .bind(request.reason)
        .bind(email)
        .bind(now)
        .bind(now + Duration::hours(self.token_ttl_hours))
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if let Err(e) = self
            .mailer
            .send_removal_confirmation(email, token.token, &dtype.name, self.token_ttl_hours)
            .await
        {
            tracing::error!(error = %e, "Failed to send removal confirmation email");
            return Err(ApiError::ExternalServiceError(e.to_string()));
        }

        tracing::info!(
            report_id,
            kind = kind.as_str(),
            "Removal requested, confirmation email sent"
        );

        Ok(())
    }

    /// Confirm a removal. The token is consumed atomically, so replaying
    /// the link cannot deactivate anything twice.
    pub async fn confirm_removal(&self, token: &str) -> Result<RemovalConfirmResponse, ApiError> {
        let token: Uuid = token
            .parse()
            .map_err(|_| ApiError::NotFound("Invalid or expired removal link.".to_string()))?;

        let consumed = sqlx::query_as::<_, RemovalToken>(
            "DELETE FROM removal_tokens WHERE token = $1 RETURNING *",
        )
        .bind(token)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired removal link.".to_string()))?;

        if !consumed.is_valid(Utc::now()) {
            return Err(ApiError::Gone("Removal link expired.".to_string()));
        }

        let report = self
            .reports
            .get_report_any(consumed.kind, consumed.report_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Document not found.".to_string()))?;

        let dtype = self.reports.get_document_type(report.document_type_id).await?;

        let deactivated = self.reports.deactivate(consumed.kind, consumed.report_id).await?;
        if !deactivated {
            tracing::debug!(
                report_id = consumed.report_id,
                "Listing was already inactive at confirmation"
            );
        }

        tracing::info!(
            report_id = consumed.report_id,
            kind = consumed.kind.as_str(),
            reason = ?consumed.reason,
            "Listing removed"
        );

        Ok(RemovalConfirmResponse {
            document_name: dtype.name,
        })
    }
}
