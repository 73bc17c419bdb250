//! Claim service layer - token issuance, verification and gated reveals

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::model::{StartClaimRequest, VerificationToken};
use crate::error::ApiError;
use crate::mailer::Mailer;
use crate::reports::{masking, ContactView, ReportKind, ReportService, ReportView};

/// Claim service for the email-token verification workflow
pub struct ClaimService {
    db_pool: PgPool,
    reports: Arc<ReportService>,
    mailer: Arc<Mailer>,
    token_ttl_hours: i64,
}

impl ClaimService {
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

    /// Start a claim: validate the target, issue a token and send the
    /// verification email.
    pub async fn start_claim(&self, request: StartClaimRequest) -> Result<(), ApiError> {
        let kind = ReportKind::parse(&request.report_type)
            .ok_or_else(|| ApiError::BadRequest("Invalid report type.".to_string()))?;

        let report = self
            .reports
            .get_report(kind, request.report_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Report not found.".to_string()))?;

        // Optional document-number hint must match when both sides have one
        if let Some(provided) = request
            .document_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            if let Some(actual) = report.document_number.as_deref().map(str::trim) {
                if !provided.eq_ignore_ascii_case(actual) {
                    return Err(ApiError::Forbidden(
                        "Document number does not match our records.".to_string(),
                    ));
                }
            }
        }

        let now = Utc::now();
        let token = sqlx::query_as::<_, VerificationToken>(
            r#"
            INSERT INTO verification_tokens (
                token, kind, report_id, contact_email, contact_phone, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(request.report_id)
        .bind(request.contact_email.trim())
        .bind(&request.contact_phone)
        .bind(now)
        .bind(now + Duration::hours(self.token_ttl_hours))
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if let Err(e) = self
            .mailer
            .send_claim_verification(
                &token.contact_email,
                token.token,
                kind,
                request.report_id,
                self.token_ttl_hours,
            )
            .await
        {
            // The token exists either way; surface the delivery failure
            tracing::error!(error = %e, "Failed to send claim verification email");
            return Err(ApiError::ExternalServiceError(e.to_string()));
        }

        tracing::info!(
            report_id = request.report_id,
            kind = kind.as_str(),
            "Claim started, verification email sent"
        );

        Ok(())
    }

    /// Verify an emailed token and return the full record.
    ///
    /// The counterparty's contact block is attached only once a successful
    /// payment has unlocked it for this report; the token itself stays
    /// usable until it expires so the post-payment refetch can succeed.
    pub async fn verify_claim(&self, token: &str) -> Result<ReportView, ApiError> {
        let token: Uuid = token
            .parse()
            .map_err(|_| ApiError::NotFound("Invalid token".to_string()))?;

        let vt = self
            .find_token(token)
            .await?
            .ok_or_else(|| ApiError::NotFound("Invalid token".to_string()))?;

        if !vt.is_valid(Utc::now()) {
            return Err(ApiError::Gone("Token expired.".to_string()));
        }

        let report = self
            .reports
            .get_report(vt.kind, vt.report_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Report not found.".to_string()))?;

        let dtype = self.reports.get_document_type(report.document_type_id).await?;

        let contact = if self.contact_unlocked(vt.kind, vt.report_id).await? {
            let contact = self.reports.get_contact(report.contact_id).await?;
            Some(ContactView::from(contact))
        } else {
            None
        };

        Ok(masking::full_view(&report, dtype, contact))
    }

    /// Resolve the original image reference for a token-bearing viewer.
    /// The token must reference the exact report being fetched.
    pub async fn protected_image(
        &self,
        kind: ReportKind,
        report_id: i64,
        token: &str,
    ) -> Result<String, ApiError> {
        let token: Uuid = token
            .parse()
            .map_err(|_| ApiError::Forbidden("Invalid token".to_string()))?;

        let vt = self
            .find_token(token)
            .await?
            .filter(|vt| vt.kind == kind && vt.report_id == report_id)
            .ok_or_else(|| ApiError::Forbidden("Invalid token".to_string()))?;

        if !vt.is_valid(Utc::now()) {
            return Err(ApiError::Gone("Token expired".to_string()));
        }

        let report = self
            .reports
            .get_report(kind, report_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Report not found.".to_string()))?;

        report
            .image
            .ok_or_else(|| ApiError::NotFound("No original image".to_string()))
    }

    async fn find_token(&self, token: Uuid) -> Result<Option<VerificationToken>> {
        let vt = sqlx::query_as::<_, VerificationToken>(
            "SELECT * FROM verification_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to look up verification token")?;

        Ok(vt)
    }

    /// Whether a successful contact-unlock payment exists for this report
    async fn contact_unlocked(&self, kind: ReportKind, report_id: i64) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM contact_access ca
            JOIN payments p ON p.id = ca.payment_id
            WHERE ca.kind = $1 AND ca.report_id = $2 AND p.status = 'SUCCESSFUL'
            "#,
        )
        .bind(kind)
        .bind(report_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to check contact access")?;

        Ok(count > 0)
    }
}
