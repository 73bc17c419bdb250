//! Report service layer - listing, search, submission and ownership checks

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::PgPool;

use super::masking;
use super::model::{
    ContactInfo, CreateReportRequest, DocumentReport, DocumentType, ReportKind, ReportView,
    SearchQuery, StatsResponse,
};

/// Service for managing document reports
pub struct ReportService {
    db_pool: PgPool,
}

impl ReportService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// List all known document types
    pub async fn document_types(&self) -> Result<Vec<DocumentType>> {
        let types =
            sqlx::query_as::<_, DocumentType>("SELECT id, name FROM document_types ORDER BY name")
                .fetch_all(&self.db_pool)
                .await
                .context("Failed to list document types")?;

        Ok(types)
    }

    /// Create a report from a public submission
    pub async fn create_report(&self, request: CreateReportRequest) -> Result<DocumentReport> {
        let contact = self
            .get_or_create_contact(
                request.contact_full_name.trim(),
                request.contact_phone.trim(),
                request.contact_email.as_deref().map(str::trim),
            )
            .await?;

        let report = sqlx::query_as::<_, DocumentReport>(
            r#"
            INSERT INTO document_reports (
                kind, document_type_id, reported_name, document_number, location,
                reported_on, description, image, contact_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(request.kind)
        .bind(request.document_type_id)
        .bind(&request.reported_name)
        .bind(&request.document_number)
        .bind(&request.location)
        .bind(request.reported_on)
        .bind(&request.description)
        .bind(&request.image)
        .bind(contact.id)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to insert document report")?;

        tracing::info!(
            report_id = report.id,
            kind = report.kind.as_str(),
            "Document report created"
        );

        Ok(report)
    }

    /// Fetch a single active report
    pub async fn get_report(&self, kind: ReportKind, id: i64) -> Result<Option<DocumentReport>> {
        let report = sqlx::query_as::<_, DocumentReport>(
            "SELECT * FROM document_reports WHERE id = $1 AND kind = $2 AND is_active",
        )
        .bind(id)
        .bind(kind)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(report)
    }

    /// Fetch a report regardless of its active flag (removal confirmation
    /// must keep working once the listing is already down)
    pub async fn get_report_any(&self, kind: ReportKind, id: i64) -> Result<Option<DocumentReport>> {
        let report = sqlx::query_as::<_, DocumentReport>(
            "SELECT * FROM document_reports WHERE id = $1 AND kind = $2",
        )
        .bind(id)
        .bind(kind)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(report)
    }

    /// Fetch the document type of a report
    pub async fn get_document_type(&self, type_id: i64) -> Result<DocumentType> {
        let dtype =
            sqlx::query_as::<_, DocumentType>("SELECT id, name FROM document_types WHERE id = $1")
                .bind(type_id)
                .fetch_one(&self.db_pool)
                .await
                .context("Document type not found")?;

        Ok(dtype)
    }

    /// Fetch a report's contact block
    pub async fn get_contact(&self, contact_id: i64) -> Result<ContactInfo> {
        let contact = sqlx::query_as::<_, ContactInfo>(
            "SELECT id, full_name, phone, email FROM contact_info WHERE id = $1",
        )
        .bind(contact_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Contact record not found")?;

        Ok(contact)
    }

    /// Masked search over active reports of one kind.
    ///
    /// Lost listings with an active premium boost sort ahead of the rest;
    /// within each group, newest first.
    pub async fn search(&self, kind: ReportKind, query: SearchQuery) -> Result<Vec<ReportView>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(50).clamp(1, 100);
        let offset = (page - 1) * limit;
        let now = Utc::now();

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
            "SELECT * FROM document_reports WHERE is_active AND kind = ",
        );
        query_builder.push_bind(kind);

        if let Some(type_id) = query.document_type {
            query_builder.push(" AND document_type_id = ");
            query_builder.push_bind(type_id);
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            query_builder.push(" AND (reported_name ILIKE ");
            query_builder.push_bind(pattern.clone());
            query_builder.push(" OR document_number ILIKE ");
            query_builder.push_bind(pattern);
            query_builder.push(")");
        }

        query_builder.push(" ORDER BY (is_premium AND premium_expires_at > ");
        query_builder.push_bind(now);
        query_builder.push(") DESC, created_at DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset as i64);

        let reports = query_builder
            .build_query_as::<DocumentReport>()
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to search reports")?;

        let mut views = Vec::with_capacity(reports.len());
        for report in &reports {
            let dtype = self.get_document_type(report.document_type_id).await?;
            views.push(masking::masked_view(report, dtype, now));
        }

        Ok(views)
    }

    /// Masked view of a single report
    pub async fn masked_report(&self, kind: ReportKind, id: i64) -> Result<Option<ReportView>> {
        let Some(report) = self.get_report(kind, id).await? else {
            return Ok(None);
        };
        let dtype = self.get_document_type(report.document_type_id).await?;
        Ok(Some(masking::masked_view(&report, dtype, Utc::now())))
    }

    /// Ownership verification check: confirm a free-text guess against the
    /// authoritative record and, on a match, hand back the full unmasked
    /// view. The contact block stays behind the payment gate.
    pub async fn verify_ownership(
        &self,
        kind: ReportKind,
        id: i64,
        verification_input: &str,
    ) -> Result<Option<ReportView>> {
        let Some(report) = self.get_report(kind, id).await? else {
            return Ok(None);
        };

        if !report.matches_verification(verification_input) {
            tracing::debug!(
                report_id = id,
                kind = kind.as_str(),
                "Ownership verification failed"
            );
            return Ok(None);
        }

        let dtype = self.get_document_type(report.document_type_id).await?;
        Ok(Some(masking::full_view(&report, dtype, None)))
    }

    /// Deactivate a listing (removal flow). Returns false when the report
    /// was already inactive or unknown.
    pub async fn deactivate(&self, kind: ReportKind, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE document_reports SET is_active = FALSE WHERE id = $1 AND kind = $2 AND is_active",
        )
        .bind(id)
        .bind(kind)
        .execute(&self.db_pool)
        .await
        .context("Failed to deactivate report")?;

        Ok(result.rows_affected() > 0)
    }

    /// Landing-page counters
    pub async fn stats(&self) -> Result<StatsResponse> {
        let (total_lost,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM document_reports WHERE kind = 'lost' AND is_active",
        )
        .fetch_one(&self.db_pool)
        .await?;

        let (total_found,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM document_reports WHERE kind = 'found' AND is_active",
        )
        .fetch_one(&self.db_pool)
        .await?;

        // Deactivated listings are overwhelmingly recovered documents
        let (total_matched,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM document_reports WHERE NOT is_active")
                .fetch_one(&self.db_pool)
                .await?;

        let success_rate = if total_matched + total_lost > 0 {
            total_matched * 100 / (total_matched + total_lost)
        } else {
            0
        };

        Ok(StatsResponse {
            total_lost,
            total_found,
            total_matched,
            success_rate,
        })
    }

    async fn get_or_create_contact(
        &self,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<ContactInfo> {
        let email = email.filter(|e| !e.is_empty());

        let existing = sqlx::query_as::<_, ContactInfo>(
            r#"
            SELECT id, full_name, phone, email FROM contact_info
            WHERE full_name = $1 AND phone = $2 AND email IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;

        if let Some(contact) = existing {
            return Ok(contact);
        }

        let contact = sqlx::query_as::<_, ContactInfo>(
            r#"
            INSERT INTO contact_info (full_name, phone, email)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, phone, email
            "#,
        )
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to insert contact info")?;

        Ok(contact)
    }
}
