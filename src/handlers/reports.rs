//! Report API handlers: submission, search, ownership verification

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::reports::{
    CreateReportRequest, DocumentType, ReportKind, ReportView, SearchQuery, StatsResponse,
};
use crate::state::AppState;

/// List the known document types
pub async fn list_document_types(
    State(app_state): State<AppState>,
) -> ApiResult<Json<Vec<DocumentType>>> {
    let types = app_state.report_service.document_types().await?;
    Ok(Json(types))
}

#[derive(Serialize)]
pub struct CreateReportResponse {
    pub id: i64,
    pub detail: String,
}

/// Submit a lost report (multipart, optional image)
pub async fn create_lost_report(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<CreateReportResponse>> {
    create_report(app_state, ReportKind::Lost, multipart).await
}

/// Submit a found report (multipart, image required)
pub async fn create_found_report(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<CreateReportResponse>> {
    create_report(app_state, ReportKind::Found, multipart).await
}

async fn create_report(
    app_state: AppState,
    kind: ReportKind,
    multipart: Multipart,
) -> ApiResult<Json<CreateReportResponse>> {
    let request = decode_report_form(kind, &app_state.upload_dir, multipart).await?;
    request.validate().map_err(ApiError::ValidationError)?;

    let report = app_state.report_service.create_report(request).await?;

    Ok(Json(CreateReportResponse {
        id: report.id,
        detail: "Report submitted successfully.".to_string(),
    }))
}

/// Masked search over lost reports
pub async fn search_lost(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ReportView>>> {
    let views = app_state.report_service.search(ReportKind::Lost, query).await?;
    Ok(Json(views))
}

/// Masked search over found reports
pub async fn search_found(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ReportView>>> {
    let views = app_state.report_service.search(ReportKind::Found, query).await?;
    Ok(Json(views))
}

/// Masked view of a single report
pub async fn get_report(
    State(app_state): State<AppState>,
    Path((report_type, id)): Path<(String, i64)>,
) -> ApiResult<Json<ReportView>> {
    let kind = parse_kind(&report_type)?;
    let view = app_state
        .report_service
        .masked_report(kind, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found.".to_string()))?;

    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub verification_input: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<ReportView>,
}

/// Ownership verification check.
///
/// A mismatch and an unknown report are indistinguishable on the wire:
/// both answer 200 with `verified: false`, so probing responses can't
/// confirm what a listing contains.
pub async fn verify_ownership(
    State(app_state): State<AppState>,
    Path((report_type, id)): Path<(String, i64)>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let kind = parse_kind(&report_type)?;

    let document = app_state
        .report_service
        .verify_ownership(kind, id, &request.verification_input)
        .await?;

    Ok(Json(VerifyResponse {
        verified: document.is_some(),
        document,
    }))
}

/// Landing-page counters
pub async fn get_stats(State(app_state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = app_state.report_service.stats().await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
pub struct ProtectedImageQuery {
    pub report_type: String,
    pub report_id: i64,
    pub token: String,
}

/// Serve a report's original (unblurred) image to a token-bearing viewer
pub async fn protected_image(
    State(app_state): State<AppState>,
    Query(query): Query<ProtectedImageQuery>,
) -> ApiResult<Response> {
    let kind = parse_kind(&query.report_type)?;

    let reference = app_state
        .claim_service
        .protected_image(kind, query.report_id, &query.token)
        .await?;

    // Storage references are relative paths under the upload directory
    if reference.contains("..") || reference.starts_with('/') {
        return Err(ApiError::NotFound("No original image".to_string()));
    }

    let path = std::path::Path::new(&app_state.upload_dir).join(&reference);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to read image: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&reference))], bytes).into_response())
}

fn content_type_for(reference: &str) -> &'static str {
    match reference.rsplit('.').next() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn parse_kind(report_type: &str) -> Result<ReportKind, ApiError> {
    ReportKind::parse(report_type)
        .ok_or_else(|| ApiError::BadRequest("Invalid report type.".to_string()))
}

/// Decode the submission form into the canonical request shape.
///
/// The public form speaks kind-specific names (`owner_name` / `found_name`,
/// `where_lost` / `where_found`, ...) and is normalized here, so nothing
/// downstream ever branches on field-name variants. Field names are matched
/// case-insensitively.
async fn decode_report_form(
    kind: ReportKind,
    upload_dir: &str,
    mut multipart: Multipart,
) -> Result<CreateReportRequest, ApiError> {
    let mut request = CreateReportRequest {
        kind,
        document_type_id: 0,
        reported_name: None,
        document_number: None,
        location: None,
        reported_on: None,
        description: None,
        image: None,
        contact_full_name: String::new(),
        contact_phone: String::new(),
        contact_email: None,
    };
    let mut document_type: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed form submission.".to_string()))?
    {
        let name = field.name().unwrap_or_default().to_lowercase();

        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::BadRequest("Image upload failed.".to_string()))?;
            if bytes.is_empty() {
                continue;
            }
            request.image = Some(store_image(upload_dir, kind, &file_name, &bytes).await?);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|_| ApiError::BadRequest("Malformed form submission.".to_string()))?;
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "document_type" => {
                document_type = Some(value.parse::<i64>().map_err(|_| {
                    ApiError::BadRequest("Invalid document type.".to_string())
                })?);
            }
            "owner_name" | "finder_name" | "found_name" => request.reported_name = Some(value),
            "document_number" => request.document_number = Some(value),
            "where_lost" | "where_found" => request.location = Some(value),
            "when_lost" | "when_found" => {
                let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
                    ApiError::BadRequest("Dates must use the YYYY-MM-DD format.".to_string())
                })?;
                request.reported_on = Some(date);
            }
            "description" => request.description = Some(value),
            "contact_full_name" => request.contact_full_name = value,
            "contact_phone" => request.contact_phone = value,
            "contact_email" => request.contact_email = Some(value),
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown form field");
            }
        }
    }

    request.document_type_id = document_type
        .ok_or_else(|| ApiError::ValidationError("Document type is required.".to_string()))?;

    Ok(request)
}

/// Write an uploaded image under the upload directory and return its
/// storage reference.
async fn store_image(
    upload_dir: &str,
    kind: ReportKind,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, ApiError> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("jpg")
        .to_lowercase();

    let reference = format!("{}_docs/{}.{}", kind.as_str(), Uuid::new_v4(), extension);
    let path = std::path::Path::new(upload_dir).join(&reference);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to create upload dir: {}", e)))?;
    }

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

    tracing::debug!(reference = %reference, size = bytes.len(), "Image stored");

    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("lost_docs/a.png"), "image/png");
        assert_eq!(content_type_for("found_docs/b.jpg"), "image/jpeg");
        assert_eq!(content_type_for("no-extension"), "image/jpeg");
    }

    #[test]
    fn test_parse_kind_rejects_unknown() {
        assert!(parse_kind("lost").is_ok());
        assert!(parse_kind("found").is_ok());
        assert!(parse_kind("stolen").is_err());
    }

    #[test]
    fn test_verify_response_omits_document_on_failure() {
        let response = VerifyResponse {
            verified: false,
            document: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "verified": false }));
    }
}
