//! Document report models and data structures

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a report describes a lost or a found document.
///
/// One tagged variant instead of two parallel record families; the public
/// field names (`owner_name` vs `finder_name`, ...) are produced by the
/// view adapter at the API boundary.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "report_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Lost,
    Found,
}

impl ReportKind {
    /// Parse a URL path segment ("lost" / "found")
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lost" => Some(ReportKind::Lost),
            "found" => Some(ReportKind::Found),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Lost => "lost",
            ReportKind::Found => "found",
        }
    }
}

/// Document type reference data
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct DocumentType {
    pub id: i64,
    pub name: String,
}

/// Reporter contact details, shared across a reporter's listings
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ContactInfo {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Contact block as exposed to a verified, paid-up claimant
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactView {
    pub full_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<ContactInfo> for ContactView {
    fn from(c: ContactInfo) -> Self {
        ContactView {
            full_name: c.full_name,
            phone: c.phone,
            email: c.email,
        }
    }
}

/// A lost or found document report, as stored
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct DocumentReport {
    pub id: i64,
    pub kind: ReportKind,
    pub document_type_id: i64,
    /// Owner name for lost reports, finder name for found reports
    pub reported_name: Option<String>,
    pub document_number: Option<String>,
    pub location: Option<String>,
    pub reported_on: Option<NaiveDate>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_blurred: Option<String>,
    pub contact_id: i64,
    pub is_premium: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub premium_payment_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DocumentReport {
    /// Whether the premium boost is currently in effect
    pub fn premium_active(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.premium_expires_at.map(|t| t > now).unwrap_or(false)
    }

    /// Check a free-text ownership guess against the authoritative record.
    ///
    /// Matches the reported name or the document number, trimmed and
    /// case-insensitive. An empty guess never matches.
    pub fn matches_verification(&self, input: &str) -> bool {
        let guess = input.trim();
        if guess.is_empty() {
            return false;
        }
        let eq = |field: &Option<String>| {
            field
                .as_deref()
                .map(|v| v.trim().eq_ignore_ascii_case(guess))
                .unwrap_or(false)
        };
        eq(&self.reported_name) || eq(&self.document_number)
    }
}

/// Public representation of a report, masked or full.
///
/// The adapter in [`super::masking`] fills the kind-specific field names;
/// fields belonging to the other kind are omitted from the JSON entirely.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportView {
    pub id: i64,
    pub document_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finder_name: Option<String>,
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_lost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_found: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_lost: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_found: Option<NaiveDate>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Unblurred image reference; present on full views only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_original: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactView>,
}

/// Report submission, decoded from the multipart form
#[derive(Debug, Clone)]
pub struct CreateReportRequest {
    pub kind: ReportKind,
    pub document_type_id: i64,
    pub reported_name: Option<String>,
    pub document_number: Option<String>,
    pub location: Option<String>,
    pub reported_on: Option<NaiveDate>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub contact_full_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
}

impl CreateReportRequest {
    /// Cross-field validation before hitting the database
    pub fn validate(&self) -> Result<(), String> {
        if self.contact_full_name.trim().is_empty() {
            return Err("Contact name is required.".to_string());
        }
        if self.contact_phone.trim().is_empty() {
            return Err("Contact phone is required.".to_string());
        }
        match self.kind {
            ReportKind::Lost => {
                if self
                    .reported_name
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or("")
                    .is_empty()
                {
                    return Err("Owner name is required for lost reports.".to_string());
                }
            }
            ReportKind::Found => {
                if self.image.is_none() {
                    return Err("An image of the found document is required.".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Query parameters for the public search endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub document_type: Option<i64>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// Site-wide counters for the landing page
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_lost: i64,
    pub total_found: i64,
    pub total_matched: i64,
    pub success_rate: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: Option<&str>, number: Option<&str>) -> DocumentReport {
        DocumentReport {
            id: 1,
            kind: ReportKind::Found,
            document_type_id: 1,
            reported_name: name.map(String::from),
            document_number: number.map(String::from),
            location: None,
            reported_on: None,
            description: None,
            image: None,
            image_blurred: None,
            contact_id: 1,
            is_premium: false,
            premium_expires_at: None,
            premium_payment_id: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_verification_matches_name_or_number() {
        let r = report(Some("Jean Bosco"), Some("A1234567"));
        assert!(r.matches_verification("jean bosco"));
        assert!(r.matches_verification("  A1234567 "));
        assert!(r.matches_verification("a1234567"));
        assert!(!r.matches_verification("somebody else"));
    }

    #[test]
    fn test_empty_guess_never_matches() {
        let r = report(Some("Jean Bosco"), Some("A1234567"));
        assert!(!r.matches_verification(""));
        assert!(!r.matches_verification("   "));

        // Even when the record itself has blank fields
        let r = report(None, None);
        assert!(!r.matches_verification(""));
    }

    #[test]
    fn test_premium_active_requires_future_expiry() {
        let now = Utc::now();
        let mut r = report(None, None);
        assert!(!r.premium_active(now));

        r.is_premium = true;
        assert!(!r.premium_active(now), "premium without expiry is inactive");

        r.premium_expires_at = Some(now + chrono::Duration::days(3));
        assert!(r.premium_active(now));

        r.premium_expires_at = Some(now - chrono::Duration::hours(1));
        assert!(!r.premium_active(now));
    }

    #[test]
    fn test_report_kind_parse() {
        assert_eq!(ReportKind::parse("lost"), Some(ReportKind::Lost));
        assert_eq!(ReportKind::parse("found"), Some(ReportKind::Found));
        assert_eq!(ReportKind::parse("stolen"), None);
        assert_eq!(ReportKind::Lost.as_str(), "lost");
    }

    #[test]
    fn test_create_request_validation() {
        let mut req = CreateReportRequest {
            kind: ReportKind::Found,
            document_type_id: 1,
            reported_name: None,
            document_number: None,
            location: None,
            reported_on: None,
            description: None,
            image: Some("found_docs/abc.jpg".to_string()),
            contact_full_name: "Alice Uwase".to_string(),
            contact_phone: "250788123456".to_string(),
            contact_email: None,
        };
        assert!(req.validate().is_ok());

        req.image = None;
        assert!(req.validate().is_err(), "found reports require an image");

        req.kind = ReportKind::Lost;
        assert!(req.validate().is_err(), "lost reports require an owner name");

        req.reported_name = Some("Alice Uwase".to_string());
        assert!(req.validate().is_ok());
    }
}
