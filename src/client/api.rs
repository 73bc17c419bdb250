//! Typed REST client for the DocuFind API
//!
//! Thin reqwest wrapper with a configured base URL, a request timeout and a
//! short-lived GET response cache. The cache is keyed by path+query and
//! takes the current `Instant` from the caller, so tests control time.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

use crate::payments::{PaymentRequestResponse, PaymentStatusResponse};
use crate::removal::{RemovalConfirmResponse, RemovalReason};
use crate::reports::{DocumentType, ReportKind, ReportView, StatsResponse};

/// Default lifetime of a cached GET response
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-2xx status; `detail` carries the
    /// message from its error envelope when one was present.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error envelope emitted by the backend. Claim-family responses populate
/// `detail`, the payment/premium/removal family populates `error`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: Option<String>,
    error: Option<String>,
}

/// Outcome of an ownership verification call
#[derive(Debug, Deserialize)]
pub struct VerifyOutcome {
    pub verified: bool,
    pub document: Option<ReportView>,
}

/// Start-claim payload. A blank document number is omitted from the body
/// entirely, never sent as an empty string.
#[derive(Debug, Serialize)]
pub struct StartClaimPayload {
    pub report_type: String,
    pub report_id: i64,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
}

struct CacheEntry {
    body: serde_json::Value,
    fetched_at: Instant,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    cache: Mutex<HashMap<String, CacheEntry>>,
    cache_ttl: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_options(base_url, DEFAULT_TIMEOUT, DEFAULT_CACHE_TTL)
    }

    pub fn with_options(base_url: &str, timeout: Duration, cache_ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build API HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
            cache_ttl,
        }
    }

    /// List document types
    pub async fn document_types(&self, now: Instant) -> Result<Vec<DocumentType>, ClientError> {
        self.get_json("document-types/", now).await
    }

    /// Masked search over one report kind
    pub async fn search(
        &self,
        kind: ReportKind,
        search: Option<&str>,
        document_type: Option<i64>,
        now: Instant,
    ) -> Result<Vec<ReportView>, ClientError> {
        let mut path = format!("{}/search/?", kind.as_str());
        if let Some(term) = search {
            path.push_str(&format!("search={}&", urlencode(term)));
        }
        if let Some(type_id) = document_type {
            path.push_str(&format!("document_type={}&", type_id));
        }
        let path = path.trim_end_matches(['&', '?']).to_string();
        self.get_json(&path, now).await
    }

    /// Masked view of a single report
    pub async fn get_report(
        &self,
        kind: ReportKind,
        id: i64,
        now: Instant,
    ) -> Result<ReportView, ClientError> {
        self.get_json(&format!("{}/{}/", kind.as_str(), id), now).await
    }

    /// Ownership verification check
    pub async fn verify_ownership(
        &self,
        kind: ReportKind,
        id: i64,
        verification_input: &str,
    ) -> Result<VerifyOutcome, ClientError> {
        self.post_json(
            &format!("verify/{}/{}/", kind.as_str(), id),
            &serde_json::json!({ "verification_input": verification_input }),
        )
        .await
    }

    /// Start a claim; the backend acknowledges and emails a token
    pub async fn start_claim(&self, payload: &StartClaimPayload) -> Result<(), ClientError> {
        let _: serde_json::Value = self.post_json("claims/start/", payload).await?;
        Ok(())
    }

    /// Exchange an emailed claim token for the full record
    pub async fn verify_claim(&self, token: &str) -> Result<ReportView, ClientError> {
        // Never cached: the contact block may appear after a payment
        let value = self
            .fetch(&format!("claims/verify/?token={}", urlencode(token)))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Request a contact-unlock charge
    pub async fn request_payment(
        &self,
        phone_number: &str,
        kind: ReportKind,
        report_id: i64,
        user_email: &str,
    ) -> Result<PaymentRequestResponse, ClientError> {
        self.post_json(
            "payment/request/",
            &serde_json::json!({
                "phone_number": phone_number,
                "report_type": kind.as_str(),
                "report_id": report_id,
                "user_email": user_email,
            }),
        )
        .await
    }

    /// Poll a contact-unlock charge
    pub async fn payment_status(&self, payment_id: Uuid) -> Result<PaymentStatusResponse, ClientError> {
        let value = self.fetch(&format!("payment/status/{}/", payment_id)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Start a premium upgrade charge
    pub async fn premium_upgrade(
        &self,
        lost_doc_id: i64,
        verification_input: &str,
        phone_number: &str,
    ) -> Result<PaymentRequestResponse, ClientError> {
        self.post_json(
            "premium/upgrade/",
            &serde_json::json!({
                "lost_doc_id": lost_doc_id,
                "verification_input": verification_input,
                "phone_number": phone_number,
            }),
        )
        .await
    }

    /// Poll a premium charge
    pub async fn premium_status(&self, payment_id: Uuid) -> Result<PaymentStatusResponse, ClientError> {
        let value = self.fetch(&format!("premium/status/{}/", payment_id)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Request removal of a listing
    pub async fn request_removal(
        &self,
        kind: ReportKind,
        report_id: i64,
        verification_input: &str,
        reason: RemovalReason,
    ) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post_json(
                &format!("documents/{}/{}/request-removal/", kind.as_str(), report_id),
                &serde_json::json!({
                    "verification_input": verification_input,
                    "reason": reason,
                }),
            )
            .await?;
        Ok(())
    }

    /// Confirm a removal via the emailed token
    pub async fn confirm_removal(&self, token: &str) -> Result<RemovalConfirmResponse, ClientError> {
        let value = self
            .fetch(&format!("documents/confirm-removal/?token={}", urlencode(token)))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Site-wide counters
    pub async fn stats(&self, now: Instant) -> Result<StatsResponse, ClientError> {
        self.get_json("stats/", now).await
    }

    /// Submit a new report as a multipart form. `fields` carries the
    /// kind-specific text fields (`owner_name`, `where_lost`, ...); the
    /// image rides along as a file part when present.
    pub async fn submit_report(
        &self,
        kind: ReportKind,
        fields: Vec<(String, String)>,
        image: Option<(String, Vec<u8>)>,
    ) -> Result<(), ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        if let Some((file_name, bytes)) = image {
            form = form.part(
                "image",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        }

        let url = format!("{}/{}/", self.base_url, kind.as_str());
        let response = self.http.post(&url).multipart(form).send().await?;
        let _ = Self::decode(response).await?;
        Ok(())
    }

    /// Send a contact-form message to the support team
    pub async fn submit_contact(
        &self,
        name: &str,
        email: &str,
        category: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post_json(
                "contact/",
                &serde_json::json!({
                    "name": name,
                    "email": email,
                    "category": category,
                    "subject": subject,
                    "message": message,
                }),
            )
            .await?;
        Ok(())
    }

    /// GET through the TTL cache
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        now: Instant,
    ) -> Result<T, ClientError> {
        if let Some(cached) = self.cached(path, now) {
            return Ok(serde_json::from_value(cached)?);
        }

        let value = self.fetch(path).await?;
        self.store(path, value.clone(), now);
        Ok(serde_json::from_value(value)?)
    }

    fn cached(&self, path: &str, now: Instant) -> Option<serde_json::Value> {
        let cache = self.cache.lock().expect("API cache lock poisoned");
        cache
            .get(path)
            .filter(|entry| now.duration_since(entry.fetched_at) < self.cache_ttl)
            .map(|entry| entry.body.clone())
    }

    fn store(&self, path: &str, body: serde_json::Value, now: Instant) {
        let mut cache = self.cache.lock().expect("API cache lock poisoned");
        cache.insert(
            path.to_string(),
            CacheEntry {
                body,
                fetched_at: now,
            },
        );
    }

    async fn fetch(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;
        let value = Self::decode(response).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Turn a response into JSON, mapping non-2xx statuses onto the error
    /// envelope's message (`detail` or `error`, whichever is present).
    async fn decode(response: reqwest::Response) -> Result<serde_json::Value, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let detail = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|envelope| envelope.detail.or(envelope.error))
            .unwrap_or_else(|| "Something went wrong. Please try again.".to_string());

        tracing::debug!(status = status.as_u16(), detail = %detail, "API error response");

        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Percent-encode a query value
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("A1234567"), "A1234567");
        assert_eq!(urlencode("jean bosco"), "jean%20bosco");
        assert_eq!(urlencode("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn test_blank_document_number_is_omitted() {
        let payload = StartClaimPayload {
            report_type: "found".to_string(),
            report_id: 42,
            contact_email: "me@example.com".to_string(),
            contact_phone: None,
            document_number: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("document_number").is_none());
        assert!(json.get("contact_phone").is_none());
        assert_eq!(json["contact_email"], "me@example.com");
    }

    #[test]
    fn test_cache_expires_with_injected_time() {
        let client = ApiClient::with_options(
            "http://localhost:8000/api",
            DEFAULT_TIMEOUT,
            Duration::from_secs(30),
        );

        let t0 = Instant::now();
        client.store("stats/", serde_json::json!({"total_lost": 3}), t0);

        assert!(client.cached("stats/", t0).is_some());
        assert!(client
            .cached("stats/", t0 + Duration::from_secs(29))
            .is_some());
        assert!(client
            .cached("stats/", t0 + Duration::from_secs(31))
            .is_none());
        assert!(client.cached("other/", t0).is_none());
    }

    #[test]
    fn test_error_envelope_prefers_detail() {
        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"detail":"Token expired.","error":"Token expired."}"#).unwrap();
        assert_eq!(envelope.detail.as_deref(), Some("Token expired."));

        let envelope: ErrorEnvelope = serde_json::from_str(r#"{"error":"Upgrade failed"}"#).unwrap();
        assert_eq!(envelope.detail.or(envelope.error).as_deref(), Some("Upgrade failed"));
    }
}
