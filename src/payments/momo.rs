//! MTN MoMo collection API client
//!
//! Thin reqwest wrapper over the request-to-pay flow: access token via
//! basic auth, charge initiation with a caller-supplied reference id, and
//! status polls keyed by that reference.

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::model::MomoPollOutcome;
use crate::config::Config;

pub struct MomoClient {
    http: reqwest::Client,
    base_url: String,
    api_user: String,
    api_key: String,
    subscription_key: String,
    target_environment: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct RequestToPayBody<'a> {
    amount: String,
    currency: &'a str,
    #[serde(rename = "externalId")]
    external_id: String,
    payer: Payer<'a>,
    #[serde(rename = "payerMessage")]
    payer_message: &'a str,
    #[serde(rename = "payeeNote")]
    payee_note: &'a str,
}

#[derive(Serialize)]
struct Payer<'a> {
    #[serde(rename = "partyIdType")]
    party_id_type: &'a str,
    #[serde(rename = "partyId")]
    party_id: &'a str,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: Option<String>,
}

impl MomoClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .expect("Failed to build MoMo HTTP client");

        Self {
            http,
            base_url: config.momo_base_url.trim_end_matches('/').to_string(),
            api_user: config.momo_api_user.clone(),
            api_key: config.momo_api_key.clone(),
            subscription_key: config.momo_subscription_key.clone(),
            target_environment: config.momo_target_environment.clone(),
        }
    }

    /// The sandbox collection API only settles EUR; live environments
    /// charge in the payment's own currency.
    fn charge_currency<'a>(&self, payment_currency: &'a str) -> &'a str {
        if self.target_environment == "sandbox" {
            "EUR"
        } else {
            payment_currency
        }
    }

    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/collection/token/", self.base_url);

        let credentials = format!("{}:{}", self.api_user, self.api_key);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Basic {}", encoded))
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .header("X-Target-Environment", &self.target_environment)
            .header("Content-Length", "0")
            .send()
            .await
            .context("MoMo token request failed")?
            .error_for_status()
            .context("MoMo token request rejected")?;

        let token: TokenResponse = response
            .json()
            .await
            .context("MoMo token response was not valid JSON")?;

        Ok(token.access_token)
    }

    /// Initiate a charge against the payer's wallet. MoMo acknowledges
    /// acceptance with 202; settlement is observed through status polls.
    pub async fn request_to_pay(
        &self,
        reference_id: &str,
        phone_number: &str,
        amount: i64,
        currency: &str,
        payer_message: &str,
        payee_note: &str,
    ) -> Result<()> {
        let access_token = self.access_token().await?;
        let url = format!("{}/collection/v1_0/requesttopay", self.base_url);

        let body = RequestToPayBody {
            amount: amount.to_string(),
            currency: self.charge_currency(currency),
            external_id: Uuid::new_v4().to_string(),
            payer: Payer {
                party_id_type: "MSISDN",
                party_id: phone_number,
            },
            payer_message,
            payee_note,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&access_token)
            .header("X-Reference-Id", reference_id)
            .header("X-Target-Environment", &self.target_environment)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .json(&body)
            .send()
            .await
            .context("MoMo request-to-pay failed")?;

        if response.status() != reqwest::StatusCode::ACCEPTED {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("MoMo request-to-pay rejected with {}: {}", status, text);
        }

        tracing::info!(reference_id, phone = phone_number, "MoMo charge accepted");

        Ok(())
    }

    /// Poll the provider for a charge's settlement status
    pub async fn fetch_status(&self, reference_id: &str) -> Result<MomoPollOutcome> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/collection/v1_0/requesttopay/{}",
            self.base_url, reference_id
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&access_token)
            .header("X-Target-Environment", &self.target_environment)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .send()
            .await
            .context("MoMo status poll failed")?
            .error_for_status()
            .context("MoMo status poll rejected")?;

        let status: StatusResponse = response
            .json()
            .await
            .context("MoMo status response was not valid JSON")?;

        Ok(map_provider_status(status.status.as_deref()))
    }
}

/// Map the provider's status string onto the poll outcome. Unknown and
/// intermediate statuses count as still pending.
fn map_provider_status(status: Option<&str>) -> MomoPollOutcome {
    match status {
        Some("SUCCESSFUL") => MomoPollOutcome::Successful,
        Some("FAILED") | Some("REJECTED") | Some("TIMEOUT") => MomoPollOutcome::Failed,
        _ => MomoPollOutcome::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_provider_status() {
        assert_eq!(
            map_provider_status(Some("SUCCESSFUL")),
            MomoPollOutcome::Successful
        );
        assert_eq!(map_provider_status(Some("FAILED")), MomoPollOutcome::Failed);
        assert_eq!(
            map_provider_status(Some("REJECTED")),
            MomoPollOutcome::Failed
        );
        assert_eq!(
            map_provider_status(Some("PENDING")),
            MomoPollOutcome::Pending
        );
        assert_eq!(map_provider_status(Some("???")), MomoPollOutcome::Pending);
        assert_eq!(map_provider_status(None), MomoPollOutcome::Pending);
    }
}
