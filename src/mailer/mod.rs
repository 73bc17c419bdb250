//! Outbound mail boundary
//!
//! Delivery itself is an external collaborator: messages are posted as JSON
//! to a configured relay endpoint. Without a relay (development), messages
//! are logged instead so flows stay exercisable end to end.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::reports::ReportKind;

/// A rendered outbound message
#[derive(Debug, Serialize)]
pub struct OutboundMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail relay client
pub struct Mailer {
    http: reqwest::Client,
    relay_url: Option<String>,
    from: String,
    frontend_url: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .expect("Failed to build mail relay HTTP client");

        Self {
            http,
            relay_url: config.mail_relay_url.clone(),
            from: config.mail_from.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }

    /// Emailed link that lands on the claim verification page
    pub fn claim_verify_url(&self, token: Uuid) -> String {
        format!("{}/verify?token={}", self.frontend_url, token)
    }

    /// Emailed link that lands on the removal confirmation page
    pub fn removal_confirm_url(&self, token: Uuid) -> String {
        format!("{}/remove?token={}", self.frontend_url, token)
    }

    /// Send the claim verification email
    pub async fn send_claim_verification(
        &self,
        to: &str,
        token: Uuid,
        kind: ReportKind,
        report_id: i64,
        expires_hours: i64,
    ) -> Result<()> {
        let url = self.claim_verify_url(token);
        let body = format!(
            "You started a claim on {} report #{}.\n\n\
             Open the link below to verify your claim and view the full details.\n\
             The link is valid for {} hours.\n\n{}",
            kind.as_str(),
            report_id,
            expires_hours,
            url
        );
        self.send(OutboundMail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: "Verify your claim for Lost & Found Report".to_string(),
            body,
        })
        .await
    }

    /// Send the removal confirmation email
    pub async fn send_removal_confirmation(
        &self,
        to: &str,
        token: Uuid,
        document_name: &str,
        expires_hours: i64,
    ) -> Result<()> {
        let url = self.removal_confirm_url(token);
        let body = format!(
            "We received a request to remove your {} listing.\n\n\
             Open the link below within {} hours to confirm the removal.\n\n{}",
            document_name, expires_hours, url
        );
        self.send(OutboundMail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: "Confirm removal of your listing".to_string(),
            body,
        })
        .await
    }

    /// Forward a contact-form message to the support mailbox
    pub async fn send_contact_message(
        &self,
        reply_to: &str,
        category: &str,
        subject: &str,
        message: &str,
    ) -> Result<()> {
        let body = format!("From: {}\nCategory: {}\n\n{}", reply_to, category, message);
        self.send(OutboundMail {
            from: self.from.clone(),
            to: self.from.clone(),
            subject: format!("[Contact] {}", subject),
            body,
        })
        .await
    }

    async fn send(&self, mail: OutboundMail) -> Result<()> {
        match &self.relay_url {
            Some(relay) => {
                let response = self
                    .http
                    .post(relay)
                    .json(&mail)
                    .send()
                    .await
                    .context("Mail relay request failed")?;

                if !response.status().is_success() {
                    anyhow::bail!("Mail relay returned status {}", response.status());
                }

                tracing::info!(to = %mail.to, subject = %mail.subject, "Mail relayed");
                Ok(())
            }
            None => {
                tracing::info!(
                    to = %mail.to,
                    subject = %mail.subject,
                    body = %mail.body,
                    "Mail relay not configured; logging message"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};

    fn config() -> Config {
        Config {
            database_url: String::new(),
            environment: Environment::Development,
            port: 8000,
            db_max_connections: 5,
            rate_limit_rps: 100,
            cors_allowed_origins: None,
            log_level: "info".to_string(),
            frontend_url: "https://docufind.example".to_string(),
            upload_dir: "./media".to_string(),
            mail_relay_url: None,
            mail_from: "no-reply@docufind.example".to_string(),
            momo_base_url: String::new(),
            momo_api_user: String::new(),
            momo_api_key: String::new(),
            momo_subscription_key: String::new(),
            momo_target_environment: "sandbox".to_string(),
            http_timeout_seconds: 15,
            contact_fee: 2000,
            premium_fee: 500,
            premium_days: 7,
            token_ttl_hours: 6,
            payment_poll_interval_seconds: 3,
            payment_timeout_seconds: 300,
        }
    }

    #[test]
    fn test_link_formats() {
        let mailer = Mailer::new(&config());
        let token = Uuid::nil();
        assert_eq!(
            mailer.claim_verify_url(token),
            "https://docufind.example/verify?token=00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            mailer.removal_confirm_url(token),
            "https://docufind.example/remove?token=00000000-0000-0000-0000-000000000000"
        );
    }
}
