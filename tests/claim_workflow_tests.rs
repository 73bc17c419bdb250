//! Consistency tests for the claim, unlock and removal workflows

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use std::sync::Arc;
    use uuid::Uuid;

    use docufind_server::claims::{ClaimService, StartClaimRequest};
    use docufind_server::config::{Config, Environment};
    use docufind_server::mailer::Mailer;
    use docufind_server::removal::{RemovalReason, RemovalRequest, RemovalService};
    use docufind_server::reports::{CreateReportRequest, ReportKind, ReportService};

    /// Helper to create a test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/docufind_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            environment: Environment::Development,
            port: 8000,
            db_max_connections: 1,
            rate_limit_rps: 100,
            cors_allowed_origins: None,
            log_level: "info".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            upload_dir: "./media".to_string(),
            mail_relay_url: None,
            mail_from: "no-reply@docufind.example".to_string(),
            momo_base_url: "http://127.0.0.1:1".to_string(),
            momo_api_user: String::new(),
            momo_api_key: String::new(),
            momo_subscription_key: String::new(),
            momo_target_environment: "sandbox".to_string(),
            http_timeout_seconds: 2,
            contact_fee: 2000,
            premium_fee: 500,
            premium_days: 7,
            token_ttl_hours: 6,
            payment_poll_interval_seconds: 3,
            payment_timeout_seconds: 300,
        }
    }

    /// Helper to seed a document type and return its id
    async fn seed_document_type(pool: &PgPool) -> i64 {
        let name = format!("National ID {}", Uuid::new_v4());
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO document_types (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(pool)
                .await
                .expect("Failed to seed document type");
        id
    }

    fn found_report_request(document_type_id: i64) -> CreateReportRequest {
        CreateReportRequest {
            kind: ReportKind::Found,
            document_type_id,
            reported_name: Some("Jean Bosco".to_string()),
            document_number: Some("A1234567".to_string()),
            location: Some("Kigali".to_string()),
            reported_on: None,
            description: Some("Found near the bus park".to_string()),
            image: Some("found_docs/test.jpg".to_string()),
            contact_full_name: "Finder Person".to_string(),
            contact_phone: "250788000111".to_string(),
            contact_email: Some("finder@example.com".to_string()),
        }
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_claim_contact_gated_until_payment() {
        let db_pool = setup_test_db().await;
        let config = test_config();

        let reports = Arc::new(ReportService::new(db_pool.clone()));
        let mailer = Arc::new(Mailer::new(&config));
        let claims = Arc::new(ClaimService::new(
            db_pool.clone(),
            reports.clone(),
            mailer,
            config.token_ttl_hours,
        ));

        let type_id = seed_document_type(&db_pool).await;
        let report = reports
            .create_report(found_report_request(type_id))
            .await
            .expect("Report creation should succeed");

        claims
            .start_claim(StartClaimRequest {
                report_type: "found".to_string(),
                report_id: report.id,
                contact_email: "claimant@example.com".to_string(),
                contact_phone: None,
                document_number: Some("A1234567".to_string()),
            })
            .await
            .expect("Claim start should succeed");

        // The emailed token is the one recorded for this report
        let (token,): (Uuid,) = sqlx::query_as(
            "SELECT token FROM verification_tokens WHERE report_id = $1 ORDER BY created_at DESC",
        )
        .bind(report.id)
        .fetch_one(&db_pool)
        .await
        .expect("Token should exist");

        // Before any payment the full record comes back without contact
        let view = claims
            .verify_claim(&token.to_string())
            .await
            .expect("Token verification should succeed");
        assert_eq!(view.finder_name.as_deref(), Some("Jean Bosco"));
        assert!(view.contact.is_none(), "contact must stay gated before payment");

        // Settle a contact-unlock payment for this report
        let payment_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO payments (id, momo_reference_id, phone_number, amount, currency, status)
            VALUES ($1, $2, '250788123456', 2000, 'RWF', 'SUCCESSFUL')
            "#,
        )
        .bind(payment_id)
        .bind(Uuid::new_v4().to_string())
        .execute(&db_pool)
        .await
        .expect("Payment insert should succeed");

        sqlx::query(
            r#"
            INSERT INTO contact_access (payment_id, kind, report_id, user_email)
            VALUES ($1, 'found', $2, 'claimant@example.com')
            "#,
        )
        .bind(payment_id)
        .bind(report.id)
        .execute(&db_pool)
        .await
        .expect("Contact access insert should succeed");

        // The same token re-reads with the contact block attached
        let view = claims
            .verify_claim(&token.to_string())
            .await
            .expect("Token should remain valid for the post-payment refetch");
        let contact = view.contact.expect("contact unlocks after payment");
        assert_eq!(contact.full_name, "Finder Person");
        assert_eq!(contact.phone, "250788000111");
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_claim_rejects_mismatched_document_number() {
        let db_pool = setup_test_db().await;
        let config = test_config();

        let reports = Arc::new(ReportService::new(db_pool.clone()));
        let mailer = Arc::new(Mailer::new(&config));
        let claims = Arc::new(ClaimService::new(
            db_pool.clone(),
            reports.clone(),
            mailer,
            config.token_ttl_hours,
        ));

        let type_id = seed_document_type(&db_pool).await;
        let report = reports
            .create_report(found_report_request(type_id))
            .await
            .expect("Report creation should succeed");

        let result = claims
            .start_claim(StartClaimRequest {
                report_type: "found".to_string(),
                report_id: report.id,
                contact_email: "claimant@example.com".to_string(),
                contact_phone: None,
                document_number: Some("WRONG123".to_string()),
            })
            .await;

        assert!(result.is_err(), "mismatched document number hint is rejected");
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_removal_confirmation_is_single_use() {
        let db_pool = setup_test_db().await;
        let config = test_config();

        let reports = Arc::new(ReportService::new(db_pool.clone()));
        let mailer = Arc::new(Mailer::new(&config));
        let removal = Arc::new(RemovalService::new(
            db_pool.clone(),
            reports.clone(),
            mailer,
            config.token_ttl_hours,
        ));

        let type_id = seed_document_type(&db_pool).await;
        let report = reports
            .create_report(found_report_request(type_id))
            .await
            .expect("Report creation should succeed");

        removal
            .request_removal(
                ReportKind::Found,
                report.id,
                RemovalRequest {
                    verification_input: "Jean Bosco".to_string(),
                    reason: RemovalReason::Found,
                },
            )
            .await
            .expect("Removal request should succeed");

        let (token,): (Uuid,) =
            sqlx::query_as("SELECT token FROM removal_tokens WHERE report_id = $1")
                .bind(report.id)
                .fetch_one(&db_pool)
                .await
                .expect("Removal token should exist");

        let confirmed = removal
            .confirm_removal(&token.to_string())
            .await
            .expect("First confirmation should succeed");
        assert!(!confirmed.document_name.is_empty());

        // The listing is gone from public reads
        let listed = reports
            .get_report(ReportKind::Found, report.id)
            .await
            .expect("Query should succeed");
        assert!(listed.is_none(), "confirmed removal deactivates the listing");

        // Replaying the link reports an invalid token, with no second effect
        let replay = removal.confirm_removal(&token.to_string()).await;
        assert!(replay.is_err(), "removal token is single-use");
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_ownership_verification_against_database() {
        let db_pool = setup_test_db().await;

        let reports = Arc::new(ReportService::new(db_pool.clone()));
        let type_id = seed_document_type(&db_pool).await;
        let report = reports
            .create_report(found_report_request(type_id))
            .await
            .expect("Report creation should succeed");

        // Document number match returns the full record
        let verified = reports
            .verify_ownership(ReportKind::Found, report.id, " a1234567 ")
            .await
            .expect("Verification query should succeed");
        let view = verified.expect("case-insensitive number match verifies");
        assert_eq!(view.finder_name.as_deref(), Some("Jean Bosco"));
        assert_eq!(view.document_number.as_deref(), Some("A1234567"));

        // Wrong guess and empty guess both fail without distinction
        for guess in ["somebody else", ""] {
            let result = reports
                .verify_ownership(ReportKind::Found, report.id, guess)
                .await
                .expect("Verification query should succeed");
            assert!(result.is_none());
        }
    }

    #[test]
    fn test_start_claim_validation() {
        use validator::Validate;

        let request = StartClaimRequest {
            report_type: "found".to_string(),
            report_id: 42,
            contact_email: "claimant@example.com".to_string(),
            contact_phone: Some("250788123456".to_string()),
            document_number: None,
        };
        assert!(request.validate().is_ok());

        let request = StartClaimRequest {
            contact_email: "not an email".to_string(),
            ..request
        };
        assert!(request.validate().is_err());
    }
}
