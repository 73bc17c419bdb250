//! DocuFind backend server
//!
//! REST API for lost/found document reports: masked public listings,
//! ownership verification, email-token claims, mobile-money payment
//! unlocks, premium listing boosts and verified removals.

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use docufind_server::claims::ClaimService;
use docufind_server::config::Config;
use docufind_server::mailer::Mailer;
use docufind_server::middleware::{rate_limit_layer, request_tracing, RateLimiter};
use docufind_server::payments::{poller::payment_poller, MomoClient, PaymentService};
use docufind_server::premium::PremiumService;
use docufind_server::removal::RemovalService;
use docufind_server::reports::ReportService;
use docufind_server::routes;
use docufind_server::db;
use docufind_server::state::AppState;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        "Starting DocuFind backend"
    );

    let db_pool = match db::create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Database connection failed");
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&db_pool).await {
        tracing::error!(error = %e, "Migration failed");
        std::process::exit(1);
    }

    let mailer = Arc::new(Mailer::new(&config));
    let momo = Arc::new(MomoClient::new(&config));

    let report_service = Arc::new(ReportService::new(db_pool.clone()));
    let claim_service = Arc::new(ClaimService::new(
        db_pool.clone(),
        report_service.clone(),
        mailer.clone(),
        config.token_ttl_hours,
    ));
    let payment_service = Arc::new(PaymentService::new(
        db_pool.clone(),
        momo,
        report_service.clone(),
        config.contact_fee,
        config.premium_days,
    ));
    let premium_service = Arc::new(PremiumService::new(
        report_service.clone(),
        payment_service.clone(),
        config.premium_fee,
    ));
    let removal_service = Arc::new(RemovalService::new(
        db_pool.clone(),
        report_service.clone(),
        mailer.clone(),
        config.token_ttl_hours,
    ));

    let app_state = AppState::new(
        report_service,
        claim_service,
        payment_service.clone(),
        premium_service,
        removal_service,
        mailer,
        config.upload_dir.clone(),
        config.contact_fee,
        config.premium_fee,
    );

    // A dismissed client must not strand a charge in PENDING forever;
    // this sweep settles or times out charges nobody is polling.
    let poll_interval = config.payment_poll_interval_seconds;
    let payment_timeout = config.payment_timeout_seconds;
    tokio::spawn(async move {
        tracing::info!("Payment poller task started");
        payment_poller(payment_service, poll_interval, payment_timeout).await;
        tracing::error!("Payment poller task exited unexpectedly");
    });

    let health_db_pool = db_pool.clone();
    let rate_limiter = RateLimiter::new(config.rate_limit_rps);

    // Keep the limiter's bucket map from growing without bound
    let limiter_gc = rate_limiter.clone();
    tokio::spawn(async move {
        let idle = std::time::Duration::from_secs(600);
        let mut interval = tokio::time::interval(idle);
        loop {
            interval.tick().await;
            limiter_gc.evict_idle(idle).await;
        }
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(move || health_check(health_db_pool.clone())))
        .merge(routes::report_routes())
        .merge(routes::claim_routes())
        .merge(routes::payment_routes())
        .merge(routes::premium_routes())
        .merge(routes::removal_routes())
        .merge(routes::contact_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(request_tracing))
        .layer(axum::middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_layer(limiter)(req, next)
        }))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind {}", addr);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    tracing::info!("Server shutdown complete");
}

async fn root() -> &'static str {
    "DocuFind API Server"
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// Health check endpoint
async fn health_check(pool: sqlx::PgPool) -> axum::Json<HealthResponse> {
    let db_status = match db::check_health(&pool).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if db_status == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    axum::Json(HealthResponse {
        status: status.to_string(),
        database: db_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed = config.cors_allowed_origins.as_deref().unwrap_or_default();

    if allowed.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
