//! Rate limiting middleware
//!
//! Per-client token buckets. Besides general abuse control, this is the
//! backstop against brute-forcing the ownership verification check to
//! uncover masked fields.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Per-client request allowance, refilled continuously
#[derive(Debug)]
struct Bucket {
    allowance: f64,
    last_refill: Instant,
}

/// Token-bucket rate limiter keyed by client address
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
    per_second: f64,
    burst: f64,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        let per_second = f64::from(requests_per_second);
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            per_second,
            // Short bursts above the sustained rate are tolerated
            burst: per_second * 2.0,
        }
    }

    /// Whether this client may make another request right now
    pub async fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;

        let bucket = buckets.entry(client.to_string()).or_insert(Bucket {
            allowance: self.burst,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.allowance = (bucket.allowance + elapsed * self.per_second).min(self.burst);
        bucket.last_refill = now;

        if bucket.allowance < 1.0 {
            return false;
        }
        bucket.allowance -= 1.0;
        true
    }

    /// Drop buckets that have been idle longer than `max_idle`
    pub async fn evict_idle(&self, max_idle: Duration) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < max_idle);
    }
}

/// Create rate limiting middleware layer
pub fn rate_limit_layer(
    rate_limiter: RateLimiter,
) -> impl Fn(
    Request<Body>,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send {
    move |request: Request<Body>, next: Next| {
        let rate_limiter = rate_limiter.clone();
        Box::pin(async move {
            let client = client_key(&request);

            if !rate_limiter.allow(&client).await {
                tracing::warn!(client = %client, "Rate limit exceeded");
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, "1")],
                    "Too many requests. Please try again later.",
                )
                    .into_response();
            }

            next.run(request).await
        })
    }
}

/// Client identity for bucketing: first X-Forwarded-For hop, then
/// X-Real-IP, else a shared fallback key.
fn client_key(request: &Request<Body>) -> String {
    let from_header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    from_header("x-forwarded-for")
        .or_else(|| from_header("x-real-ip"))
        .unwrap_or_else(|| "unknown".to_string())
}
