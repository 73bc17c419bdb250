//! Background poller for pending payments
//!
//! The client polls the status endpoints while its view is open, but a
//! dismissed view must not strand a charge in PENDING forever: this task
//! re-polls the provider on a fixed cadence and fails any charge that
//! outlives the configured wall-clock deadline.

use std::sync::Arc;
use std::time::Duration;

use super::service::PaymentService;

pub async fn payment_poller(
    payments: Arc<PaymentService>,
    poll_interval_seconds: u64,
    payment_timeout_seconds: i64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(poll_interval_seconds.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        if let Err(e) = payments.sweep_pending(payment_timeout_seconds).await {
            tracing::error!(error = %e, "Payment sweep failed");
        }
    }
}
