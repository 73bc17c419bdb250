//! Premium route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn premium_routes() -> Router<AppState> {
    Router::new()
        .route("/api/premium/upgrade/", post(upgrade_premium))
        .route("/api/premium/status/:id/", get(premium_status))
}
