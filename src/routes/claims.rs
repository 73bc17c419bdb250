//! Claim route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn claim_routes() -> Router<AppState> {
    Router::new()
        .route("/api/claims/start/", post(start_claim))
        .route("/api/claims/verify/", get(verify_claim))
}
