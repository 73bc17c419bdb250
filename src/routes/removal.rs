//! Removal route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn removal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/documents/:report_type/:id/request-removal/",
            post(request_removal),
        )
        .route("/api/documents/confirm-removal/", get(confirm_removal))
}
