//! Report route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/document-types/", get(list_document_types))
        .route("/api/lost/", post(create_lost_report))
        .route("/api/found/", post(create_found_report))
        .route("/api/lost/search/", get(search_lost))
        .route("/api/found/search/", get(search_found))
        .route("/api/:report_type/:id/", get(get_report))
        .route("/api/verify/:report_type/:id/", post(verify_ownership))
        .route("/api/protected-image/", get(protected_image))
        .route("/api/stats/", get(get_stats))
}
