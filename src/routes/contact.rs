//! Contact-form route definitions

use axum::{routing::post, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/api/contact/", post(submit_contact))
}
