//! Audit trail API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/audit", get(handler::query))
        .route("/api/audit/verify", get(handler::verify))
}
