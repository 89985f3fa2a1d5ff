//! Authentication API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/admin/login", post(handler::admin_login))
        .route("/api/auth/admin/logout", post(handler::admin_logout))
        .route("/api/auth/employee/login", post(handler::employee_login))
        .route("/api/auth/me", get(handler::me))
}
