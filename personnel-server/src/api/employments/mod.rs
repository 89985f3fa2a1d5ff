//! Employment records API module
//!
//! Attendance and leave mutations live under `/self`: check-in, check-out
//! and the leave lifecycle are things an employee does to their own record.
//! Administrators create employment records and decide leave requests.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/self", get(handler::get_own))
        .route("/self/check-in", post(handler::check_in))
        .route("/self/check-out", post(handler::check_out))
        .route("/self/leaves", post(handler::apply_leave))
        .route(
            "/self/leaves/{leave_id}",
            put(handler::edit_leave).delete(handler::cancel_leave),
        )
        .route(
            "/employee/{employee_id}",
            get(handler::get_by_employee).post(handler::create_for_employee),
        )
        .route(
            "/employee/{employee_id}/leaves/{leave_id}/decision",
            post(handler::decide_leave),
        )
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
}
