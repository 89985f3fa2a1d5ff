//! Employee records API module
//!
//! Administrators manage the collection; `/self` is the one route an
//! employee session can write to.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/self", put(handler::update_self))
        .route("/by-phone/{phone}", get(handler::get_by_phone))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
