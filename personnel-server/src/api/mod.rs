//! HTTP API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and store checks
//! - [`auth`] - admin and employee login flows
//! - [`admins`] - administrator account management
//! - [`employees`] - employee records, including self-service
//! - [`employments`] - attendance and leave tracking
//! - [`salaries`] - salary records
//! - [`enquiries`] - walk-in enquiry records
//! - [`audit`] - audit trail queries

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::middleware::resolve_identity;
use crate::core::ServerState;

pub mod admins;
pub mod audit;
pub mod auth;
pub mod employees;
pub mod employments;
pub mod enquiries;
pub mod health;
pub mod salaries;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Request ID generator for the x-request-id header
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: axum_middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(admins::router())
        .merge(employees::router())
        .merge(employments::router())
        .merge(salaries::router())
        .merge(enquiries::router())
        .merge(audit::router())
}

/// Build the fully configured application with middleware and state
pub fn create_app(state: ServerState) -> Router {
    build_router()
        // Identity guard - resolve_identity skips the public routes itself
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .with_state(state)
        // Tower HTTP middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        // Propagate must sit inside Set so the generated id reaches responses
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
}
