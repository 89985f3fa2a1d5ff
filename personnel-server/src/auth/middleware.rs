//! Authentication middleware
//!
//! One guard resolves the caller's identity at the boundary and injects an
//! [`AuthContext`] into the request extensions. Handlers and repositories
//! never look at headers themselves; they take the context and let the
//! repository layer decide what the caller may do.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Header carrying an administrator session id.
pub const SESSION_HEADER: &str = "x-session-id";
/// Header carrying an employee record id for self-service calls.
pub const EMPLOYEE_HEADER: &str = "x-employee-id";

/// Identity guard for every `/api/` route.
///
/// Skips CORS preflight, non-API paths and the public routes
/// (`/api/health` and the two login endpoints). Everything else must
/// present either an `x-session-id` or an `x-employee-id` header; the
/// resolved [`AuthContext`] is inserted into the request extensions.
pub async fn resolve_identity(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = path == "/api/health"
        || path == "/api/auth/admin/login"
        || path == "/api/auth/employee/login";
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let session_id = header_value(&req, SESSION_HEADER);
    let employee_id = header_value(&req, EMPLOYEE_HEADER);

    let resolved = if let Some(session_id) = session_id {
        state.sessions().validate_admin(&session_id).await
    } else if let Some(employee_id) = employee_id {
        state.sessions().employee_context(&employee_id).await
    } else {
        security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
        return Err(AppError::authentication("Missing session header"));
    };

    match resolved {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            Err(e)
        }
    }
}

fn header_value(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned)
}
