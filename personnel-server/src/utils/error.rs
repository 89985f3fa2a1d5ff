//! Unified error handling.
//!
//! Application-level error type and response envelope:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - API response structure
//!
//! # Error code scheme
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E3xxx | Authentication | E3001 not logged in |
//! | E2xxx | Authorization | E2001 permission denied |
//! | E0xxx | Business | E0004 conflict |
//! | E9xxx | System | E9002 store error |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Uniform API response envelope.
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 means success)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Response payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Trace ID (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Application error enum.
///
/// One variant per failure category the consistency layer can report.
/// `Concurrency` is distinct from `Conflict`: the former means a concurrent
/// writer invalidated this write (retryable as-is), the latter means the
/// request contradicts current data (retrying unchanged cannot succeed).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication / authorization (4xx) ==========
    #[error("Authentication failed: {0}")]
    /// Missing, invalid or expired credentials (401)
    Authentication(String),

    #[error("Permission denied: {0}")]
    /// Authenticated but not allowed (403)
    Authorization(String),

    // ========== Business errors (4xx) ==========
    #[error("Validation failed: {0}")]
    /// Payload violates a domain rule (400)
    Validation(String),

    #[error("Conflict: {0}")]
    /// Request contradicts existing data (409)
    Conflict(String),

    #[error("Resource not found: {0}")]
    /// Target record does not exist (404)
    NotFound(String),

    #[error("Concurrent modification: {0}")]
    /// Lost a write race, caller may retry (409)
    Concurrency(String),

    // ========== System errors (5xx) ==========
    #[error("Store error: {0}")]
    /// Storage engine failure (500)
    Store(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, "E3001", msg.as_str()),

            // Authorization errors (403)
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, "E2001", msg.as_str()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.as_str()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),

            // Concurrency (409)
            AppError::Concurrency(msg) => (StatusCode::CONFLICT, "E0005", msg.as_str()),

            // Store errors (500)
            AppError::Store(msg) => {
                error!(target: "store", error = %msg, "Store error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Store error")
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
            trace_id: None,
        });

        (status, body).into_response()
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(e: surrealdb::Error) -> Self {
        let text = e.to_string();
        // RocksDB commit conflicts surface as a retryable transaction error;
        // everything else is a storage failure.
        if text.contains("read or write conflict") || text.contains("can be retried") {
            AppError::Concurrency(text)
        } else {
            AppError::Store(text)
        }
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn concurrency(msg: impl Into<String>) -> Self {
        Self::Concurrency(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Unified login failure message.
    /// Wrong phone, wrong password and inactive account all read the same,
    /// so login cannot be used to probe which accounts exist.
    pub fn invalid_credentials() -> Self {
        Self::Authentication("Invalid phone or password".to_string())
    }
}

/// Application result alias.
pub type AppResult<T> = Result<T, AppError>;

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
        trace_id: None,
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
        trace_id: None,
    })
}
