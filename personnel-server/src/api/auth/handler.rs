//! Authentication handlers
//!
//! Login endpoints are public; logout and `me` run behind the identity
//! guard. Failed logins are audited without an operator.

use axum::{
    Json,
    extract::{Extension, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::audit::AuditAction;
use crate::auth::AuthContext;
use crate::auth::middleware::SESSION_HEADER;
use crate::core::ServerState;
use crate::db::models::{Admin, Employee, PrincipalKind};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    /// Presented in the x-session-id header on later calls
    pub session_id: String,
    pub expires_at: i64,
    pub admin: Admin,
}

#[derive(Debug, Serialize)]
pub struct EmployeeLoginResponse {
    /// Presented in the x-employee-id header on later calls
    pub employee_id: String,
    pub employee: Employee,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub kind: PrincipalKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// POST /api/auth/admin/login - open an administrator session
pub async fn admin_login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<AdminLoginResponse>>> {
    match state.sessions().login_admin(&req.phone, &req.password).await {
        Ok((session, admin)) => {
            let session_id = session
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default();
            let admin_id = admin
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default();
            state
                .audit()
                .log(
                    AuditAction::LoginSuccess,
                    "auth",
                    &admin_id,
                    Some(admin_id.clone()),
                    Some(admin.name.clone()),
                    serde_json::json!({"phone": &req.phone}),
                )
                .await;
            Ok(ok(AdminLoginResponse {
                session_id,
                expires_at: session.expires_at,
                admin,
            }))
        }
        Err(e) => {
            if matches!(e, AppError::Authentication(_)) {
                state
                    .audit()
                    .log(
                        AuditAction::LoginFailed,
                        "auth",
                        &req.phone,
                        None,
                        None,
                        serde_json::json!({"reason": "invalid_credentials"}),
                    )
                    .await;
            }
            Err(e)
        }
    }
}

/// POST /api/auth/admin/logout - revoke the current session server-side
pub async fn admin_logout(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> AppResult<Json<AppResponse<()>>> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing session header"))?;

    state.sessions().logout_admin(session_id).await?;
    state
        .audit()
        .log(
            AuditAction::Logout,
            "auth",
            &ctx.stamp(),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            serde_json::json!({}),
        )
        .await;

    Ok(ok_with_message((), "Logged out"))
}

/// POST /api/auth/employee/login - verify employee credentials
pub async fn employee_login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<EmployeeLoginResponse>>> {
    match state
        .sessions()
        .login_employee(&req.phone, &req.password)
        .await
    {
        Ok(employee) => {
            let employee_id = employee
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default();
            state
                .audit()
                .log(
                    AuditAction::LoginSuccess,
                    "auth",
                    &employee_id,
                    Some(employee_id.clone()),
                    Some(employee.name.clone()),
                    serde_json::json!({"phone": &req.phone}),
                )
                .await;
            Ok(ok(EmployeeLoginResponse {
                employee_id,
                employee,
            }))
        }
        Err(e) => {
            if matches!(e, AppError::Authentication(_)) {
                state
                    .audit()
                    .log(
                        AuditAction::LoginFailed,
                        "auth",
                        &req.phone,
                        None,
                        None,
                        serde_json::json!({"reason": "invalid_credentials"}),
                    )
                    .await;
            }
            Err(e)
        }
    }
}

/// GET /api/auth/me - identity as resolved by the boundary guard
pub async fn me(Extension(ctx): Extension<AuthContext>) -> AppResult<Json<AppResponse<MeResponse>>> {
    Ok(ok(MeResponse {
        id: ctx.stamp(),
        kind: ctx.kind,
        name: ctx.name.clone(),
        expires_at: ctx.expires_at,
    }))
}
