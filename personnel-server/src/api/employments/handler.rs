//! Employment record handlers
//!
//! The server owns the clock: check-in and check-out stamp the store-local
//! date and wall time here, never a client-supplied one.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::Deserialize;

use crate::audit::{AuditAction, create_snapshot};
use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::db::models::{Employment, LeaveApply, LeaveDecision, LeaveEdit};
use crate::utils::{AppError, AppResponse, AppResult, ok, time};

const RESOURCE: &str = "employment";

fn employment_id(employment: &Employment) -> String {
    employment
        .id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default()
}

/// GET /api/employments - list all employment records
pub async fn list(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Vec<Employment>>>> {
    ctx.require_admin()?;
    let employments = state.employments().find_all().await?;
    Ok(ok(employments))
}

/// GET /api/employments/self - the caller's own employment record
pub async fn get_own(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employee_id = ctx.stamp();
    let employment = state
        .employments()
        .find_by_employee(&employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("No employment record for this employee"))?;
    ctx.require_owner(&employment.employee)?;
    Ok(ok(employment))
}

/// GET /api/employments/employee/:employee_id - employment record for one employee
pub async fn get_by_employee(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(employee_id): Path<String>,
) -> AppResult<Json<AppResponse<Employment>>> {
    ctx.require_admin()?;
    let employment = state
        .employments()
        .find_by_employee(&employee_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("No employment record for {}", employee_id))
        })?;
    Ok(ok(employment))
}

/// GET /api/employments/:id - one employment record by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Employment>>> {
    ctx.require_admin()?;
    let employment = state
        .employments()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employment {} not found", id)))?;
    Ok(ok(employment))
}

/// POST /api/employments/employee/:employee_id - open an employment record
pub async fn create_for_employee(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(employee_id): Path<String>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employment = state
        .employments()
        .create_for_employee(&ctx, &employee_id)
        .await?;

    state
        .audit()
        .log(
            AuditAction::EmploymentCreated,
            RESOURCE,
            &employment_id(&employment),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            serde_json::json!({"employee": employee_id}),
        )
        .await;

    Ok(ok(employment))
}

/// DELETE /api/employments/:id - remove an employment record
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let employee_for_audit = state
        .employments()
        .find_by_id(&id)
        .await
        .ok()
        .flatten()
        .map(|e| e.employee.to_string())
        .unwrap_or_default();

    let result = state.employments().delete(&ctx, &id).await?;

    if result {
        state
            .audit()
            .log(
                AuditAction::EmploymentDeleted,
                RESOURCE,
                &id,
                Some(ctx.stamp()),
                Some(ctx.name.clone()),
                serde_json::json!({"employee": employee_for_audit}),
            )
            .await;
    }

    Ok(ok(result))
}

/// POST /api/employments/self/check-in - record today's arrival
pub async fn check_in(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employee_id = ctx.stamp();
    let date = time::today_local();
    let employment = state
        .employments()
        .check_in(
            &ctx,
            &employee_id,
            date,
            time::local_clock(),
            time::now_millis(),
        )
        .await?;

    let details = employment
        .attendance_on(date)
        .map(|entry| create_snapshot(entry, "attendance"))
        .unwrap_or_else(|| serde_json::json!({"date": date.to_string()}));
    state
        .audit()
        .log(
            AuditAction::AttendanceCheckedIn,
            RESOURCE,
            &employment_id(&employment),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            details,
        )
        .await;

    Ok(ok(employment))
}

/// POST /api/employments/self/check-out - close today's attendance entry
pub async fn check_out(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employee_id = ctx.stamp();
    let date = time::today_local();
    let employment = state
        .employments()
        .check_out(
            &ctx,
            &employee_id,
            date,
            time::local_clock(),
            time::now_millis(),
        )
        .await?;

    let details = employment
        .attendance_on(date)
        .map(|entry| create_snapshot(entry, "attendance"))
        .unwrap_or_else(|| serde_json::json!({"date": date.to_string()}));
    state
        .audit()
        .log(
            AuditAction::AttendanceCheckedOut,
            RESOURCE,
            &employment_id(&employment),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            details,
        )
        .await;

    Ok(ok(employment))
}

/// POST /api/employments/self/leaves - apply for leave
pub async fn apply_leave(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<LeaveApply>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employee_id = ctx.stamp();
    let details = create_snapshot(&payload, "leave");
    let employment = state
        .employments()
        .apply_leave(&ctx, &employee_id, payload, time::now_millis())
        .await?;

    state
        .audit()
        .log(
            AuditAction::LeaveApplied,
            RESOURCE,
            &employment_id(&employment),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            details,
        )
        .await;

    Ok(ok(employment))
}

/// PUT /api/employments/self/leaves/:leave_id - edit a pending leave request
pub async fn edit_leave(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(leave_id): Path<String>,
    Json(payload): Json<LeaveEdit>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employee_id = ctx.stamp();
    let employment = state
        .employments()
        .edit_leave(&ctx, &employee_id, &leave_id, payload)
        .await?;

    let details = employment
        .leave_by_id(&leave_id)
        .map(|leave| create_snapshot(leave, "leave"))
        .unwrap_or_else(|| serde_json::json!({"leave_id": &leave_id}));
    state
        .audit()
        .log(
            AuditAction::LeaveEdited,
            RESOURCE,
            &employment_id(&employment),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            details,
        )
        .await;

    Ok(ok(employment))
}

/// DELETE /api/employments/self/leaves/:leave_id - cancel a pending leave request
pub async fn cancel_leave(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(leave_id): Path<String>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employee_id = ctx.stamp();
    let employment = state
        .employments()
        .cancel_leave(&ctx, &employee_id, &leave_id)
        .await?;

    state
        .audit()
        .log(
            AuditAction::LeaveCancelled,
            RESOURCE,
            &employment_id(&employment),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            serde_json::json!({"leave_id": &leave_id}),
        )
        .await;

    Ok(ok(employment))
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: LeaveDecision,
}

/// POST /api/employments/employee/:employee_id/leaves/:leave_id/decision
///
/// Administrator approves or rejects a pending leave request.
pub async fn decide_leave(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path((employee_id, leave_id)): Path<(String, String)>,
    Json(payload): Json<DecisionRequest>,
) -> AppResult<Json<AppResponse<Employment>>> {
    let employment = state
        .employments()
        .decide_leave(
            &ctx,
            &employee_id,
            &leave_id,
            payload.decision,
            time::now_millis(),
        )
        .await?;

    let action = match payload.decision {
        LeaveDecision::Approved => AuditAction::LeaveApproved,
        LeaveDecision::Rejected => AuditAction::LeaveRejected,
    };
    let details = employment
        .leave_by_id(&leave_id)
        .map(|leave| create_snapshot(leave, "leave"))
        .unwrap_or_else(|| serde_json::json!({"leave_id": &leave_id}));
    state
        .audit()
        .log(
            action,
            RESOURCE,
            &employment_id(&employment),
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            details,
        )
        .await;

    Ok(ok(employment))
}
