//! Employee record handlers
//!
//! Reads go through the repository so legacy documents are upgraded
//! before they are served.

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::audit::{AuditAction, create_delete_details, create_diff, create_snapshot};
use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::db::models::{Employee, EmployeeCreate, EmployeeSelfUpdate, EmployeeUpdate};
use crate::db::repository::Repository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

const RESOURCE: &str = "employee";

/// GET /api/employees - list employee records
pub async fn list(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Vec<Employee>>>> {
    ctx.require_admin()?;
    let employees = state.employees().find_all().await?;
    Ok(ok(employees))
}

/// GET /api/employees/:id - fetch one employee record
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Employee>>> {
    ctx.require_admin()?;
    let employee = state
        .employees()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))?;
    Ok(ok(employee))
}

/// GET /api/employees/by-phone/:phone - look up an employee by phone
pub async fn get_by_phone(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(phone): Path<String>,
) -> AppResult<Json<AppResponse<Employee>>> {
    ctx.require_admin()?;
    let employee = state
        .employees()
        .find_by_phone(&phone)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No employee with phone {}", phone)))?;
    Ok(ok(employee))
}

/// POST /api/employees - create an employee record
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<AppResponse<Employee>>> {
    let employee = state.employees().create(&ctx, payload).await?;

    let id = employee
        .id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default();
    state
        .audit()
        .log(
            AuditAction::EmployeeCreated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_snapshot(&employee, RESOURCE),
        )
        .await;

    Ok(ok(employee))
}

/// PUT /api/employees/:id - update an employee record
pub async fn update(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<AppResponse<Employee>>> {
    // Old value feeds the audit diff
    let old = state
        .employees()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))?;

    let employee = state.employees().update(&ctx, &id, payload).await?;

    state
        .audit()
        .log(
            AuditAction::EmployeeUpdated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_diff(&old, &employee, RESOURCE),
        )
        .await;

    Ok(ok(employee))
}

/// PUT /api/employees/self - employee edits their own contact details
pub async fn update_self(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<EmployeeSelfUpdate>,
) -> AppResult<Json<AppResponse<Employee>>> {
    let id = ctx.stamp();
    let old = state
        .employees()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee record not found"))?;

    let employee = state.employees().update_self(&ctx, &id, payload).await?;

    state
        .audit()
        .log(
            AuditAction::EmployeeUpdated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_diff(&old, &employee, RESOURCE),
        )
        .await;

    Ok(ok(employee))
}

/// DELETE /api/employees/:id - remove an employee record
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let name_for_audit = state
        .employees()
        .find_by_id(&id)
        .await
        .ok()
        .flatten()
        .map(|e| e.name.clone())
        .unwrap_or_default();

    let result = state.employees().delete(&ctx, &id).await?;

    if result {
        state
            .audit()
            .log(
                AuditAction::EmployeeDeleted,
                RESOURCE,
                &id,
                Some(ctx.stamp()),
                Some(ctx.name.clone()),
                create_delete_details(&name_for_audit),
            )
            .await;
    }

    Ok(ok(result))
}
