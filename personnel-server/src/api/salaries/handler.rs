//! Salary record handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::audit::{AuditAction, create_diff, create_snapshot};
use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::db::models::{Salary, SalaryCreate, SalaryUpdate};
use crate::db::repository::Repository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

const RESOURCE: &str = "salary";

/// GET /api/salaries - list salary records
pub async fn list(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Vec<Salary>>>> {
    ctx.require_admin()?;
    let salaries = state.salaries().find_all().await?;
    Ok(ok(salaries))
}

/// GET /api/salaries/:id - fetch one salary record
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Salary>>> {
    ctx.require_admin()?;
    let salary = state
        .salaries()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salary {} not found", id)))?;
    Ok(ok(salary))
}

/// GET /api/salaries/employee/:employee_id - salary history for one employee
pub async fn list_for_employee(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(employee_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<Salary>>>> {
    ctx.require_admin()?;
    let salaries = state.salaries().find_by_employee(&employee_id).await?;
    Ok(ok(salaries))
}

/// POST /api/salaries - create a salary record
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<SalaryCreate>,
) -> AppResult<Json<AppResponse<Salary>>> {
    let salary = state.salaries().create(&ctx, payload).await?;

    let id = salary.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    state
        .audit()
        .log(
            AuditAction::SalaryCreated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_snapshot(&salary, RESOURCE),
        )
        .await;

    Ok(ok(salary))
}

/// PUT /api/salaries/:id - update a salary record
pub async fn update(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<SalaryUpdate>,
) -> AppResult<Json<AppResponse<Salary>>> {
    // Old value feeds the audit diff
    let old = state
        .salaries()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Salary {} not found", id)))?;

    let salary = state.salaries().update(&ctx, &id, payload).await?;

    state
        .audit()
        .log(
            AuditAction::SalaryUpdated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_diff(&old, &salary, RESOURCE),
        )
        .await;

    Ok(ok(salary))
}

/// DELETE /api/salaries/:id - remove a salary record
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let result = state.salaries().delete(&ctx, &id).await?;

    if result {
        state
            .audit()
            .log(
                AuditAction::SalaryDeleted,
                RESOURCE,
                &id,
                Some(ctx.stamp()),
                Some(ctx.name.clone()),
                serde_json::json!({}),
            )
            .await;
    }

    Ok(ok(result))
}
