//! Administrator account handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::audit::{AuditAction, create_delete_details, create_diff, create_snapshot};
use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::db::models::{Admin, AdminCreate, AdminUpdate};
use crate::db::repository::Repository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

const RESOURCE: &str = "admin";

/// GET /api/admins - list administrator accounts
pub async fn list(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Vec<Admin>>>> {
    ctx.require_admin()?;
    let admins = state.admins().find_all().await?;
    Ok(ok(admins))
}

/// GET /api/admins/:id - fetch one administrator
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Admin>>> {
    ctx.require_admin()?;
    let admin = state
        .admins()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Admin {} not found", id)))?;
    Ok(ok(admin))
}

/// POST /api/admins - create an administrator account
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<AdminCreate>,
) -> AppResult<Json<AppResponse<Admin>>> {
    let admin = state.admins().create(&ctx, payload).await?;

    let id = admin.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    state
        .audit()
        .log(
            AuditAction::AdminCreated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_snapshot(&admin, RESOURCE),
        )
        .await;

    Ok(ok(admin))
}

/// PUT /api/admins/:id - update an administrator account
pub async fn update(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<AdminUpdate>,
) -> AppResult<Json<AppResponse<Admin>>> {
    // Old value feeds the audit diff
    let old = state
        .admins()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Admin {} not found", id)))?;

    let admin = state.admins().update(&ctx, &id, payload).await?;

    state
        .audit()
        .log(
            AuditAction::AdminUpdated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_diff(&old, &admin, RESOURCE),
        )
        .await;

    Ok(ok(admin))
}

/// DELETE /api/admins/:id - remove an administrator account
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let name_for_audit = state
        .admins()
        .find_by_id(&id)
        .await
        .ok()
        .flatten()
        .map(|a| a.name.clone())
        .unwrap_or_default();

    let result = state.admins().delete(&ctx, &id).await?;

    if result {
        state
            .audit()
            .log(
                AuditAction::AdminDeleted,
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
