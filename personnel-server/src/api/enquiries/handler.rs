//! Walk-in enquiry handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::audit::{AuditAction, create_delete_details, create_snapshot};
use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::db::models::{Enquiry, EnquiryCreate};
use crate::utils::{AppError, AppResponse, AppResult, ok};

const RESOURCE: &str = "enquiry";

/// GET /api/enquiries - list enquiries, newest first
pub async fn list(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<Vec<Enquiry>>>> {
    ctx.require_admin()?;
    let enquiries = state.enquiries().find_all().await?;
    Ok(ok(enquiries))
}

/// GET /api/enquiries/:id - fetch one enquiry
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Enquiry>>> {
    ctx.require_admin()?;
    let enquiry = state
        .enquiries()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Enquiry {} not found", id)))?;
    Ok(ok(enquiry))
}

/// POST /api/enquiries - record a walk-in enquiry
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<EnquiryCreate>,
) -> AppResult<Json<AppResponse<Enquiry>>> {
    let enquiry = state.enquiries().create(&ctx, payload).await?;

    let id = enquiry.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    state
        .audit()
        .log(
            AuditAction::EnquiryCreated,
            RESOURCE,
            &id,
            Some(ctx.stamp()),
            Some(ctx.name.clone()),
            create_snapshot(&enquiry, RESOURCE),
        )
        .await;

    Ok(ok(enquiry))
}

/// DELETE /api/enquiries/:id - remove an enquiry
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let name_for_audit = state
        .enquiries()
        .find_by_id(&id)
        .await
        .ok()
        .flatten()
        .map(|e| e.name.clone())
        .unwrap_or_default();

    let result = state.enquiries().delete(&ctx, &id).await?;

    if result {
        state
            .audit()
            .log(
                AuditAction::EnquiryDeleted,
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
