//! Audit trail handlers
//!
//! Read-only. Entries are appended by the mutation handlers; nothing in
//! the API can write or rewrite the chain.

use axum::{
    Json,
    extract::{Extension, Query, State},
};

use crate::audit::{AuditListResponse, AuditQuery, ChainVerification};
use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// GET /api/audit - filtered, paginated audit entries, newest first
pub async fn query(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Query(q): Query<AuditQuery>,
) -> AppResult<Json<AppResponse<AuditListResponse>>> {
    ctx.require_admin()?;
    let (items, total) = state.audit().query(&q).await?;
    Ok(ok(AuditListResponse { items, total }))
}

/// GET /api/audit/verify - walk the hash chain and report breaks
pub async fn verify(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<AppResponse<ChainVerification>>> {
    ctx.require_admin()?;
    let verification = state.audit().verify_chain().await?;
    Ok(ok(verification))
}
