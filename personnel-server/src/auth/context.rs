//! Request authentication context
//!
//! Built once per request by the session layer and passed explicitly into
//! every repository and mutator call. Business logic never reads ambient
//! "current user" state.

use surrealdb::RecordId;

use crate::db::models::PrincipalKind;
use crate::utils::{AppError, AppResult};

/// Resolved caller identity
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal_id: RecordId,
    pub kind: PrincipalKind,
    pub name: String,
    /// Unix millis; set for administrator sessions only
    pub expires_at: Option<i64>,
}

impl AuthContext {
    pub fn admin(principal_id: RecordId, name: impl Into<String>, expires_at: i64) -> Self {
        Self {
            principal_id,
            kind: PrincipalKind::Admin,
            name: name.into(),
            expires_at: Some(expires_at),
        }
    }

    pub fn employee(principal_id: RecordId, name: impl Into<String>) -> Self {
        Self {
            principal_id,
            kind: PrincipalKind::Employee,
            name: name.into(),
            expires_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.kind == PrincipalKind::Admin
    }

    /// Administrator-only operations call this first
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator session required"))
        }
    }

    /// Self-service operations require the caller to own the target record
    pub fn require_owner(&self, owner: &RecordId) -> AppResult<()> {
        if self.kind == PrincipalKind::Employee && &self.principal_id == owner {
            Ok(())
        } else {
            Err(AppError::forbidden("Not the owner of this record"))
        }
    }

    /// Value stamped into `created_by`/`updated_by`
    pub fn stamp(&self) -> String {
        self.principal_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_check_rejects_other_principals() {
        let me: RecordId = "employee:me".parse().unwrap();
        let other: RecordId = "employee:other".parse().unwrap();
        let ctx = AuthContext::employee(me.clone(), "Me");

        assert!(ctx.require_owner(&me).is_ok());
        assert!(matches!(
            ctx.require_owner(&other),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn admin_context_is_not_an_owner() {
        // Self-service paths are employee-only; administrators use the
        // administrator endpoints instead.
        let target: RecordId = "employee:someone".parse().unwrap();
        let ctx = AuthContext::admin("admin:boss".parse().unwrap(), "Boss", i64::MAX);
        assert!(ctx.require_owner(&target).is_err());
        assert!(ctx.require_admin().is_ok());
    }

    #[test]
    fn employee_context_fails_admin_check() {
        let ctx = AuthContext::employee("employee:e1".parse().unwrap(), "E");
        assert!(matches!(
            ctx.require_admin(),
            Err(AppError::Authorization(_))
        ));
    }
}
