//! Administrator Repository

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, Repository};
use crate::auth::AuthContext;
use crate::db::models::{Admin, AdminCreate, AdminUpdate};
use crate::uniqueness::UniquenessService;
use crate::utils::{AppError, AppResult, time};

#[derive(Clone)]
pub struct AdminRepository {
    base: BaseRepository,
    uniqueness: UniquenessService,
}

impl AdminRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            uniqueness: UniquenessService::new(db),
        }
    }

    fn validate_create(data: &AdminCreate) -> AppResult<()> {
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }
        if data.phone.trim().is_empty() {
            return Err(AppError::validation("Phone must not be empty"));
        }
        if data.password.len() < 6 {
            return Err(AppError::validation("Password must be at least 6 characters"));
        }
        Ok(())
    }
}

impl Repository<Admin, AdminCreate, AdminUpdate> for AdminRepository {
    async fn find_all(&self) -> AppResult<Vec<Admin>> {
        let admins: Vec<Admin> = self
            .base
            .db()
            .query("SELECT * FROM admin ORDER BY name")
            .await?
            .take(0)?;
        Ok(admins)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Admin>> {
        let thing = self.base.parse_id(id)?;
        let admin: Option<Admin> = self.base.db().select(thing).await?;
        Ok(admin)
    }

    async fn create(&self, ctx: &AuthContext, data: AdminCreate) -> AppResult<Admin> {
        ctx.require_admin()?;
        Self::validate_create(&data)?;
        self.uniqueness.ensure_phone_free(&data.phone, None).await?;

        let hash = Admin::hash_password(&data.password)
            .map_err(|e| AppError::store(format!("Failed to hash password: {e}")))?;
        let now = time::now_millis();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE admin SET
                    name = $name,
                    phone = $phone,
                    password_hash = $hash,
                    is_active = true,
                    created_at = $now,
                    created_by = $by,
                    updated_at = $now,
                    updated_by = $by
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("phone", data.phone))
            .bind(("hash", hash))
            .bind(("now", now))
            .bind(("by", ctx.stamp()))
            .await?;

        let created: Option<Admin> = result.take(0)?;
        created.ok_or_else(|| AppError::store("Failed to create admin"))
    }

    async fn update(&self, ctx: &AuthContext, id: &str, data: AdminUpdate) -> AppResult<Admin> {
        ctx.require_admin()?;
        let thing = self.base.parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Admin {} not found", id)))?;

        if let Some(ref new_phone) = data.phone
            && new_phone != &existing.phone
        {
            self.uniqueness
                .ensure_phone_free(new_phone, existing.id.as_ref())
                .await?;
        }

        // Absent keys stay untouched under MERGE, so an omitted password
        // keeps the stored hash.
        let password_hash = match data.password {
            Some(ref password) => {
                if password.len() < 6 {
                    return Err(AppError::validation(
                        "Password must be at least 6 characters",
                    ));
                }
                Some(
                    Admin::hash_password(password)
                        .map_err(|e| AppError::store(format!("Failed to hash password: {e}")))?,
                )
            }
            None => None,
        };

        #[derive(Serialize)]
        struct Merge {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            phone: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            password_hash: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
            updated_at: i64,
            updated_by: String,
        }

        let merge = Merge {
            name: data.name,
            phone: data.phone,
            password_hash,
            is_active: data.is_active,
            updated_at: time::now_millis(),
            updated_by: ctx.stamp(),
        };

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing MERGE $data RETURN AFTER")
            .bind(("thing", thing))
            .bind(("data", merge))
            .await?;

        result
            .take::<Option<Admin>>(0)?
            .ok_or_else(|| AppError::not_found(format!("Admin {} not found", id)))
    }

    async fn delete(&self, ctx: &AuthContext, id: &str) -> AppResult<bool> {
        ctx.require_admin()?;
        let thing = self.base.parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Admin {} not found", id)))?;

        // Deleting the account behind the current session would lock the
        // caller out mid-flight.
        if thing == ctx.principal_id {
            return Err(AppError::validation("Cannot delete your own account"));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn admin_ctx() -> AuthContext {
        AuthContext::admin("admin:test".parse().unwrap(), "Test Admin", i64::MAX)
    }

    fn employee_ctx() -> AuthContext {
        AuthContext::employee("employee:worker".parse().unwrap(), "Worker")
    }

    fn create_payload(name: &str, phone: &str) -> AdminCreate {
        AdminCreate {
            name: name.to_string(),
            phone: phone.to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_fetch_roundtrip() {
        let (db, _tmp) = test_db().await;
        let repo = AdminRepository::new(db);
        let ctx = admin_ctx();

        let created = repo
            .create(&ctx, create_payload("Boss", "9100000001"))
            .await
            .unwrap();
        assert_eq!(created.name, "Boss");
        assert!(created.is_active);
        assert_eq!(created.created_by.as_deref(), Some("admin:test"));

        let id = created.id.unwrap().to_string();
        let fetched = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched.phone, "9100000001");
        assert!(fetched.verify_password("secret1").unwrap());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_phone() {
        let (db, _tmp) = test_db().await;
        let repo = AdminRepository::new(db);
        let ctx = admin_ctx();

        repo.create(&ctx, create_payload("First", "9100000001"))
            .await
            .unwrap();
        let err = repo
            .create(&ctx, create_payload("Second", "9100000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_requires_admin_context() {
        let (db, _tmp) = test_db().await;
        let repo = AdminRepository::new(db);

        let err = repo
            .create(&employee_ctx(), create_payload("Boss", "9100000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn update_without_password_keeps_stored_hash() {
        let (db, _tmp) = test_db().await;
        let repo = AdminRepository::new(db);
        let ctx = admin_ctx();

        let created = repo
            .create(&ctx, create_payload("Boss", "9100000001"))
            .await
            .unwrap();
        let id = created.id.unwrap().to_string();

        let updated = repo
            .update(
                &ctx,
                &id,
                AdminUpdate {
                    name: Some("Renamed".to_string()),
                    phone: None,
                    password: None,
                    is_active: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert!(updated.verify_password("secret1").unwrap());

        let updated = repo
            .update(
                &ctx,
                &id,
                AdminUpdate {
                    name: None,
                    phone: None,
                    password: Some("newpass99".to_string()),
                    is_active: None,
                },
            )
            .await
            .unwrap();
        assert!(updated.verify_password("newpass99").unwrap());
        assert!(!updated.verify_password("secret1").unwrap());
    }

    #[tokio::test]
    async fn cannot_delete_own_account() {
        let (db, _tmp) = test_db().await;
        let repo = AdminRepository::new(db);
        let ctx = admin_ctx();

        let created = repo
            .create(&ctx, create_payload("Other", "9100000002"))
            .await
            .unwrap();
        let other_id = created.id.unwrap();

        // Context whose principal is the freshly created admin
        let self_ctx = AuthContext::admin(other_id.clone(), "Other", i64::MAX);
        let err = repo
            .delete(&self_ctx, &other_id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // A different admin may delete it
        assert!(repo.delete(&ctx, &other_id.to_string()).await.unwrap());
        assert!(repo.find_by_id(&other_id.to_string()).await.unwrap().is_none());
    }
}
