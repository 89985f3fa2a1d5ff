//! Session lifecycle
//!
//! Two independent credential flows share one phone lookup:
//! - Administrator sessions are durable records with a TTL. Validation
//!   re-reads the record on every request and logout revokes it server-side.
//! - Employee sessions are client-held only: login hands back the employee
//!   record and later calls present the employee id, which is re-checked
//!   against the store each time.

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::AuthContext;
use crate::db::models::{Admin, AdminSession, Employee, Principal};
use crate::db::repository::BaseRepository;
use crate::security_log;
use crate::uniqueness::UniquenessService;
use crate::utils::{AppError, AppResult, time};

const SESSION_TABLE: &str = "admin_session";

#[derive(Clone)]
pub struct SessionService {
    base: BaseRepository,
    uniqueness: UniquenessService,
    ttl_hours: i64,
}

impl SessionService {
    pub fn new(db: Surreal<Db>, ttl_hours: i64) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            uniqueness: UniquenessService::new(db),
            ttl_hours,
        }
    }

    /// Accepts both the full "admin_session:key" form and the bare key
    fn session_thing(&self, session_id: &str) -> AppResult<RecordId> {
        let thing: RecordId = if session_id.contains(':') {
            session_id
                .parse()
                .map_err(|_| AppError::authentication("Invalid or expired session"))?
        } else {
            RecordId::from_table_key(SESSION_TABLE, session_id)
        };
        if thing.table() != SESSION_TABLE {
            return Err(AppError::authentication("Invalid or expired session"));
        }
        Ok(thing)
    }

    pub async fn login_admin(
        &self,
        phone: &str,
        password: &str,
    ) -> AppResult<(AdminSession, Admin)> {
        let principal = self.uniqueness.resolve_principal_by_phone(phone).await?;
        let Some(Principal::Admin(admin)) = principal else {
            security_log!("WARN", "admin_login_failed", phone = phone.to_string());
            return Err(AppError::invalid_credentials());
        };
        if !admin.verify_password(password).unwrap_or(false) {
            security_log!("WARN", "admin_login_failed", phone = phone.to_string());
            return Err(AppError::invalid_credentials());
        }
        let admin_id = admin
            .id
            .clone()
            .ok_or_else(|| AppError::store("Admin document has no id"))?;

        let now = time::now_millis();
        let expires_at = now + self.ttl_hours * 3_600_000;
        let thing = RecordId::from_table_key(SESSION_TABLE, Uuid::new_v4().simple().to_string());

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE $thing SET
                    admin = $admin,
                    created_at = $now,
                    expires_at = $expires,
                    is_active = true
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("admin", admin_id.clone()))
            .bind(("now", now))
            .bind(("expires", expires_at))
            .await?;

        let session: Option<AdminSession> = result.take(0)?;
        let session = session.ok_or_else(|| AppError::store("Failed to create session"))?;
        security_log!("INFO", "admin_login", admin = admin_id.to_string());
        Ok((session, admin))
    }

    /// Resolve a session id into a request context. Fails unless the session
    /// record exists, is active, is inside its TTL and its administrator is
    /// still active.
    pub async fn validate_admin(&self, session_id: &str) -> AppResult<AuthContext> {
        let thing = self.session_thing(session_id)?;
        let session: Option<AdminSession> = self.base.db().select(thing).await?;
        let session =
            session.ok_or_else(|| AppError::authentication("Invalid or expired session"))?;
        if !session.is_valid_at(time::now_millis()) {
            return Err(AppError::authentication("Invalid or expired session"));
        }

        let admin: Option<Admin> = self.base.db().select(session.admin.clone()).await?;
        let admin = admin
            .filter(|a| a.is_active)
            .ok_or_else(|| AppError::authentication("Invalid or expired session"))?;

        Ok(AuthContext::admin(
            session.admin.clone(),
            admin.name,
            session.expires_at,
        ))
    }

    /// Revoke the server-side session record. Idempotent.
    pub async fn logout_admin(&self, session_id: &str) -> AppResult<()> {
        let thing = self.session_thing(session_id)?;
        self.base
            .db()
            .query("UPDATE $thing SET is_active = false")
            .bind(("thing", thing))
            .await?;
        security_log!("INFO", "admin_logout", session = session_id.to_string());
        Ok(())
    }

    pub async fn login_employee(&self, phone: &str, password: &str) -> AppResult<Employee> {
        let principal = self.uniqueness.resolve_principal_by_phone(phone).await?;
        let Some(Principal::Employee(employee)) = principal else {
            security_log!("WARN", "employee_login_failed", phone = phone.to_string());
            return Err(AppError::invalid_credentials());
        };
        if !employee.verify_password(password).unwrap_or(false) {
            security_log!("WARN", "employee_login_failed", phone = phone.to_string());
            return Err(AppError::invalid_credentials());
        }
        security_log!(
            "INFO",
            "employee_login",
            employee = employee
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default()
        );
        Ok(employee)
    }

    /// Resolve a client-held employee id into a request context. The record
    /// is re-read every time; possession of the id is the whole credential.
    pub async fn employee_context(&self, employee_id: &str) -> AppResult<AuthContext> {
        let thing: RecordId = employee_id
            .parse()
            .map_err(|_| AppError::authentication("Invalid employee session"))?;
        if thing.table() != "employee" {
            return Err(AppError::authentication("Invalid employee session"));
        }
        let employee: Option<Employee> = self.base.db().select(thing.clone()).await?;
        let employee = employee
            .filter(|e| e.is_active)
            .ok_or_else(|| AppError::authentication("Invalid employee session"))?;
        Ok(AuthContext::employee(thing, employee.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::password;
    use crate::db::test_db;

    async fn seed_admin(db: &Surreal<Db>) {
        let hash = password::hash_password("secret1").unwrap();
        db.query("CREATE admin:boss SET name = 'Boss', phone = '9100000001', password_hash = $hash, is_active = true")
            .bind(("hash", hash))
            .await
            .unwrap();
    }

    async fn seed_employee(db: &Surreal<Db>) {
        let hash = password::hash_password("worker1").unwrap();
        db.query("CREATE employee:asha SET name = 'Asha', phone = '9200000001', password_hash = $hash, is_active = true, schema_version = 2")
            .bind(("hash", hash))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn admin_login_issues_a_validatable_session() {
        let (db, _tmp) = test_db().await;
        seed_admin(&db).await;
        let sessions = SessionService::new(db, 24);

        let (session, admin) = sessions.login_admin("9100000001", "secret1").await.unwrap();
        assert_eq!(admin.name, "Boss");
        assert_eq!(session.expires_at - session.created_at, 24 * 3_600_000);

        let session_id = session.id.unwrap().to_string();
        let ctx = sessions.validate_admin(&session_id).await.unwrap();
        assert!(ctx.is_admin());
        assert_eq!(ctx.name, "Boss");
        assert_eq!(ctx.expires_at, Some(session.expires_at));
    }

    #[tokio::test]
    async fn failed_logins_do_not_reveal_which_part_was_wrong() {
        let (db, _tmp) = test_db().await;
        seed_admin(&db).await;
        let sessions = SessionService::new(db, 24);

        let wrong_password = sessions
            .login_admin("9100000001", "nope")
            .await
            .unwrap_err();
        let unknown_phone = sessions
            .login_admin("0000000000", "secret1")
            .await
            .unwrap_err();
        match (&wrong_password, &unknown_phone) {
            (AppError::Authentication(a), AppError::Authentication(b)) => assert_eq!(a, b),
            other => panic!("expected authentication errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn inactive_admin_cannot_login() {
        let (db, _tmp) = test_db().await;
        let hash = password::hash_password("secret1").unwrap();
        db.query("CREATE admin:gone SET name = 'Gone', phone = '9100000002', password_hash = $hash, is_active = false")
            .bind(("hash", hash))
            .await
            .unwrap();
        let sessions = SessionService::new(db, 24);

        let err = sessions
            .login_admin("9100000002", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn logout_revokes_the_server_side_session() {
        let (db, _tmp) = test_db().await;
        seed_admin(&db).await;
        let sessions = SessionService::new(db, 24);

        let (session, _) = sessions.login_admin("9100000001", "secret1").await.unwrap();
        let session_id = session.id.unwrap().to_string();
        sessions.validate_admin(&session_id).await.unwrap();

        sessions.logout_admin(&session_id).await.unwrap();
        let err = sessions.validate_admin(&session_id).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn zero_ttl_sessions_are_born_expired() {
        let (db, _tmp) = test_db().await;
        seed_admin(&db).await;
        let sessions = SessionService::new(db, 0);

        let (session, _) = sessions.login_admin("9100000001", "secret1").await.unwrap();
        let err = sessions
            .validate_admin(&session.id.unwrap().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn employee_login_and_context_resolution() {
        let (db, _tmp) = test_db().await;
        seed_employee(&db).await;
        let sessions = SessionService::new(db, 24);

        let employee = sessions
            .login_employee("9200000001", "worker1")
            .await
            .unwrap();
        let id = employee.id.unwrap().to_string();

        let ctx = sessions.employee_context(&id).await.unwrap();
        assert!(!ctx.is_admin());
        assert_eq!(ctx.name, "Asha");
        assert_eq!(ctx.expires_at, None);

        // Ids from other tables are not employee credentials
        let err = sessions.employee_context("admin:boss").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn admin_phone_cannot_use_the_employee_flow() {
        let (db, _tmp) = test_db().await;
        seed_admin(&db).await;
        seed_employee(&db).await;
        let sessions = SessionService::new(db, 24);

        let err = sessions
            .login_employee("9100000001", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }
}
