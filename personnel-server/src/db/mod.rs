//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) bootstrap, schema pass and the
//! model/repository layers.

pub mod models;
pub mod repository;
pub mod schema;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::core::Config;
use crate::utils::{AppError, AppResult};

/// Database service owning the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the embedded store and run the idempotent schema pass
    pub async fn new(db_path: &str, namespace: &str, database: &str) -> AppResult<Self> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::store(format!("Failed to open database: {e}")))?;

        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| AppError::store(format!("Failed to select namespace: {e}")))?;

        tracing::info!("Database opened (RocksDB at {db_path}, ns={namespace} db={database})");

        schema::define_schema(&db).await?;
        tracing::info!("Database schema defined");

        Ok(Self { db })
    }

    /// Seed the bootstrap administrator when the admin table is empty.
    ///
    /// Without one the system has no reachable login.
    pub async fn seed_default_admin(&self, config: &Config) -> AppResult<()> {
        let mut result = self
            .db
            .query("SELECT count() AS count FROM admin GROUP ALL")
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        if count.unwrap_or(0) > 0 {
            return Ok(());
        }

        let hash = models::password::hash_password(&config.default_admin_password)
            .map_err(|e| AppError::store(format!("Failed to hash bootstrap password: {e}")))?;
        let now = crate::utils::time::now_millis();

        self.db
            .query(
                r#"CREATE admin SET
                    name = $name,
                    phone = $phone,
                    password_hash = $hash,
                    is_active = true,
                    created_at = $now,
                    created_by = 'bootstrap',
                    updated_at = $now,
                    updated_by = 'bootstrap'"#,
            )
            .bind(("name", config.default_admin_name.clone()))
            .bind(("phone", config.default_admin_phone.clone()))
            .bind(("hash", hash))
            .bind(("now", now))
            .await?;

        tracing::info!(
            "Seeded bootstrap administrator '{}' ({})",
            config.default_admin_name,
            config.default_admin_phone
        );
        Ok(())
    }
}

/// Fresh tempdir-backed store for tests, schema applied.
///
/// The tempdir must outlive the handle, so both are returned.
#[cfg(test)]
pub(crate) async fn test_db() -> (Surreal<Db>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let db: Surreal<Db> = Surreal::new::<RocksDb>(tmp.path()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    schema::define_schema(&db).await.unwrap();
    (db, tmp)
}
