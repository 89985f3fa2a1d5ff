//! Counter Repository
//!
//! One document per entity kind at `counter:<kind>`. The increment is a
//! single statement, so the store runs it as one transaction; under
//! contention the losing writer's commit error surfaces as
//! [`AppError::Concurrency`](crate::utils::AppError) and nothing here
//! retries.

use super::BaseRepository;
use crate::db::models::Counter;
use crate::utils::{AppError, AppResult};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct CounterRepository {
    base: BaseRepository,
}

impl CounterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn thing(kind: &str) -> RecordId {
        RecordId::from_table_key("counter", kind)
    }

    /// Reserve the next integer for a kind, creating the counter lazily
    pub async fn increment(&self, kind: &str, now: i64) -> AppResult<Counter> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPSERT $thing SET
                    last_number = (last_number ?? 0) + 1,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", Self::thing(kind)))
            .bind(("now", now))
            .await?;

        let counter: Option<Counter> = result.take(0)?;
        counter.ok_or_else(|| AppError::store("Counter increment returned no record"))
    }

    /// Record the formatted id for a reservation.
    ///
    /// Guarded on `last_number` so a slow writer can never overwrite the
    /// formatted id of a later reservation with a stale one.
    pub async fn record_formatted(
        &self,
        kind: &str,
        number: i64,
        formatted: &str,
    ) -> AppResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET last_id = $formatted WHERE last_number = $number")
            .bind(("thing", Self::thing(kind)))
            .bind(("formatted", formatted.to_string()))
            .bind(("number", number))
            .await?;
        Ok(())
    }

    /// Current counter state for a kind, if one exists yet
    pub async fn get(&self, kind: &str) -> AppResult<Option<Counter>> {
        let counter: Option<Counter> = self.base.db().select(Self::thing(kind)).await?;
        Ok(counter)
    }
}
