//! Sequential id generation
//!
//! Hands out unique, strictly increasing human-readable ids (EMP007) backed
//! by one counter document per entity kind. The underlying increment is a
//! single store transaction; under contention the loser gets
//! `AppError::Concurrency` and the caller decides whether to retry the whole
//! operation. This service never retries.

use std::str::FromStr;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::CounterRepository;
use crate::utils::{AppError, AppResult, time};

/// Entity kinds that receive sequential ids.
///
/// Closed set: an unknown kind string fails at the boundary as a validation
/// error and never reaches the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Employee,
    Enquiry,
}

impl EntityKind {
    /// Counter document key (`counter:<key>`)
    pub fn key(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::Enquiry => "enquiry",
        }
    }

    /// Fixed id prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Employee => "EMP",
            EntityKind::Enquiry => "ENQ",
        }
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "employee" => Ok(EntityKind::Employee),
            "enquiry" => Ok(EntityKind::Enquiry),
            other => Err(AppError::validation(format!(
                "Unknown entity kind: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One successful reservation
#[derive(Debug, Clone)]
pub struct ReservedId {
    pub number: i64,
    pub formatted: String,
}

/// Sequential id generator over the counter store
#[derive(Clone)]
pub struct SequenceService {
    counters: CounterRepository,
}

impl SequenceService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            counters: CounterRepository::new(db),
        }
    }

    /// Reserve the next id for a kind.
    ///
    /// Concurrent callers each receive a distinct number; the numbers of the
    /// winners form a contiguous increasing run. Formatting happens here, in
    /// one place: prefix plus the number zero-padded to three digits.
    pub async fn reserve_next(&self, kind: EntityKind) -> AppResult<ReservedId> {
        let now = time::now_millis();
        let counter = self.counters.increment(kind.key(), now).await?;
        let number = counter.last_number;
        let formatted = format!("{}{:03}", kind.prefix(), number);

        self.counters
            .record_formatted(kind.key(), number, &formatted)
            .await?;

        Ok(ReservedId { number, formatted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn entity_kind_parses_known_kinds_only() {
        assert_eq!(EntityKind::from_str("employee").unwrap(), EntityKind::Employee);
        assert_eq!(EntityKind::from_str("Enquiry").unwrap(), EntityKind::Enquiry);
        assert!(matches!(
            EntityKind::from_str("payroll"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn first_reservation_starts_at_one() {
        let (db, _tmp) = test_db().await;
        let seq = SequenceService::new(db);

        let reserved = seq.reserve_next(EntityKind::Employee).await.unwrap();
        assert_eq!(reserved.number, 1);
        assert_eq!(reserved.formatted, "EMP001");
    }

    #[tokio::test]
    async fn reservations_are_contiguous() {
        let (db, _tmp) = test_db().await;
        let seq = SequenceService::new(db);

        for expected in 1..=7 {
            let reserved = seq.reserve_next(EntityKind::Employee).await.unwrap();
            assert_eq!(reserved.number, expected);
        }
        let last = seq.reserve_next(EntityKind::Employee).await.unwrap();
        assert_eq!(last.formatted, "EMP008");
    }

    #[tokio::test]
    async fn kinds_count_independently() {
        let (db, _tmp) = test_db().await;
        let seq = SequenceService::new(db);

        seq.reserve_next(EntityKind::Employee).await.unwrap();
        seq.reserve_next(EntityKind::Employee).await.unwrap();
        let enq = seq.reserve_next(EntityKind::Enquiry).await.unwrap();

        assert_eq!(enq.number, 1);
        assert_eq!(enq.formatted, "ENQ001");
    }

    #[tokio::test]
    async fn counter_document_records_last_formatted_id() {
        let (db, _tmp) = test_db().await;
        let seq = SequenceService::new(db.clone());
        let counters = CounterRepository::new(db);

        seq.reserve_next(EntityKind::Employee).await.unwrap();
        seq.reserve_next(EntityKind::Employee).await.unwrap();

        let counter = counters.get("employee").await.unwrap().unwrap();
        assert_eq!(counter.last_number, 2);
        assert_eq!(counter.last_id.as_deref(), Some("EMP002"));
    }

    #[tokio::test]
    async fn numbers_past_padding_width_keep_growing() {
        let (db, _tmp) = test_db().await;
        let seq = SequenceService::new(db.clone());

        // Position the counter just below the padding boundary
        db.query("UPSERT counter:enquiry SET last_number = 999, updated_at = 0")
            .await
            .unwrap();

        let reserved = seq.reserve_next(EntityKind::Enquiry).await.unwrap();
        assert_eq!(reserved.number, 1000);
        assert_eq!(reserved.formatted, "ENQ1000");
    }
}
