//! Sequential id reservation under concurrency.
//!
//! Uses ServerState::initialize for a full store, then hammers the employee
//! counter from parallel tasks. Losing writers retry on Concurrency; the
//! final set of ids must be distinct and contiguous with no gaps.

use personnel_server::sequence::{EntityKind, ReservedId, SequenceService};
use personnel_server::{AppError, Config, ServerState};
use std::time::Duration;

const WORKERS: usize = 16;
const MAX_ATTEMPTS: usize = 50;

/// Reserve one id, retrying on optimistic-concurrency losses
async fn reserve_with_retry(sequences: SequenceService, kind: EntityKind) -> ReservedId {
    for attempt in 1..=MAX_ATTEMPTS {
        match sequences.reserve_next(kind).await {
            Ok(reserved) => return reserved,
            Err(AppError::Concurrency(_)) => {
                tokio::time::sleep(Duration::from_millis(attempt as u64 * 3)).await;
            }
            Err(e) => panic!("reservation failed with non-retryable error: {e}"),
        }
    }
    panic!("reservation still conflicted after {MAX_ATTEMPTS} attempts");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_reservations_are_distinct_and_contiguous() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await;

    let tasks: Vec<_> = (0..WORKERS)
        .map(|_| {
            let sequences = state.sequences().clone();
            tokio::spawn(reserve_with_retry(sequences, EntityKind::Employee))
        })
        .collect();

    let mut reserved = Vec::with_capacity(WORKERS);
    for task in futures::future::join_all(tasks).await {
        reserved.push(task.unwrap());
    }

    let mut numbers: Vec<i64> = reserved.iter().map(|r| r.number).collect();
    numbers.sort_unstable();
    let expected: Vec<i64> = (1..=WORKERS as i64).collect();
    assert_eq!(numbers, expected, "ids must be gapless and duplicate-free");

    for r in &reserved {
        assert_eq!(r.formatted, format!("EMP{:03}", r.number));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn kinds_count_independently() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await;

    let employee = reserve_with_retry(state.sequences().clone(), EntityKind::Employee).await;
    let enquiry = reserve_with_retry(state.sequences().clone(), EntityKind::Enquiry).await;
    let employee_2 = reserve_with_retry(state.sequences().clone(), EntityKind::Employee).await;

    assert_eq!(employee.formatted, "EMP001");
    assert_eq!(enquiry.formatted, "ENQ001");
    assert_eq!(employee_2.formatted, "EMP002");
}
