//! Concurrent attendance writes against one employment document.
//!
//! Two check-ins for the same date race through the full store. The version
//! guard lets exactly one through; the loser must come back as a duplicate
//! conflict, and the stored document must hold a single entry for the date.

use chrono::{NaiveDate, NaiveTime};
use personnel_server::auth::AuthContext;
use personnel_server::db::models::EmployeeCreate;
use personnel_server::{AppError, Config, ServerState};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn t(s: &str) -> NaiveTime {
    s.parse().unwrap()
}

async fn seeded_state() -> (ServerState, AuthContext, String, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await;

    let admin = AuthContext::admin("admin:boss".parse().unwrap(), "Boss", i64::MAX);
    let employee = state
        .employees()
        .create(
            &admin,
            EmployeeCreate {
                name: "Asha".into(),
                phone: "9200000001".into(),
                password: "secret1".into(),
                tax_id: None,
                assign_employee_id: Some(false),
                secondary_education: vec![],
            },
        )
        .await
        .unwrap();

    let employee_thing = employee.id.clone().unwrap();
    let employee_id = employee_thing.to_string();
    state
        .employments()
        .create_for_employee(&admin, &employee_id)
        .await
        .unwrap();

    let owner = AuthContext::employee(employee_thing, employee.name.clone());
    (state, owner, employee_id, tmp)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_date_double_check_in_admits_exactly_one() {
    let (state, owner, employee_id, _tmp) = seeded_state().await;
    let date = d("2024-03-11");

    let first = {
        let repo = state.employments().clone();
        let ctx = owner.clone();
        let id = employee_id.clone();
        tokio::spawn(async move { repo.check_in(&ctx, &id, date, t("08:55:00"), 1_000).await })
    };
    let second = {
        let repo = state.employments().clone();
        let ctx = owner.clone();
        let id = employee_id.clone();
        tokio::spawn(async move { repo.check_in(&ctx, &id, date, t("08:56:00"), 2_000).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one writer may record the date");

    let loss = results.iter().find(|r| r.is_err()).unwrap();
    assert!(
        matches!(loss, Err(AppError::Conflict(_))),
        "loser must surface as a duplicate conflict, got: {loss:?}"
    );

    let stored = state
        .employments()
        .find_by_employee(&employee_id)
        .await
        .unwrap()
        .unwrap();
    let entries: Vec<_> = stored.attendance.iter().filter(|a| a.date == date).collect();
    assert_eq!(entries.len(), 1, "one attendance entry per date");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_dates_do_not_contend() {
    let (state, owner, employee_id, _tmp) = seeded_state().await;

    let monday = {
        let repo = state.employments().clone();
        let ctx = owner.clone();
        let id = employee_id.clone();
        tokio::spawn(async move {
            repo.check_in(&ctx, &id, d("2024-03-11"), t("08:55:00"), 1_000)
                .await
        })
    };
    let tuesday = {
        let repo = state.employments().clone();
        let ctx = owner.clone();
        let id = employee_id.clone();
        tokio::spawn(async move {
            repo.check_in(&ctx, &id, d("2024-03-12"), t("08:55:00"), 2_000)
                .await
        })
    };

    // Different dates still share the document, so one writer may lose the
    // version race; that loss is retryable, not a duplicate.
    let mut recorded = 0;
    for result in [monday.await.unwrap(), tuesday.await.unwrap()] {
        match result {
            Ok(_) => recorded += 1,
            Err(AppError::Concurrency(_)) => {}
            Err(e) => panic!("unexpected failure: {e}"),
        }
    }
    assert!(recorded >= 1);

    let stored = state
        .employments()
        .find_by_employee(&employee_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.attendance.len(), recorded);
}
