//! Employment Repository
//!
//! Attendance days and leave requests live as arrays inside one employment
//! document, so every mutation is read array, change it in memory, write the
//! whole array back. The write carries the version the reader saw and only
//! lands while the stored version still matches; a miss surfaces as a
//! concurrency failure instead of silently clobbering the other writer.

use chrono::{NaiveDate, NaiveTime};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::warn;
use uuid::Uuid;

use super::BaseRepository;
use crate::auth::AuthContext;
use crate::db::models::{
    Admin, AttendanceEntry, AttendanceStatus, Employee, Employment, LeaveApply, LeaveDecision,
    LeaveEdit, LeaveRequest, LeaveStatus,
};
use crate::utils::{AppError, AppResult, time};

/// Attendance policy knobs, sourced from configuration
#[derive(Debug, Clone, Copy)]
pub struct AttendanceRules {
    /// Check-ins strictly after this wall-clock time are marked late
    pub late_after: NaiveTime,
    /// Check-outs strictly before this wall-clock time are flagged early
    pub early_out_before: NaiveTime,
    /// Worked hours below this downgrade the day to half-day
    pub half_day_hours: f64,
}

impl Default for AttendanceRules {
    fn default() -> Self {
        Self {
            late_after: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            early_out_before: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            half_day_hours: 4.0,
        }
    }
}

#[derive(Clone)]
pub struct EmploymentRepository {
    base: BaseRepository,
    rules: AttendanceRules,
}

impl EmploymentRepository {
    pub fn new(db: Surreal<Db>, rules: AttendanceRules) -> Self {
        Self {
            base: BaseRepository::new(db),
            rules,
        }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Employment>> {
        let employments: Vec<Employment> = self
            .base
            .db()
            .query("SELECT * FROM employment")
            .await?
            .take(0)?;
        Ok(employments)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Employment>> {
        let thing = self.base.parse_id(id)?;
        let employment: Option<Employment> = self.base.db().select(thing).await?;
        Ok(employment)
    }

    pub async fn find_by_employee(&self, employee_id: &str) -> AppResult<Option<Employment>> {
        let employee = self.base.parse_id(employee_id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employment WHERE employee = $employee LIMIT 1")
            .bind(("employee", employee))
            .await?;
        let employments: Vec<Employment> = result.take(0)?;
        Ok(employments.into_iter().next())
    }

    async fn require_for_employee(&self, employee_id: &str) -> AppResult<Employment> {
        self.find_by_employee(employee_id).await?.ok_or_else(|| {
            AppError::not_found(format!("No employment record for {}", employee_id))
        })
    }

    pub async fn create_for_employee(
        &self,
        ctx: &AuthContext,
        employee_id: &str,
    ) -> AppResult<Employment> {
        ctx.require_admin()?;
        let employee_thing = self.base.parse_id(employee_id)?;
        let employee: Option<Employee> = self.base.db().select(employee_thing.clone()).await?;
        if employee.is_none() {
            return Err(AppError::not_found(format!(
                "Employee {} not found",
                employee_id
            )));
        }
        if self.find_by_employee(employee_id).await?.is_some() {
            return Err(AppError::conflict(
                "Employment record already exists for this employee",
            ));
        }

        let now = time::now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE employment SET
                    employee = $employee,
                    version = 0,
                    attendance = [],
                    leaves = [],
                    created_at = $now,
                    created_by = $by,
                    updated_at = $now,
                    updated_by = $by
                RETURN AFTER"#,
            )
            .bind(("employee", employee_thing))
            .bind(("now", now))
            .bind(("by", ctx.stamp()))
            .await?;

        let created: Option<Employment> = result.take(0)?;
        created.ok_or_else(|| AppError::store("Failed to create employment record"))
    }

    /// Removes the employment record. The employee document is untouched.
    pub async fn delete(&self, ctx: &AuthContext, id: &str) -> AppResult<bool> {
        ctx.require_admin()?;
        let thing = self.base.parse_id(id)?;

        if self.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found(format!("Employment {} not found", id)));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Write both arrays back, guarded on the version the caller read.
    /// `Ok(None)` means the stored version moved underneath us.
    async fn commit(
        &self,
        ctx: &AuthContext,
        next: &Employment,
        expected_version: i64,
    ) -> AppResult<Option<Employment>> {
        let thing = next
            .id
            .clone()
            .ok_or_else(|| AppError::store("Employment document has no id"))?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    attendance = $attendance,
                    leaves = $leaves,
                    version = version + 1,
                    updated_at = $now,
                    updated_by = $by
                WHERE version = $expected
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("attendance", next.attendance.clone()))
            .bind(("leaves", next.leaves.clone()))
            .bind(("now", time::now_millis()))
            .bind(("by", ctx.stamp()))
            .bind(("expected", expected_version))
            .await?;
        Ok(result.take::<Option<Employment>>(0)?)
    }

    /// A lost check-in write is a duplicate if the winner recorded the same
    /// date, otherwise a plain retryable conflict
    async fn classify_check_in_loss(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> AppResult<Employment> {
        let current = self.require_for_employee(employee_id).await?;
        if current.attendance_on(date).is_some() {
            Err(AppError::conflict(format!(
                "Attendance already recorded for {}",
                date
            )))
        } else {
            Err(AppError::concurrency(
                "Attendance write conflicted, please retry",
            ))
        }
    }

    pub async fn check_in(
        &self,
        ctx: &AuthContext,
        employee_id: &str,
        date: NaiveDate,
        clock: NaiveTime,
        now: i64,
    ) -> AppResult<Employment> {
        let employment = self.require_for_employee(employee_id).await?;
        ctx.require_owner(&employment.employee)?;

        if employment.attendance_on(date).is_some() {
            return Err(AppError::conflict(format!(
                "Attendance already recorded for {}",
                date
            )));
        }

        let late = clock > self.rules.late_after;
        let entry = AttendanceEntry {
            date,
            check_in_at: now,
            check_out_at: None,
            status: if late {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            },
            total_hours: None,
            is_late: late,
            is_early_check_out: false,
        };

        let expected = employment.version;
        let mut next = employment;
        next.attendance.push(entry);

        match self.commit(ctx, &next, expected).await {
            Ok(Some(saved)) => Ok(saved),
            Ok(None) => self.classify_check_in_loss(employee_id, date).await,
            Err(AppError::Concurrency(_)) => self.classify_check_in_loss(employee_id, date).await,
            Err(e) => Err(e),
        }
    }

    pub async fn check_out(
        &self,
        ctx: &AuthContext,
        employee_id: &str,
        date: NaiveDate,
        clock: NaiveTime,
        now: i64,
    ) -> AppResult<Employment> {
        let employment = self.require_for_employee(employee_id).await?;
        ctx.require_owner(&employment.employee)?;

        let expected = employment.version;
        let mut next = employment;
        let Some(entry) = next.attendance.iter_mut().find(|a| a.date == date) else {
            return Err(AppError::not_found(format!(
                "No check-in recorded for {}",
                date
            )));
        };
        if entry.check_out_at.is_some() {
            return Err(AppError::validation(format!(
                "Already checked out for {}",
                date
            )));
        }

        let total = time::millis_to_hours(now - entry.check_in_at);
        entry.check_out_at = Some(now);
        entry.total_hours = Some(total);
        if total < self.rules.half_day_hours {
            entry.status = AttendanceStatus::HalfDay;
        }
        entry.is_early_check_out = clock < self.rules.early_out_before;

        self.commit(ctx, &next, expected)
            .await?
            .ok_or_else(|| AppError::concurrency("Attendance write conflicted, please retry"))
    }

    pub async fn apply_leave(
        &self,
        ctx: &AuthContext,
        employee_id: &str,
        data: LeaveApply,
        now: i64,
    ) -> AppResult<Employment> {
        let employment = self.require_for_employee(employee_id).await?;
        ctx.require_owner(&employment.employee)?;

        if data.end_date < data.start_date {
            return Err(AppError::validation("End date must not be before start date"));
        }

        let leave = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            leave_type: data.leave_type,
            start_date: data.start_date,
            end_date: data.end_date,
            reason: data.reason,
            total_days: time::inclusive_days(data.start_date, data.end_date),
            status: LeaveStatus::Pending,
            applied_at: now,
            was_edited: false,
            approved_by: None,
            approved_at: None,
            approver_name: None,
        };

        let expected = employment.version;
        let mut next = employment;
        next.leaves.push(leave);

        self.commit(ctx, &next, expected)
            .await?
            .ok_or_else(|| AppError::concurrency("Leave write conflicted, please retry"))
    }

    pub async fn edit_leave(
        &self,
        ctx: &AuthContext,
        employee_id: &str,
        leave_id: &str,
        data: LeaveEdit,
    ) -> AppResult<Employment> {
        let employment = self.require_for_employee(employee_id).await?;
        ctx.require_owner(&employment.employee)?;

        let expected = employment.version;
        let mut next = employment;
        let Some(leave) = next.leaves.iter_mut().find(|l| l.id == leave_id) else {
            return Err(AppError::not_found("Leave request not found"));
        };
        if leave.status.is_terminal() {
            return Err(AppError::validation(
                "Only pending leave requests can be edited",
            ));
        }

        if let Some(leave_type) = data.leave_type {
            leave.leave_type = leave_type;
        }
        if let Some(start_date) = data.start_date {
            leave.start_date = start_date;
        }
        if let Some(end_date) = data.end_date {
            leave.end_date = end_date;
        }
        if let Some(reason) = data.reason {
            leave.reason = reason;
        }
        if leave.end_date < leave.start_date {
            return Err(AppError::validation("End date must not be before start date"));
        }
        leave.total_days = time::inclusive_days(leave.start_date, leave.end_date);
        leave.was_edited = true;

        self.commit(ctx, &next, expected)
            .await?
            .ok_or_else(|| AppError::concurrency("Leave write conflicted, please retry"))
    }

    /// Cancellation removes the entry from the array; there is no stored
    /// cancelled status
    pub async fn cancel_leave(
        &self,
        ctx: &AuthContext,
        employee_id: &str,
        leave_id: &str,
    ) -> AppResult<Employment> {
        let employment = self.require_for_employee(employee_id).await?;
        ctx.require_owner(&employment.employee)?;

        let expected = employment.version;
        let mut next = employment;
        let Some(pos) = next.leaves.iter().position(|l| l.id == leave_id) else {
            return Err(AppError::not_found("Leave request not found"));
        };
        if next.leaves[pos].status.is_terminal() {
            return Err(AppError::validation(
                "Only pending leave requests can be cancelled",
            ));
        }
        next.leaves.remove(pos);

        self.commit(ctx, &next, expected)
            .await?
            .ok_or_else(|| AppError::concurrency("Leave write conflicted, please retry"))
    }

    pub async fn decide_leave(
        &self,
        ctx: &AuthContext,
        employee_id: &str,
        leave_id: &str,
        decision: LeaveDecision,
        now: i64,
    ) -> AppResult<Employment> {
        ctx.require_admin()?;
        let employment = self.require_for_employee(employee_id).await?;
        let approver_name = self.approver_display_name(ctx).await;

        let expected = employment.version;
        let mut next = employment;
        let Some(leave) = next.leaves.iter_mut().find(|l| l.id == leave_id) else {
            return Err(AppError::not_found("Leave request not found"));
        };
        if leave.status != LeaveStatus::Pending {
            return Err(AppError::validation("Leave request is already decided"));
        }
        leave.status = decision.status();
        leave.approved_by = Some(ctx.stamp());
        leave.approved_at = Some(now);
        leave.approver_name = Some(approver_name);

        self.commit(ctx, &next, expected)
            .await?
            .ok_or_else(|| AppError::concurrency("Leave write conflicted, please retry"))
    }

    /// Current display name of the deciding administrator. Lookup failures
    /// degrade to the name carried by the session instead of failing the
    /// decision.
    async fn approver_display_name(&self, ctx: &AuthContext) -> String {
        let fetched: Result<Option<Admin>, surrealdb::Error> =
            self.base.db().select(ctx.principal_id.clone()).await;
        match fetched {
            Ok(Some(admin)) => admin.name,
            Ok(None) => ctx.name.clone(),
            Err(e) => {
                warn!(target: "store", error = %e, "Approver name lookup failed");
                ctx.name.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use tempfile::TempDir;

    fn admin_ctx() -> AuthContext {
        AuthContext::admin("admin:test".parse().unwrap(), "Test Admin", i64::MAX)
    }

    fn owner_ctx() -> AuthContext {
        AuthContext::employee("employee:asha".parse().unwrap(), "Asha")
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    async fn seeded() -> (Surreal<Db>, EmploymentRepository, TempDir) {
        let (db, tmp) = test_db().await;
        db.query(
            "CREATE employee:asha SET name = 'Asha', phone = '9200000001', password_hash = 'x', schema_version = 2",
        )
        .await
        .unwrap();
        let repo = EmploymentRepository::new(db.clone(), AttendanceRules::default());
        repo.create_for_employee(&admin_ctx(), "employee:asha")
            .await
            .unwrap();
        (db, repo, tmp)
    }

    #[tokio::test]
    async fn one_employment_per_employee() {
        let (_db, repo, _tmp) = seeded().await;
        let err = repo
            .create_for_employee(&admin_ctx(), "employee:asha")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_requires_existing_employee() {
        let (db, _tmp) = test_db().await;
        let repo = EmploymentRepository::new(db, AttendanceRules::default());
        let err = repo
            .create_for_employee(&admin_ctx(), "employee:ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_record_but_not_the_employee() {
        let (db, repo, _tmp) = seeded().await;
        let employment = repo.find_by_employee("employee:asha").await.unwrap().unwrap();
        let id = employment.id.unwrap().to_string();

        assert!(repo.delete(&admin_ctx(), &id).await.unwrap());
        assert!(repo.find_by_id(&id).await.unwrap().is_none());

        let employee: Option<Employee> = db.select(("employee", "asha")).await.unwrap();
        assert!(employee.is_some());
    }

    #[tokio::test]
    async fn delete_requires_admin() {
        let (_db, repo, _tmp) = seeded().await;
        let employment = repo.find_by_employee("employee:asha").await.unwrap().unwrap();
        let id = employment.id.unwrap().to_string();

        let err = repo.delete(&owner_ctx(), &id).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn check_in_marks_late_after_cutoff() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();

        let saved = repo
            .check_in(&ctx, "employee:asha", d("2024-01-15"), t("09:30:00"), 1_000)
            .await
            .unwrap();
        let entry = saved.attendance_on(d("2024-01-15")).unwrap();
        assert_eq!(entry.status, AttendanceStatus::Late);
        assert!(entry.is_late);
        assert_eq!(entry.check_in_at, 1_000);

        let saved = repo
            .check_in(&ctx, "employee:asha", d("2024-01-16"), t("09:00:00"), 2_000)
            .await
            .unwrap();
        let entry = saved.attendance_on(d("2024-01-16")).unwrap();
        assert_eq!(entry.status, AttendanceStatus::Present);
        assert!(!entry.is_late);
    }

    #[tokio::test]
    async fn duplicate_check_in_for_date_conflicts() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();

        repo.check_in(&ctx, "employee:asha", d("2024-01-15"), t("09:00:00"), 1_000)
            .await
            .unwrap();
        let err = repo
            .check_in(&ctx, "employee:asha", d("2024-01-15"), t("09:05:00"), 2_000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn check_in_is_owner_only() {
        let (_db, repo, _tmp) = seeded().await;

        let err = repo
            .check_in(
                &admin_ctx(),
                "employee:asha",
                d("2024-01-15"),
                t("09:00:00"),
                1_000,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));

        let stranger = AuthContext::employee("employee:other".parse().unwrap(), "Other");
        let err = repo
            .check_in(
                &stranger,
                "employee:asha",
                d("2024-01-15"),
                t("09:00:00"),
                1_000,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn check_out_computes_hours() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();
        let date = d("2024-01-15");

        repo.check_in(&ctx, "employee:asha", date, t("09:00:00"), 0)
            .await
            .unwrap();
        let nine_hours = 9 * 3_600_000;
        let saved = repo
            .check_out(&ctx, "employee:asha", date, t("18:00:00"), nine_hours)
            .await
            .unwrap();
        let entry = saved.attendance_on(date).unwrap();
        assert_eq!(entry.check_out_at, Some(nine_hours));
        assert_eq!(entry.total_hours, Some(9.0));
        assert_eq!(entry.status, AttendanceStatus::Present);
        assert!(!entry.is_early_check_out);
    }

    #[tokio::test]
    async fn short_day_downgrades_to_half_day() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();
        let date = d("2024-01-15");

        // Late morning, then out after three hours
        repo.check_in(&ctx, "employee:asha", date, t("09:30:00"), 0)
            .await
            .unwrap();
        let three_hours = 3 * 3_600_000;
        let saved = repo
            .check_out(&ctx, "employee:asha", date, t("12:30:00"), three_hours)
            .await
            .unwrap();
        let entry = saved.attendance_on(date).unwrap();
        assert_eq!(entry.status, AttendanceStatus::HalfDay);
        // The late flag survives the status downgrade
        assert!(entry.is_late);
        assert!(entry.is_early_check_out);
    }

    #[tokio::test]
    async fn check_out_requires_an_open_entry() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();
        let date = d("2024-01-15");

        let err = repo
            .check_out(&ctx, "employee:asha", date, t("17:30:00"), 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        repo.check_in(&ctx, "employee:asha", date, t("09:00:00"), 0)
            .await
            .unwrap();
        repo.check_out(&ctx, "employee:asha", date, t("17:30:00"), 1_000)
            .await
            .unwrap();
        let err = repo
            .check_out(&ctx, "employee:asha", date, t("18:00:00"), 2_000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    fn leave_payload(start: &str, end: &str) -> LeaveApply {
        LeaveApply {
            leave_type: "casual".to_string(),
            start_date: d(start),
            end_date: d(end),
            reason: "family function".to_string(),
        }
    }

    #[tokio::test]
    async fn leave_days_are_counted_inclusive() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();

        let saved = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-01-01", "2024-01-03"),
                1_000,
            )
            .await
            .unwrap();
        let leave = &saved.leaves[0];
        assert_eq!(leave.total_days, 3);
        assert_eq!(leave.status, LeaveStatus::Pending);
        assert!(!leave.id.is_empty());
        assert_eq!(leave.applied_at, 1_000);

        let saved = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-02-05", "2024-02-05"),
                2_000,
            )
            .await
            .unwrap();
        assert_eq!(saved.leaves[1].total_days, 1);

        let err = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-03-10", "2024-03-01"),
                3_000,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn leave_edit_recomputes_days_and_marks_edited() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();

        let saved = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-01-01", "2024-01-03"),
                1_000,
            )
            .await
            .unwrap();
        let leave_id = saved.leaves[0].id.clone();

        let saved = repo
            .edit_leave(
                &ctx,
                "employee:asha",
                &leave_id,
                LeaveEdit {
                    end_date: Some(d("2024-01-05")),
                    reason: Some("longer trip".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let leave = saved.leave_by_id(&leave_id).unwrap();
        assert_eq!(leave.total_days, 5);
        assert_eq!(leave.reason, "longer trip");
        assert!(leave.was_edited);
    }

    #[tokio::test]
    async fn decided_leave_rejects_further_edits() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();

        let saved = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-01-01", "2024-01-03"),
                1_000,
            )
            .await
            .unwrap();
        let leave_id = saved.leaves[0].id.clone();

        repo.decide_leave(
            &admin_ctx(),
            "employee:asha",
            &leave_id,
            LeaveDecision::Approved,
            2_000,
        )
        .await
        .unwrap();

        let err = repo
            .edit_leave(
                &ctx,
                "employee:asha",
                &leave_id,
                LeaveEdit {
                    reason: Some("too late".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = repo
            .cancel_leave(&ctx, "employee:asha", &leave_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn cancel_removes_the_pending_entry() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();

        let saved = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-01-01", "2024-01-03"),
                1_000,
            )
            .await
            .unwrap();
        let leave_id = saved.leaves[0].id.clone();

        let saved = repo
            .cancel_leave(&ctx, "employee:asha", &leave_id)
            .await
            .unwrap();
        assert!(saved.leaves.is_empty());

        let err = repo
            .cancel_leave(&ctx, "employee:asha", &leave_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn deciding_stamps_the_approver() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();
        let admin = admin_ctx();

        let saved = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-01-01", "2024-01-03"),
                1_000,
            )
            .await
            .unwrap();
        let first = saved.leaves[0].id.clone();
        let saved = repo
            .apply_leave(
                &ctx,
                "employee:asha",
                leave_payload("2024-02-01", "2024-02-02"),
                1_500,
            )
            .await
            .unwrap();
        let second = saved.leaves[1].id.clone();

        let saved = repo
            .decide_leave(&admin, "employee:asha", &first, LeaveDecision::Approved, 2_000)
            .await
            .unwrap();
        let leave = saved.leave_by_id(&first).unwrap();
        assert_eq!(leave.status, LeaveStatus::Approved);
        assert_eq!(leave.approved_by.as_deref(), Some("admin:test"));
        assert_eq!(leave.approved_at, Some(2_000));
        // No admin:test record exists, so the session name is used
        assert_eq!(leave.approver_name.as_deref(), Some("Test Admin"));

        let saved = repo
            .decide_leave(&admin, "employee:asha", &second, LeaveDecision::Rejected, 2_500)
            .await
            .unwrap();
        assert_eq!(
            saved.leave_by_id(&second).unwrap().status,
            LeaveStatus::Rejected
        );

        // Terminal states accept no further decision
        let err = repo
            .decide_leave(&admin, "employee:asha", &first, LeaveDecision::Rejected, 3_000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // And deciding is administrator-only
        let err = repo
            .decide_leave(&ctx, "employee:asha", &second, LeaveDecision::Approved, 3_000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn every_mutation_bumps_the_version() {
        let (_db, repo, _tmp) = seeded().await;
        let ctx = owner_ctx();
        let date = d("2024-01-15");

        let before = repo
            .find_by_employee("employee:asha")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.version, 0);

        let saved = repo
            .check_in(&ctx, "employee:asha", date, t("09:00:00"), 0)
            .await
            .unwrap();
        assert_eq!(saved.version, 1);

        let saved = repo
            .check_out(&ctx, "employee:asha", date, t("17:30:00"), 3_600_000 * 8)
            .await
            .unwrap();
        assert_eq!(saved.version, 2);
    }
}
