//! Salary Repository
//!
//! One salary document per employee per calendar month. The period check is
//! read-then-decide like the other uniqueness rules, with the edited record
//! excluded so saving a document onto its own period is not a conflict.

use serde::Serialize;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, Repository};
use crate::auth::AuthContext;
use crate::db::models::{Employee, Salary, SalaryCreate, SalaryUpdate};
use crate::utils::{AppError, AppResult, time};

#[derive(Clone)]
pub struct SalaryRepository {
    base: BaseRepository,
}

impl SalaryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn validate_month(month: u32) -> AppResult<()> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation(format!("Invalid month {}", month)));
        }
        Ok(())
    }

    async fn period_holder(
        &self,
        employee: &RecordId,
        month: u32,
        year: i32,
    ) -> AppResult<Option<RecordId>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE id FROM salary WHERE employee = $employee AND month = $month AND year = $year LIMIT 1",
            )
            .bind(("employee", employee.clone()))
            .bind(("month", month))
            .bind(("year", year))
            .await?;
        let ids: Vec<RecordId> = result.take(0)?;
        Ok(ids.into_iter().next())
    }

    async fn ensure_period_free(
        &self,
        employee: &RecordId,
        month: u32,
        year: i32,
        exclude: Option<&RecordId>,
    ) -> AppResult<()> {
        if let Some(holder) = self.period_holder(employee, month, year).await? {
            if Some(&holder) != exclude {
                return Err(AppError::conflict(format!(
                    "Salary for {}/{} already exists for this employee",
                    month, year
                )));
            }
        }
        Ok(())
    }

    pub async fn find_by_employee(&self, employee_id: &str) -> AppResult<Vec<Salary>> {
        let employee = self.base.parse_id(employee_id)?;
        let salaries: Vec<Salary> = self
            .base
            .db()
            .query("SELECT * FROM salary WHERE employee = $employee ORDER BY year, month")
            .bind(("employee", employee))
            .await?
            .take(0)?;
        Ok(salaries)
    }
}

impl Repository<Salary, SalaryCreate, SalaryUpdate> for SalaryRepository {
    async fn find_all(&self) -> AppResult<Vec<Salary>> {
        let salaries: Vec<Salary> = self
            .base
            .db()
            .query("SELECT * FROM salary ORDER BY year, month")
            .await?
            .take(0)?;
        Ok(salaries)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Salary>> {
        let thing = self.base.parse_id(id)?;
        let salary: Option<Salary> = self.base.db().select(thing).await?;
        Ok(salary)
    }

    async fn create(&self, ctx: &AuthContext, data: SalaryCreate) -> AppResult<Salary> {
        ctx.require_admin()?;
        Self::validate_month(data.month)?;
        let employee_thing = self.base.parse_id(&data.employee)?;
        let employee: Option<Employee> = self.base.db().select(employee_thing.clone()).await?;
        if employee.is_none() {
            return Err(AppError::not_found(format!(
                "Employee {} not found",
                data.employee
            )));
        }
        self.ensure_period_free(&employee_thing, data.month, data.year, None)
            .await?;

        let now = time::now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE salary SET
                    employee = $employee,
                    month = $month,
                    year = $year,
                    basic = $basic,
                    allowances = $allowances,
                    deductions = $deductions,
                    net = $net,
                    created_at = $now,
                    created_by = $by,
                    updated_at = $now,
                    updated_by = $by
                RETURN AFTER"#,
            )
            .bind(("employee", employee_thing))
            .bind(("month", data.month))
            .bind(("year", data.year))
            .bind(("basic", data.basic))
            .bind(("allowances", data.allowances))
            .bind(("deductions", data.deductions))
            .bind(("net", data.net()))
            .bind(("now", now))
            .bind(("by", ctx.stamp()))
            .await?;

        let created: Option<Salary> = result.take(0)?;
        created.ok_or_else(|| AppError::store("Failed to create salary"))
    }

    async fn update(&self, ctx: &AuthContext, id: &str, data: SalaryUpdate) -> AppResult<Salary> {
        ctx.require_admin()?;
        let thing = self.base.parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Salary {} not found", id)))?;

        let month = data.month.unwrap_or(existing.month);
        let year = data.year.unwrap_or(existing.year);
        let basic = data.basic.unwrap_or(existing.basic);
        let allowances = data.allowances.unwrap_or(existing.allowances);
        let deductions = data.deductions.unwrap_or(existing.deductions);

        Self::validate_month(month)?;
        if (month, year) != (existing.month, existing.year) {
            self.ensure_period_free(&existing.employee, month, year, existing.id.as_ref())
                .await?;
        }

        #[derive(Serialize)]
        struct Merge {
            month: u32,
            year: i32,
            basic: f64,
            allowances: f64,
            deductions: f64,
            net: f64,
            updated_at: i64,
            updated_by: String,
        }

        let merge = Merge {
            month,
            year,
            basic,
            allowances,
            deductions,
            net: basic + allowances - deductions,
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
            .take::<Option<Salary>>(0)?
            .ok_or_else(|| AppError::not_found(format!("Salary {} not found", id)))
    }

    async fn delete(&self, ctx: &AuthContext, id: &str) -> AppResult<bool> {
        ctx.require_admin()?;
        let thing = self.base.parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Salary {} not found", id)))?;
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

    fn payload(month: u32, year: i32) -> SalaryCreate {
        SalaryCreate {
            employee: "employee:asha".to_string(),
            month,
            year,
            basic: 50_000.0,
            allowances: 5_000.0,
            deductions: 2_000.0,
        }
    }

    async fn seeded() -> (SalaryRepository, tempfile::TempDir) {
        let (db, tmp) = test_db().await;
        db.query("CREATE employee:asha SET name = 'Asha', phone = '9200000001', password_hash = 'x', schema_version = 2")
            .await
            .unwrap();
        (SalaryRepository::new(db), tmp)
    }

    #[tokio::test]
    async fn create_computes_net_pay() {
        let (repo, _tmp) = seeded().await;
        let created = repo.create(&admin_ctx(), payload(1, 2024)).await.unwrap();
        assert_eq!(created.net, 53_000.0);
        assert_eq!(created.month, 1);
        assert_eq!(created.created_by.as_deref(), Some("admin:test"));
    }

    #[tokio::test]
    async fn create_rejects_unknown_employee_and_bad_month() {
        let (repo, _tmp) = seeded().await;

        let mut bad = payload(1, 2024);
        bad.employee = "employee:ghost".to_string();
        let err = repo.create(&admin_ctx(), bad).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = repo
            .create(&admin_ctx(), payload(13, 2024))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn one_salary_per_employee_per_period() {
        let (repo, _tmp) = seeded().await;
        let ctx = admin_ctx();

        repo.create(&ctx, payload(1, 2024)).await.unwrap();
        let err = repo.create(&ctx, payload(1, 2024)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Same month of a different year is a different period
        repo.create(&ctx, payload(1, 2025)).await.unwrap();
        assert_eq!(repo.find_by_employee("employee:asha").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_recomputes_net_and_checks_the_new_period() {
        let (repo, _tmp) = seeded().await;
        let ctx = admin_ctx();

        repo.create(&ctx, payload(1, 2024)).await.unwrap();
        let feb = repo.create(&ctx, payload(2, 2024)).await.unwrap();
        let feb_id = feb.id.unwrap().to_string();

        // Raising the basic in place recomputes the net
        let updated = repo
            .update(
                &ctx,
                &feb_id,
                SalaryUpdate {
                    basic: Some(60_000.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.net, 63_000.0);

        // Moving onto an occupied period conflicts
        let err = repo
            .update(
                &ctx,
                &feb_id,
                SalaryUpdate {
                    month: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Re-saving its own period is fine
        let same = repo
            .update(
                &ctx,
                &feb_id,
                SalaryUpdate {
                    month: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.month, 2);
    }

    #[tokio::test]
    async fn writes_are_administrator_only() {
        let (repo, _tmp) = seeded().await;
        let ctx = AuthContext::employee("employee:asha".parse().unwrap(), "Asha");
        let err = repo.create(&ctx, payload(1, 2024)).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
