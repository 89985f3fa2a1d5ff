//! Employee Repository
//!
//! Reads run legacy documents through the schema migrator and persist the
//! upgraded shape exactly once. Writes go through the uniqueness checks and
//! never null a stored credential the payload omitted.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, Repository};
use crate::auth::AuthContext;
use crate::db::models::{
    EMPLOYEE_SCHEMA_VERSION, Employee, EmployeeCreate, EmployeeSelfUpdate, EmployeeUpdate,
    EmploymentStatus, SecondaryEducation, validate_education,
};
use crate::migrate;
use crate::sequence::{EntityKind, SequenceService};
use crate::uniqueness::{UniquenessService, validate_tax_id};
use crate::utils::{AppError, AppResult, time};

#[derive(Clone)]
pub struct EmployeeRepository {
    base: BaseRepository,
    uniqueness: UniquenessService,
    sequences: SequenceService,
}

impl EmployeeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            uniqueness: UniquenessService::new(db.clone()),
            sequences: SequenceService::new(db),
        }
    }

    /// Validate the education invariants and give entries missing an id a
    /// fresh one
    fn prepare_education(
        mut entries: Vec<SecondaryEducation>,
    ) -> AppResult<Vec<SecondaryEducation>> {
        validate_education(&entries).map_err(AppError::validation)?;
        for entry in &mut entries {
            if entry.id.is_empty() {
                entry.id = Uuid::new_v4().to_string();
            }
        }
        Ok(entries)
    }

    /// Commit an upgraded document shape back to the store.
    ///
    /// Guarded on the stored version so two concurrent readers of the same
    /// legacy document cannot rewrite it twice.
    async fn persist_migration(&self, employee: &Employee) -> AppResult<()> {
        let Some(thing) = employee.id.clone() else {
            return Ok(());
        };
        self.base
            .db()
            .query(
                r#"UPDATE $thing SET
                    secondary_education = $education,
                    twelfth = NONE,
                    diploma = NONE,
                    schema_version = $version
                WHERE (schema_version ?? 1) < $version"#,
            )
            .bind(("thing", thing))
            .bind(("education", employee.secondary_education.clone()))
            .bind(("version", EMPLOYEE_SCHEMA_VERSION))
            .await?;
        Ok(())
    }

    /// Shared write path for the administrator and self-service variants.
    /// Authorization has already been checked by the caller.
    async fn apply_update(
        &self,
        ctx: &AuthContext,
        existing: &Employee,
        mut data: EmployeeUpdate,
    ) -> AppResult<Employee> {
        let thing = existing
            .id
            .clone()
            .ok_or_else(|| AppError::store("Employee document has no id"))?;

        if let Some(ref phone) = data.phone
            && phone != &existing.phone
        {
            self.uniqueness
                .ensure_phone_free(phone, Some(&thing))
                .await?;
        }

        let tax_id = match data.tax_id.take() {
            Some(raw) => {
                let tax_id = validate_tax_id(&raw)?;
                if existing.tax_id.as_deref() != Some(tax_id.as_str()) {
                    self.uniqueness
                        .ensure_tax_id_free(&tax_id, Some(&thing))
                        .await?;
                }
                Some(tax_id)
            }
            None => None,
        };

        let secondary_education = match data.secondary_education.take() {
            Some(entries) => Some(Self::prepare_education(entries)?),
            None => None,
        };

        // Absent password keeps the stored hash untouched under MERGE
        let password_hash = match data.password.take() {
            Some(password) => {
                if password.len() < 6 {
                    return Err(AppError::validation(
                        "Password must be at least 6 characters",
                    ));
                }
                Some(
                    Employee::hash_password(&password)
                        .map_err(|e| AppError::store(format!("Failed to hash password: {e}")))?,
                )
            }
            None => None,
        };

        // Keep the denormalized flag in step with the status field when the
        // payload only sets one of them
        let resigned = match (data.resigned, data.employment_status) {
            (None, Some(status)) => Some(status == EmploymentStatus::Resigned),
            (flag, _) => flag,
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
            tax_id: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            employment_status: Option<EmploymentStatus>,
            #[serde(skip_serializing_if = "Option::is_none")]
            resigned: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            resignation_date: Option<chrono::NaiveDate>,
            #[serde(skip_serializing_if = "Option::is_none")]
            secondary_education: Option<Vec<SecondaryEducation>>,
            updated_at: i64,
            updated_by: String,
        }

        let merge = Merge {
            name: data.name,
            phone: data.phone,
            password_hash,
            tax_id,
            is_active: data.is_active,
            employment_status: data.employment_status,
            resigned,
            resignation_date: data.resignation_date,
            secondary_education,
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
            .take::<Option<Employee>>(0)?
            .ok_or_else(|| AppError::not_found("Employee not found"))
    }

    /// Narrow self-service variant. The caller must be the employee being
    /// edited; administrator-only fields are not part of the payload type.
    pub async fn update_self(
        &self,
        ctx: &AuthContext,
        id: &str,
        data: EmployeeSelfUpdate,
    ) -> AppResult<Employee> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))?;
        let owner = existing
            .id
            .clone()
            .ok_or_else(|| AppError::store("Employee document has no id"))?;
        ctx.require_owner(&owner)?;
        self.apply_update(ctx, &existing, EmployeeUpdate::from(data))
            .await
    }

    pub async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Employee>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE phone = $phone LIMIT 1")
            .bind(("phone", phone.to_string()))
            .await?;
        let employees: Vec<Employee> = result.take(0)?;
        let mut employee = employees.into_iter().next();
        if let Some(ref mut employee) = employee
            && migrate::upgrade_employee(employee)
        {
            self.persist_migration(employee).await?;
        }
        Ok(employee)
    }
}

impl Repository<Employee, EmployeeCreate, EmployeeUpdate> for EmployeeRepository {
    async fn find_all(&self) -> AppResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self
            .base
            .db()
            .query("SELECT * FROM employee ORDER BY name")
            .await?
            .take(0)?;
        // Listings serve the upgraded shape without the per-document write
        for employee in &mut employees {
            migrate::upgrade_employee(employee);
        }
        Ok(employees)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Employee>> {
        let thing = self.base.parse_id(id)?;
        let employee: Option<Employee> = self.base.db().select(thing).await?;
        match employee {
            Some(mut employee) => {
                if migrate::upgrade_employee(&mut employee) {
                    self.persist_migration(&employee).await?;
                }
                Ok(Some(employee))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, ctx: &AuthContext, data: EmployeeCreate) -> AppResult<Employee> {
        ctx.require_admin()?;
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }
        if data.phone.trim().is_empty() {
            return Err(AppError::validation("Phone must not be empty"));
        }
        if data.password.len() < 6 {
            return Err(AppError::validation("Password must be at least 6 characters"));
        }
        let secondary_education = Self::prepare_education(data.secondary_education)?;
        let tax_id = match data.tax_id {
            Some(ref raw) => Some(validate_tax_id(raw)?),
            None => None,
        };

        self.uniqueness.ensure_phone_free(&data.phone, None).await?;
        if let Some(ref tax_id) = tax_id {
            self.uniqueness.ensure_tax_id_free(tax_id, None).await?;
        }

        let employee_id = if data.assign_employee_id.unwrap_or(true) {
            Some(
                self.sequences
                    .reserve_next(EntityKind::Employee)
                    .await?
                    .formatted,
            )
        } else {
            None
        };

        let hash = Employee::hash_password(&data.password)
            .map_err(|e| AppError::store(format!("Failed to hash password: {e}")))?;
        let now = time::now_millis();

        #[derive(Serialize)]
        struct NewEmployee {
            #[serde(skip_serializing_if = "Option::is_none")]
            employee_id: Option<String>,
            name: String,
            phone: String,
            password_hash: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            tax_id: Option<String>,
            is_active: bool,
            employment_status: EmploymentStatus,
            resigned: bool,
            secondary_education: Vec<SecondaryEducation>,
            schema_version: i32,
            created_at: i64,
            created_by: String,
            updated_at: i64,
            updated_by: String,
        }

        let content = NewEmployee {
            employee_id,
            name: data.name,
            phone: data.phone,
            password_hash: hash,
            tax_id,
            is_active: true,
            employment_status: EmploymentStatus::Working,
            resigned: false,
            secondary_education,
            schema_version: EMPLOYEE_SCHEMA_VERSION,
            created_at: now,
            created_by: ctx.stamp(),
            updated_at: now,
            updated_by: ctx.stamp(),
        };

        let mut result = self
            .base
            .db()
            .query("CREATE employee CONTENT $data RETURN AFTER")
            .bind(("data", content))
            .await?;

        let created: Option<Employee> = result.take(0)?;
        created.ok_or_else(|| AppError::store("Failed to create employee"))
    }

    async fn update(&self, ctx: &AuthContext, id: &str, data: EmployeeUpdate) -> AppResult<Employee> {
        ctx.require_admin()?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))?;
        self.apply_update(ctx, &existing, data).await
    }

    async fn delete(&self, ctx: &AuthContext, id: &str) -> AppResult<bool> {
        ctx.require_admin()?;
        let thing = self.base.parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
