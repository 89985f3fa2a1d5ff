//! Employee Model
//!
//! Employees are principals and the parent of the employment/salary records.
//! The document shape is versioned: `schema_version` 1 kept secondary
//! education in legacy `twelfth`/`diploma` sub-objects, version 2 keeps a
//! `secondary_education` array (0-2 entries, at most one per tag).

use super::{password, serde_helpers};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Employee ID type
pub type EmployeeId = RecordId;

/// Current employee document shape version
pub const EMPLOYEE_SCHEMA_VERSION: i32 = 2;

/// Education entry tag; at most one entry per tag on an employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationTag {
    Twelfth,
    Diploma,
}

/// Secondary education entry (current shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryEducation {
    /// Entry id; empty on incoming payloads means "assign one"
    #[serde(default)]
    pub id: String,
    pub tag: EducationTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_passing: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Legacy education sub-object (schema version 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyEducation {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub year_of_passing: Option<i32>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

/// Employment status of an employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStatus {
    Working,
    Resigned,
}

impl Default for EmploymentStatus {
    fn default() -> Self {
        Self::Working
    }
}

/// Employee model matching the store schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<EmployeeId>,
    /// Formatted sequential id (e.g. EMP007); absent means none was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub name: String,
    pub phone: String,
    /// Upper-cased before storage and comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub employment_status: EmploymentStatus,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub resigned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resignation_date: Option<NaiveDate>,
    #[serde(default)]
    pub secondary_education: Vec<SecondaryEducation>,
    /// Legacy shape, only ever read; the migrator rewrites it on first read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twelfth: Option<LegacyEducation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diploma: Option<LegacyEducation>,
    /// Absent on legacy documents, hence the version-1 default
    #[serde(default = "default_schema_version")]
    pub schema_version: i32,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub updated_by: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_schema_version() -> i32 {
    1
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub name: String,
    pub phone: String,
    pub password: String,
    pub tax_id: Option<String>,
    /// Reserve a sequential employee id on create; defaults to true
    pub assign_employee_id: Option<bool>,
    #[serde(default)]
    pub secondary_education: Vec<SecondaryEducation>,
}

/// Update employee payload (administrator)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resigned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resignation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_education: Option<Vec<SecondaryEducation>>,
}

/// Update payload for the employee self-service path.
///
/// Deliberately narrower than [`EmployeeUpdate`]: activity, resignation and
/// employment status are administrator-only, so this shape cannot express
/// them and unknown payload fields are dropped on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeSelfUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_education: Option<Vec<SecondaryEducation>>,
}

impl From<EmployeeSelfUpdate> for EmployeeUpdate {
    fn from(data: EmployeeSelfUpdate) -> Self {
        Self {
            name: data.name,
            phone: data.phone,
            password: data.password,
            tax_id: data.tax_id,
            is_active: None,
            employment_status: None,
            resigned: None,
            resignation_date: None,
            secondary_education: data.secondary_education,
        }
    }
}

impl Employee {
    /// Verify password against the stored hash
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        password::verify_password(&self.password_hash, password)
    }

    /// Hash a password for storage
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        password::hash_password(password)
    }

    /// Whether this document still carries the legacy education shape
    pub fn needs_migration(&self) -> bool {
        self.schema_version < EMPLOYEE_SCHEMA_VERSION
            && self.secondary_education.is_empty()
            && (self.twelfth.is_some() || self.diploma.is_some())
    }
}

/// Check the education invariants: at most two entries, no duplicate tags.
///
/// Returns the violation message so callers can wrap it in their own
/// error type.
pub fn validate_education(entries: &[SecondaryEducation]) -> Result<(), String> {
    if entries.len() > 2 {
        return Err(format!(
            "At most 2 secondary education entries allowed, got {}",
            entries.len()
        ));
    }
    let twelfth = entries
        .iter()
        .filter(|e| e.tag == EducationTag::Twelfth)
        .count();
    let diploma = entries
        .iter()
        .filter(|e| e.tag == EducationTag::Diploma)
        .count();
    if twelfth > 1 || diploma > 1 {
        return Err("Duplicate secondary education tag".to_string());
    }
    Ok(())
}
