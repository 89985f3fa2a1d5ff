//! Salary Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Salary ID type
pub type SalaryId = RecordId;

/// Salary record; at most one per (employee, month, year)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SalaryId>,
    #[serde(with = "serde_helpers::record_id")]
    pub employee: RecordId,
    /// Calendar month 1-12
    pub month: u32,
    pub year: i32,
    pub basic: f64,
    #[serde(default)]
    pub allowances: f64,
    #[serde(default)]
    pub deductions: f64,
    pub net: f64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Create salary payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryCreate {
    pub employee: String,
    pub month: u32,
    pub year: i32,
    pub basic: f64,
    #[serde(default)]
    pub allowances: f64,
    #[serde(default)]
    pub deductions: f64,
}

/// Update salary payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowances: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deductions: Option<f64>,
}

impl SalaryCreate {
    /// Net pay derived from the amount fields
    pub fn net(&self) -> f64 {
        self.basic + self.allowances - self.deductions
    }
}
