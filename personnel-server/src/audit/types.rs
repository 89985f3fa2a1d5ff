//! Audit trail types
//!
//! Entries are immutable and never deleted. Each entry carries a SHA256
//! hash chained to its predecessor so tampering is detectable.

use serde::{Deserialize, Serialize};

/// Audited action (closed enum, not free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // Authentication
    LoginSuccess,
    LoginFailed,
    Logout,

    // Administrators
    AdminCreated,
    AdminUpdated,
    AdminDeleted,

    // Employees
    EmployeeCreated,
    EmployeeUpdated,
    EmployeeDeleted,

    // Employment and its embedded collections
    EmploymentCreated,
    EmploymentDeleted,
    AttendanceCheckedIn,
    AttendanceCheckedOut,
    LeaveApplied,
    LeaveEdited,
    LeaveCancelled,
    LeaveApproved,
    LeaveRejected,

    // Salaries
    SalaryCreated,
    SalaryUpdated,
    SalaryDeleted,

    // Enquiries
    EnquiryCreated,
    EnquiryDeleted,
}

/// One immutable audit entry.
///
/// `prev_hash` is the hash of the preceding entry; `curr_hash` covers
/// `prev_hash` plus every stored field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Global monotonically increasing sequence number
    pub id: u64,
    /// Unix millis
    pub timestamp: i64,
    pub action: AuditAction,
    /// Resource kind, e.g. "employee", "salary", "session"
    pub resource_type: String,
    /// Resource id, e.g. "employee:abc"
    pub resource_id: String,
    /// Acting principal; None for system events
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    /// Structured details (JSON)
    pub details: serde_json::Value,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// Audit listing filter
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    /// Unix millis, inclusive
    pub from: Option<i64>,
    /// Unix millis, inclusive
    pub to: Option<i64>,
    pub action: Option<AuditAction>,
    pub operator_id: Option<String>,
    pub resource_type: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            action: None,
            operator_id: None,
            resource_type: None,
            offset: 0,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    50
}

/// Audit listing response
#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total: u64,
}

/// Result of walking the whole hash chain
#[derive(Debug, Serialize)]
pub struct ChainVerification {
    pub total_entries: u64,
    pub chain_intact: bool,
    pub breaks: Vec<ChainBreak>,
}

/// A point where the chain no longer links up
#[derive(Debug, Serialize)]
pub struct ChainBreak {
    pub entry_id: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}
