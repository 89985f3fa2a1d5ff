//! Employment Model
//!
//! One employment document per employee. Attendance days and leave requests
//! are embedded arrays, so every mutation rewrites the whole array; the
//! `version` field is the optimistic write guard for those rewrites.

use super::serde_helpers;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Employment ID type
pub type EmploymentId = RecordId;

/// Attendance day status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
}

/// One attendance day; at most one entry per date per employment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub date: NaiveDate,
    /// Unix millis of the check-in
    pub check_in_at: i64,
    /// Unix millis of the check-out, absent until checked out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_at: Option<i64>,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_late: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_early_check_out: bool,
}

/// Leave request status.
///
/// `pending` is the only non-terminal state. Cancellation removes the entry
/// from the array instead of storing a status, so no variant exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// Administrator decision on a pending leave request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl LeaveDecision {
    pub fn status(self) -> LeaveStatus {
        match self {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// Embedded leave request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    /// Inclusive day count, minimum 1
    pub total_days: i64,
    pub status: LeaveStatus,
    /// Unix millis of the application
    pub applied_at: i64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub was_edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<i64>,
    /// Approver display name, best-effort at decision time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_name: Option<String>,
}

/// New leave request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApply {
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// Leave edit payload; only pending requests accept edits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveEdit {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Employment model matching the store schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<EmploymentId>,
    #[serde(with = "serde_helpers::record_id")]
    pub employee: RecordId,
    /// Monotonic document version; every array rewrite bumps it
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub attendance: Vec<AttendanceEntry>,
    #[serde(default)]
    pub leaves: Vec<LeaveRequest>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl Employment {
    /// Attendance entry for a date, if any
    pub fn attendance_on(&self, date: NaiveDate) -> Option<&AttendanceEntry> {
        self.attendance.iter().find(|a| a.date == date)
    }

    /// Leave request by its embedded id
    pub fn leave_by_id(&self, leave_id: &str) -> Option<&LeaveRequest> {
        self.leaves.iter().find(|l| l.id == leave_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_status_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::HalfDay).unwrap(),
            "\"half-day\""
        );
        assert_eq!(
            serde_json::from_str::<AttendanceStatus>("\"late\"").unwrap(),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn leave_status_has_no_cancelled_variant() {
        assert!(serde_json::from_str::<LeaveStatus>("\"cancelled\"").is_err());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(!LeaveStatus::Pending.is_terminal());
    }

    #[test]
    fn leave_type_serializes_under_type_key() {
        let apply: LeaveApply = serde_json::from_value(serde_json::json!({
            "type": "casual",
            "start_date": "2024-01-01",
            "end_date": "2024-01-03",
            "reason": "family"
        }))
        .unwrap();
        assert_eq!(apply.leave_type, "casual");
    }

    #[test]
    fn legacy_employment_defaults_to_version_zero() {
        let raw = serde_json::json!({ "employee": "employee:abc" });
        let employment: Employment = serde_json::from_value(raw).unwrap();
        assert_eq!(employment.version, 0);
        assert!(employment.attendance.is_empty());
        assert!(employment.leaves.is_empty());
    }
}
