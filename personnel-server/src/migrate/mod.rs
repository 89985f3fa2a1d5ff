//! Employee schema migration
//!
//! Version 1 employee documents keep secondary education in legacy
//! `twelfth`/`diploma` sub-objects; version 2 keeps a `secondary_education`
//! array. The employee repository applies [`upgrade_employee`] on read and
//! persists the result immediately, guarded on the stored version, so each
//! legacy document is rewritten exactly once rather than reconstructed on
//! every read.

use uuid::Uuid;

use crate::db::models::{
    EMPLOYEE_SCHEMA_VERSION, EducationTag, Employee, LegacyEducation, SecondaryEducation,
};

fn synthesize(tag: EducationTag, legacy: &LegacyEducation) -> SecondaryEducation {
    SecondaryEducation {
        id: Uuid::new_v4().to_string(),
        tag,
        institution: legacy.institution.clone(),
        board: legacy.board.clone(),
        year_of_passing: legacy.year_of_passing,
        percentage: legacy.percentage,
    }
}

/// Upgrade an employee document to the current shape in memory.
///
/// Legacy sub-objects become array entries with fresh ids and their original
/// fields intact; an already-populated array wins over stray legacy fields.
/// Returns whether the document changed and needs persisting.
pub fn upgrade_employee(employee: &mut Employee) -> bool {
    if employee.schema_version >= EMPLOYEE_SCHEMA_VERSION {
        return false;
    }

    if employee.secondary_education.is_empty() {
        if let Some(ref twelfth) = employee.twelfth {
            employee
                .secondary_education
                .push(synthesize(EducationTag::Twelfth, twelfth));
        }
        if let Some(ref diploma) = employee.diploma {
            employee
                .secondary_education
                .push(synthesize(EducationTag::Diploma, diploma));
        }
    }

    employee.twelfth = None;
    employee.diploma = None;
    employee.schema_version = EMPLOYEE_SCHEMA_VERSION;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_employee() -> Employee {
        serde_json::from_value(serde_json::json!({
            "name": "Asha",
            "phone": "9000000001",
            "password_hash": "x",
            "diploma": {
                "institution": "City Polytechnic",
                "board": "State Board",
                "year_of_passing": 2014,
                "percentage": 81.5
            }
        }))
        .unwrap()
    }

    #[test]
    fn diploma_only_document_gains_one_tagged_entry() {
        let mut emp = legacy_employee();
        assert!(upgrade_employee(&mut emp));

        assert_eq!(emp.schema_version, EMPLOYEE_SCHEMA_VERSION);
        assert_eq!(emp.secondary_education.len(), 1);
        let entry = &emp.secondary_education[0];
        assert_eq!(entry.tag, EducationTag::Diploma);
        assert_eq!(entry.institution.as_deref(), Some("City Polytechnic"));
        assert_eq!(entry.board.as_deref(), Some("State Board"));
        assert_eq!(entry.year_of_passing, Some(2014));
        assert_eq!(entry.percentage, Some(81.5));
        assert!(emp.diploma.is_none());
        assert!(emp.twelfth.is_none());
    }

    #[test]
    fn synthesized_entries_get_fresh_ids() {
        let mut emp = legacy_employee();
        upgrade_employee(&mut emp);
        let id = &emp.secondary_education[0].id;
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn both_legacy_objects_order_twelfth_first() {
        let mut emp: Employee = serde_json::from_value(serde_json::json!({
            "name": "Ravi",
            "phone": "9000000002",
            "password_hash": "x",
            "twelfth": { "board": "CBSE", "percentage": 72.0 },
            "diploma": { "institution": "City Polytechnic" }
        }))
        .unwrap();

        assert!(upgrade_employee(&mut emp));
        assert_eq!(emp.secondary_education.len(), 2);
        assert_eq!(emp.secondary_education[0].tag, EducationTag::Twelfth);
        assert_eq!(emp.secondary_education[1].tag, EducationTag::Diploma);
    }

    #[test]
    fn current_documents_pass_through_untouched() {
        let mut emp: Employee = serde_json::from_value(serde_json::json!({
            "name": "Meera",
            "phone": "9000000003",
            "password_hash": "x",
            "secondary_education": [{ "id": "keep-me", "tag": "twelfth" }],
            "schema_version": 2
        }))
        .unwrap();

        assert!(!upgrade_employee(&mut emp));
        assert_eq!(emp.secondary_education[0].id, "keep-me");
    }

    #[test]
    fn populated_array_wins_over_stray_legacy_fields() {
        let mut emp: Employee = serde_json::from_value(serde_json::json!({
            "name": "Dev",
            "phone": "9000000004",
            "password_hash": "x",
            "secondary_education": [{ "id": "existing", "tag": "diploma" }],
            "diploma": { "institution": "Should Not Duplicate" }
        }))
        .unwrap();

        // Version 1 (no schema_version field) with an already-populated array
        assert!(upgrade_employee(&mut emp));
        assert_eq!(emp.secondary_education.len(), 1);
        assert_eq!(emp.secondary_education[0].id, "existing");
        assert!(emp.diploma.is_none());
    }

    #[test]
    fn upgrade_is_idempotent() {
        let mut emp = legacy_employee();
        assert!(upgrade_employee(&mut emp));
        let first = emp.secondary_education.clone();
        assert!(!upgrade_employee(&mut emp));
        assert_eq!(emp.secondary_education.len(), first.len());
        assert_eq!(emp.secondary_education[0].id, first[0].id);
    }
}
