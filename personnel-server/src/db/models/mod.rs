//! Database Models

// Serde helpers
pub mod serde_helpers;

// Credentials
pub mod password;

// Principals
pub mod admin;
pub mod employee;
pub mod principal;

// Records
pub mod employment;
pub mod enquiry;
pub mod salary;

// Sessions and counters
pub mod counter;
pub mod session;

// Re-exports
pub use admin::{Admin, AdminCreate, AdminId, AdminUpdate};
pub use counter::Counter;
pub use employee::{
    EMPLOYEE_SCHEMA_VERSION, EducationTag, Employee, EmployeeCreate, EmployeeId,
    EmployeeSelfUpdate, EmployeeUpdate, EmploymentStatus, LegacyEducation, SecondaryEducation,
};
pub use employment::{
    AttendanceEntry, AttendanceStatus, Employment, EmploymentId, LeaveApply, LeaveDecision,
    LeaveEdit, LeaveRequest, LeaveStatus,
};
pub use enquiry::{Enquiry, EnquiryCreate, EnquiryId};
pub use principal::{Principal, PrincipalKind};
pub use salary::{Salary, SalaryCreate, SalaryId, SalaryUpdate};
pub use session::{AdminSession, SessionId};
