//! Principal types
//!
//! A principal is an authenticated actor: an administrator or an employee.
//! The enum variant is the kind discriminator.

use super::{Admin, Employee};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Principal kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Admin,
    Employee,
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalKind::Admin => write!(f, "admin"),
            PrincipalKind::Employee => write!(f, "employee"),
        }
    }
}

/// Resolved principal record
#[derive(Debug, Clone)]
pub enum Principal {
    Admin(Admin),
    Employee(Employee),
}

impl Principal {
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::Admin(_) => PrincipalKind::Admin,
            Principal::Employee(_) => PrincipalKind::Employee,
        }
    }

    pub fn id(&self) -> Option<&RecordId> {
        match self {
            Principal::Admin(a) => a.id.as_ref(),
            Principal::Employee(e) => e.id.as_ref(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Principal::Admin(a) => &a.name,
            Principal::Employee(e) => &e.name,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Principal::Admin(a) => a.is_active,
            Principal::Employee(e) => e.is_active,
        }
    }
}
