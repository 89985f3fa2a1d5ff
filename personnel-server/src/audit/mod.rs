//! Audit Trail
//!
//! Every mutating operation appends an immutable, hash-chained entry.
//! The chain can be re-verified at any time to prove nothing was altered
//! or removed after the fact.

pub mod diff;
pub mod storage;
pub mod types;

pub use diff::{create_delete_details, create_diff, create_snapshot};
pub use storage::AuditStorage;
pub use types::{
    AuditAction, AuditEntry, AuditListResponse, AuditQuery, ChainBreak, ChainVerification,
};
