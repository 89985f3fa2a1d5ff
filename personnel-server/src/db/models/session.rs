//! Administrator Session Model
//!
//! Only administrator sessions are durable records. Employee sessions exist
//! purely client-side: the caller holds the employee record and presents the
//! employee id on every call.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Session ID type (uuid key in the admin_session table)
pub type SessionId = RecordId;

/// Durable administrator session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SessionId>,
    #[serde(with = "serde_helpers::record_id")]
    pub admin: RecordId,
    /// Unix millis of issuance
    pub created_at: i64,
    /// Unix millis after which the session is rejected
    pub expires_at: i64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl AdminSession {
    /// Whether the session is usable at the given instant
    pub fn is_valid_at(&self, now_millis: i64) -> bool {
        self.is_active && now_millis < self.expires_at
    }
}
