//! Counter Model
//!
//! One counter document per id-generating entity kind, keyed
//! `counter:<kind>`. Created lazily on first reservation, never deleted.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Counter document for one entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Last integer handed out; the next reservation returns this + 1
    pub last_number: i64,
    /// Last formatted id handed out (e.g. EMP007)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
}
