//! Administrator Model

use super::{password, serde_helpers};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Administrator ID type
pub type AdminId = RecordId;

/// Administrator model matching the store schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AdminId>,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
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

/// Create administrator payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreate {
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// Update administrator payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Admin {
    /// Verify password against the stored hash
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        password::verify_password(&self.password_hash, password)
    }

    /// Hash a password for storage
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        password::hash_password(password)
    }
}
