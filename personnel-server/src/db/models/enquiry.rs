//! Enquiry Model
//!
//! Prospective-hire enquiries. A thin record set: it participates in the
//! tax-id uniqueness scan and receives sequential ENQ ids, nothing more.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Enquiry ID type
pub type EnquiryId = RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enquiry {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<EnquiryId>,
    /// Formatted sequential id (e.g. ENQ003)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enquiry_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Upper-cased before storage and comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Create enquiry payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnquiryCreate {
    pub name: String,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}
