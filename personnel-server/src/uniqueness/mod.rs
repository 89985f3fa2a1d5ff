//! Cross-collection uniqueness checks
//!
//! Phone numbers must be unique across every principal collection (admin and
//! employee); tax ids across employees and enquiries. The store offers no
//! cross-collection unique constraint, so these are read-then-decide scans: a
//! window exists between check and write, and the check screens rather than
//! guarantees.
//!
//! Phone ownership resolves through the same active-principal lookup the
//! login flows use, so a phone abandoned by a deactivated account is
//! reusable.

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::db::models::{Admin, Employee, Principal, PrincipalKind};
use crate::db::repository::BaseRepository;
use crate::utils::{AppError, AppResult};

/// Normalize a tax id: trimmed and upper-cased, both for storage and
/// for comparison
pub fn normalize_tax_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize and shape-check a tax id
pub fn validate_tax_id(raw: &str) -> AppResult<String> {
    let tax_id = normalize_tax_id(raw);
    if tax_id.len() < 5
        || tax_id.len() > 20
        || !tax_id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AppError::validation(format!("Malformed tax id: {}", raw)));
    }
    Ok(tax_id)
}

/// Cross-collection uniqueness scanner
#[derive(Clone)]
pub struct UniquenessService {
    base: BaseRepository,
}

impl UniquenessService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// First active principal holding this phone: admin first, then employee
    pub async fn resolve_principal_by_phone(&self, phone: &str) -> AppResult<Option<Principal>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM admin WHERE phone = $phone AND is_active = true LIMIT 1")
            .bind(("phone", phone.to_string()))
            .await?;
        let admins: Vec<Admin> = result.take(0)?;
        if let Some(admin) = admins.into_iter().next() {
            return Ok(Some(Principal::Admin(admin)));
        }

        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE phone = $phone AND is_active = true LIMIT 1")
            .bind(("phone", phone.to_string()))
            .await?;
        let employees: Vec<Employee> = result.take(0)?;
        Ok(employees.into_iter().next().map(Principal::Employee))
    }

    /// Which principal collection holds this phone, if any
    pub async fn find_phone_owner(&self, phone: &str) -> AppResult<Option<PrincipalKind>> {
        Ok(self
            .resolve_principal_by_phone(phone)
            .await?
            .map(|p| p.kind()))
    }

    /// Whether a phone is taken by an active principal other than `exclude`
    pub async fn is_phone_used(
        &self,
        phone: &str,
        exclude: Option<&RecordId>,
    ) -> AppResult<bool> {
        match self.resolve_principal_by_phone(phone).await? {
            Some(owner) => Ok(owner.id() != exclude),
            None => Ok(false),
        }
    }

    /// Fail with a conflict naming the owning collection when a phone is taken
    pub async fn ensure_phone_free(
        &self,
        phone: &str,
        exclude: Option<&RecordId>,
    ) -> AppResult<()> {
        if let Some(owner) = self.resolve_principal_by_phone(phone).await? {
            if owner.id() != exclude {
                return Err(AppError::conflict(format!(
                    "Phone {} already in use by {}",
                    phone,
                    owner.kind()
                )));
            }
        }
        Ok(())
    }

    async fn tax_id_holder(&self, table: &str, tax_id: &str) -> AppResult<Option<RecordId>> {
        let mut result = self
            .base
            .db()
            .query(format!(
                "SELECT VALUE id FROM {} WHERE tax_id = $tax_id LIMIT 1",
                table
            ))
            .bind(("tax_id", tax_id.to_string()))
            .await?;
        let ids: Vec<RecordId> = result.take(0)?;
        Ok(ids.into_iter().next())
    }

    /// Whether a (normalized) tax id is taken by any employee or enquiry
    /// other than `exclude`
    pub async fn is_tax_id_used(
        &self,
        tax_id: &str,
        exclude: Option<&RecordId>,
    ) -> AppResult<bool> {
        let tax_id = normalize_tax_id(tax_id);
        for table in ["employee", "enquiry"] {
            if let Some(holder) = self.tax_id_holder(table, &tax_id).await? {
                if Some(&holder) != exclude {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Fail with a conflict when a tax id is taken
    pub async fn ensure_tax_id_free(
        &self,
        tax_id: &str,
        exclude: Option<&RecordId>,
    ) -> AppResult<()> {
        if self.is_tax_id_used(tax_id, exclude).await? {
            return Err(AppError::conflict(format!(
                "Tax id {} already in use",
                normalize_tax_id(tax_id)
            )));
        }
        Ok(())
    }
}
