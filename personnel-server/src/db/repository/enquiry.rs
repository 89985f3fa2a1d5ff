//! Enquiry Repository
//!
//! Walk-in enquiries are lightweight records that still participate in the
//! cross-collection tax id uniqueness rule and the sequential ENQ numbering.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::BaseRepository;
use crate::auth::AuthContext;
use crate::db::models::{Enquiry, EnquiryCreate};
use crate::sequence::{EntityKind, SequenceService};
use crate::uniqueness::{UniquenessService, validate_tax_id};
use crate::utils::{AppError, AppResult, time};

#[derive(Clone)]
pub struct EnquiryRepository {
    base: BaseRepository,
    uniqueness: UniquenessService,
    sequences: SequenceService,
}

impl EnquiryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            uniqueness: UniquenessService::new(db.clone()),
            sequences: SequenceService::new(db),
        }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Enquiry>> {
        let enquiries: Vec<Enquiry> = self
            .base
            .db()
            .query("SELECT * FROM enquiry ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(enquiries)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Enquiry>> {
        let thing = self.base.parse_id(id)?;
        let enquiry: Option<Enquiry> = self.base.db().select(thing).await?;
        Ok(enquiry)
    }

    pub async fn create(&self, ctx: &AuthContext, data: EnquiryCreate) -> AppResult<Enquiry> {
        ctx.require_admin()?;
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }
        let tax_id = match data.tax_id {
            Some(ref raw) => {
                let tax_id = validate_tax_id(raw)?;
                self.uniqueness.ensure_tax_id_free(&tax_id, None).await?;
                Some(tax_id)
            }
            None => None,
        };

        let enquiry_id = self
            .sequences
            .reserve_next(EntityKind::Enquiry)
            .await?
            .formatted;
        let now = time::now_millis();

        #[derive(Serialize)]
        struct NewEnquiry {
            enquiry_id: String,
            name: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            phone: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            tax_id: Option<String>,
            created_at: i64,
            created_by: String,
            updated_at: i64,
            updated_by: String,
        }

        let content = NewEnquiry {
            enquiry_id,
            name: data.name,
            phone: data.phone,
            tax_id,
            created_at: now,
            created_by: ctx.stamp(),
            updated_at: now,
            updated_by: ctx.stamp(),
        };

        let mut result = self
            .base
            .db()
            .query("CREATE enquiry CONTENT $data RETURN AFTER")
            .bind(("data", content))
            .await?;

        let created: Option<Enquiry> = result.take(0)?;
        created.ok_or_else(|| AppError::store("Failed to create enquiry"))
    }

    pub async fn delete(&self, ctx: &AuthContext, id: &str) -> AppResult<bool> {
        ctx.require_admin()?;
        let thing = self.base.parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Enquiry {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn admin_ctx() -> AuthContext {
        AuthContext::admin("admin:test".parse().unwrap(), "Test Admin", i64::MAX)
    }

    fn payload(name: &str, tax_id: Option<&str>) -> EnquiryCreate {
        EnquiryCreate {
            name: name.to_string(),
            phone: None,
            tax_id: tax_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn enquiries_number_independently() {
        let (db, _tmp) = test_db().await;
        let repo = EnquiryRepository::new(db);
        let ctx = admin_ctx();

        let first = repo.create(&ctx, payload("Walk In", None)).await.unwrap();
        let second = repo.create(&ctx, payload("Caller", None)).await.unwrap();
        assert_eq!(first.enquiry_id.as_deref(), Some("ENQ001"));
        assert_eq!(second.enquiry_id.as_deref(), Some("ENQ002"));
    }

    #[tokio::test]
    async fn tax_id_is_normalized_and_unique() {
        let (db, _tmp) = test_db().await;
        let repo = EnquiryRepository::new(db);
        let ctx = admin_ctx();

        let created = repo
            .create(&ctx, payload("Walk In", Some("abcde1234f")))
            .await
            .unwrap();
        assert_eq!(created.tax_id.as_deref(), Some("ABCDE1234F"));

        let err = repo
            .create(&ctx, payload("Another", Some("ABCDE1234F")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn creation_is_administrator_only() {
        let (db, _tmp) = test_db().await;
        let repo = EnquiryRepository::new(db);
        let ctx = AuthContext::employee("employee:asha".parse().unwrap(), "Asha");
        let err = repo.create(&ctx, payload("Walk In", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
