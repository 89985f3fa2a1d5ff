//! Schema definition pass
//!
//! Tables stay SCHEMALESS: the consistency layer owns validation, and phone
//! and tax-id uniqueness span collections, which a per-table UNIQUE index
//! cannot express. The indexes here are plain lookup accelerators.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::utils::AppResult;

/// Define tables and lookup indexes. Idempotent via OVERWRITE.
pub async fn define_schema(db: &Surreal<Db>) -> AppResult<()> {
    db.query(
        r#"
        DEFINE TABLE OVERWRITE admin SCHEMALESS;
        DEFINE TABLE OVERWRITE employee SCHEMALESS;
        DEFINE TABLE OVERWRITE employment SCHEMALESS;
        DEFINE TABLE OVERWRITE salary SCHEMALESS;
        DEFINE TABLE OVERWRITE admin_session SCHEMALESS;
        DEFINE TABLE OVERWRITE counter SCHEMALESS;
        DEFINE TABLE OVERWRITE enquiry SCHEMALESS;
        DEFINE TABLE OVERWRITE audit_log SCHEMALESS;

        DEFINE INDEX OVERWRITE admin_phone ON TABLE admin FIELDS phone;
        DEFINE INDEX OVERWRITE employee_phone ON TABLE employee FIELDS phone;
        DEFINE INDEX OVERWRITE employee_tax_id ON TABLE employee FIELDS tax_id;
        DEFINE INDEX OVERWRITE enquiry_tax_id ON TABLE enquiry FIELDS tax_id;
        DEFINE INDEX OVERWRITE employment_employee ON TABLE employment FIELDS employee;
        DEFINE INDEX OVERWRITE salary_period ON TABLE salary FIELDS employee, month, year;
        "#,
    )
    .await?;
    Ok(())
}
