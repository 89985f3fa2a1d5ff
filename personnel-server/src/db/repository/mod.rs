//! Repository Module
//!
//! CRUD over the store tables. Every mutating operation takes the caller's
//! [`AuthContext`] and stamps the audit quad from it.

// Principals
pub mod admin;
pub mod employee;

// Records
pub mod employment;
pub mod enquiry;
pub mod salary;

// Counters
pub mod counter;

// Re-exports
pub use admin::AdminRepository;
pub use counter::CounterRepository;
pub use employee::EmployeeRepository;
pub use employment::{AttendanceRules, EmploymentRepository};
pub use enquiry::EnquiryRepository;
pub use salary::SalaryRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::auth::AuthContext;
use crate::utils::{AppError, AppResult};

/// Common repository trait for basic CRUD
#[allow(async_fn_in_trait)]
pub trait Repository<T, CreateDto, UpdateDto> {
    async fn find_all(&self) -> AppResult<Vec<T>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<T>>;
    async fn create(&self, ctx: &AuthContext, data: CreateDto) -> AppResult<T>;
    async fn update(&self, ctx: &AuthContext, id: &str, data: UpdateDto) -> AppResult<T>;
    async fn delete(&self, ctx: &AuthContext, id: &str) -> AppResult<bool>;
}

// =============================================================================
// ID Convention: "table:id" strings everywhere outside the store
// =============================================================================
//
// surrealdb::RecordId handles all IDs:
//   - parse:  let id: RecordId = "employee:abc".parse()?;
//   - build:  let id = RecordId::from_table_key("employee", "abc");
//   - table:  id.table()
//   - key:    id.key().to_string()
//   - CRUD:   db.select(id) / db.delete(id) take RecordId directly

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Parse a "table:id" string, rejecting malformed input
    pub fn parse_id(&self, id: &str) -> AppResult<RecordId> {
        id.parse()
            .map_err(|_| AppError::validation(format!("Invalid ID: {}", id)))
    }
}
