use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::audit::AuditStorage;
use crate::auth::SessionService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    AdminRepository, AttendanceRules, EmployeeRepository, EmploymentRepository, EnquiryRepository,
    SalaryRepository,
};
use crate::sequence::SequenceService;
use crate::uniqueness::UniquenessService;

/// Shared server state
///
/// One instance per process, cloned into every request. All members are
/// cheap to clone: each repository holds only a handle to the embedded
/// store.
///
/// | Field | Role |
/// |-------|------|
/// | config | Immutable configuration |
/// | db | Embedded store handle |
/// | admins .. enquiries | Collection repositories |
/// | sequences | Sequential display id reservation |
/// | uniqueness | Cross-collection phone / tax id checks |
/// | sessions | Admin and employee credential flows |
/// | audit | Hash-chained audit trail |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded store (SurrealDB)
    pub db: Surreal<Db>,
    admins: AdminRepository,
    employees: EmployeeRepository,
    employments: EmploymentRepository,
    salaries: SalaryRepository,
    enquiries: EnquiryRepository,
    sequences: SequenceService,
    uniqueness: UniquenessService,
    sessions: SessionService,
    audit: AuditStorage,
}

impl ServerState {
    /// Build state around an already-open store
    ///
    /// Usually [`ServerState::initialize`] is used instead.
    pub fn new(config: Config, db: Surreal<Db>, rules: AttendanceRules) -> Self {
        Self {
            admins: AdminRepository::new(db.clone()),
            employees: EmployeeRepository::new(db.clone()),
            employments: EmploymentRepository::new(db.clone(), rules),
            salaries: SalaryRepository::new(db.clone()),
            enquiries: EnquiryRepository::new(db.clone()),
            sequences: SequenceService::new(db.clone()),
            uniqueness: UniquenessService::new(db.clone()),
            sessions: SessionService::new(db.clone(), config.session_ttl_hours),
            audit: AuditStorage::new(db.clone()),
            config,
            db,
        }
    }

    /// Initialize the server state
    ///
    /// Creates the working directory layout, opens the embedded store at
    /// `work_dir/database/personnel.db`, seeds the bootstrap administrator
    /// and wires up every repository.
    ///
    /// # Panics
    ///
    /// Panics when the store cannot be opened or seeded. There is nothing
    /// to serve without it.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("personnel.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str, &config.db_namespace, &config.db_database)
            .await
            .expect("Failed to initialize database");
        db_service
            .seed_default_admin(config)
            .await
            .expect("Failed to seed default administrator");

        let rules = AttendanceRules {
            late_after: config.late_after_time(),
            early_out_before: config.early_out_before_time(),
            half_day_hours: config.half_day_hours,
        };

        Self::new(config.clone(), db_service.db, rules)
    }

    /// Raw store handle
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn admins(&self) -> &AdminRepository {
        &self.admins
    }

    pub fn employees(&self) -> &EmployeeRepository {
        &self.employees
    }

    pub fn employments(&self) -> &EmploymentRepository {
        &self.employments
    }

    pub fn salaries(&self) -> &SalaryRepository {
        &self.salaries
    }

    pub fn enquiries(&self) -> &EnquiryRepository {
        &self.enquiries
    }

    pub fn sequences(&self) -> &SequenceService {
        &self.sequences
    }

    pub fn uniqueness(&self) -> &UniquenessService {
        &self.uniqueness
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn audit(&self) -> &AuditStorage {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initialize_seeds_a_usable_bootstrap_admin() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
        let state = ServerState::initialize(&config).await;

        let (session, admin) = state
            .sessions()
            .login_admin(&config.default_admin_phone, &config.default_admin_password)
            .await
            .unwrap();
        assert_eq!(admin.name, config.default_admin_name);

        let ctx = state
            .sessions()
            .validate_admin(&session.id.unwrap().to_string())
            .await
            .unwrap();
        assert!(ctx.is_admin());
    }
}
