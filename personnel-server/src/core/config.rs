use std::path::PathBuf;

use chrono::NaiveTime;

use crate::utils::time::parse_cutoff;

/// Server configuration - every tunable of the records service
///
/// # Environment variables
///
/// All settings can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/personnel | Working directory (store + logs) |
/// | HTTP_PORT | 3000 | HTTP service port |
/// | DB_NAMESPACE | personnel | Store namespace |
/// | DB_DATABASE | records | Store database |
/// | SESSION_TTL_HOURS | 24 | Admin session lifetime |
/// | LATE_AFTER | 09:15 | Check-ins after this are late |
/// | EARLY_OUT_BEFORE | 17:00 | Check-outs before this are early |
/// | HALF_DAY_HOURS | 4 | Worked hours below this mean half-day |
/// | DEFAULT_ADMIN_NAME | Administrator | Bootstrap admin display name |
/// | DEFAULT_ADMIN_PHONE | 9999999999 | Bootstrap admin login phone |
/// | DEFAULT_ADMIN_PASSWORD | change-me | Bootstrap admin initial password |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | (unset) | Log directory; unset means console only |
/// | ENVIRONMENT | development | Runtime environment |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/personnel HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the embedded store and log files
    pub work_dir: String,
    /// HTTP API service port
    pub http_port: u16,
    /// Store namespace
    pub db_namespace: String,
    /// Store database
    pub db_database: String,
    /// Runtime environment: development | staging | production
    pub environment: String,

    // === Session settings ===
    /// Admin session lifetime in hours
    pub session_ttl_hours: i64,

    // === Attendance rule settings ===
    /// Check-ins later than this wall-clock time are marked late (HH:MM)
    pub late_after: String,
    /// Check-outs earlier than this wall-clock time are flagged early (HH:MM)
    pub early_out_before: String,
    /// Worked hours below this threshold downgrade the day to half-day
    pub half_day_hours: f64,

    // === Bootstrap admin ===
    /// Display name for the seeded administrator
    pub default_admin_name: String,
    /// Login phone for the seeded administrator
    pub default_admin_phone: String,
    /// Initial password for the seeded administrator (hashed before storage)
    pub default_admin_password: String,

    // === Logging ===
    /// Log level for the console/file subscriber
    pub log_level: String,
    /// Log directory; unset means console only
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to their defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/personnel".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            db_namespace: std::env::var("DB_NAMESPACE").unwrap_or_else(|_| "personnel".into()),
            db_database: std::env::var("DB_DATABASE").unwrap_or_else(|_| "records".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            session_ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(24),

            late_after: std::env::var("LATE_AFTER").unwrap_or_else(|_| "09:15".into()),
            early_out_before: std::env::var("EARLY_OUT_BEFORE").unwrap_or_else(|_| "17:00".into()),
            half_day_hours: std::env::var("HALF_DAY_HOURS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4.0),

            default_admin_name: std::env::var("DEFAULT_ADMIN_NAME")
                .unwrap_or_else(|_| "Administrator".into()),
            default_admin_phone: std::env::var("DEFAULT_ADMIN_PHONE")
                .unwrap_or_else(|_| "9999999999".into()),
            default_admin_password: std::env::var("DEFAULT_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "change-me".into()),

            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Override selected settings with custom values
    ///
    /// Mostly used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Directory holding the embedded store files
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Create the working directory layout if it does not exist yet
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        if let Some(dir) = &self.log_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Parsed late-check-in cutoff
    pub fn late_after_time(&self) -> NaiveTime {
        parse_cutoff(&self.late_after, NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN))
    }

    /// Parsed early-check-out cutoff
    pub fn early_out_before_time(&self) -> NaiveTime {
        parse_cutoff(
            &self.early_out_before,
            NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        )
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether this is a development deployment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
