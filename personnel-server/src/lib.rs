//! Personnel Server - employee records with a consistent core
//!
//! # Overview
//!
//! Single-node records service for a small office: employee files,
//! attendance, leave, salaries and walk-in enquiries, backed by an
//! embedded SurrealDB store.
//!
//! - **Sequence** (`sequence`): contention-safe sequential display ids
//! - **Uniqueness** (`uniqueness`): cross-collection phone / tax id checks
//! - **Auth** (`auth`): argon2 credentials, dual session lifecycles
//! - **Audit** (`audit`): hash-chained audit trail
//! - **HTTP API** (`api`): RESTful interface
//!
//! # Module structure
//!
//! ```text
//! personnel-server/src/
//! ├── core/          # configuration, state, startup
//! ├── auth/          # sessions, identity guard
//! ├── api/           # HTTP routes and handlers
//! ├── audit/         # hash-chained audit trail
//! ├── db/            # store layer: models, repositories, schema
//! ├── migrate/       # legacy document upgrades
//! ├── sequence/      # sequential id reservation
//! ├── uniqueness/    # cross-collection identity checks
//! └── utils/         # errors, logging, time
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod migrate;
pub mod sequence;
pub mod uniqueness;
pub mod utils;

// Re-export public types
pub use auth::{AuthContext, SessionService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - structured events on the "security" target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
╔════════════════════════════════════════════╗
║         PERSONNEL RECORDS SERVER           ║
╚════════════════════════════════════════════╝
    "#
    );
}
