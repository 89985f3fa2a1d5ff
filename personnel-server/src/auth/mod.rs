//! Authentication and request identity

pub mod context;
pub mod middleware;
pub mod session;

pub use context::AuthContext;
pub use session::SessionService;
