//! Alumni Portal API
//!
//! REST backend for a university alumni network: profile directory, events
//! with RSVPs, the job board, messaging, connections, groups, mentorship,
//! notifications and dashboards.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use config::Settings;
pub use database::DatabaseService;
pub use handlers::router;
pub use services::ServiceFactory;
pub use state::AppState;
pub use utils::errors::{PortalError, Result};

/// Reported by `GET /api/`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Name and version for the startup banner
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
