//! Middleware module
//!
//! Request extractors and tower layers shared by every route

pub mod auth;
pub mod logging;
pub mod rate_limit;

// Re-export commonly used middleware
pub use auth::{AdminUser, OptionalAuthUser};
pub use logging::log_requests;
pub use rate_limit::{rate_limit, RequestRateLimiter};
