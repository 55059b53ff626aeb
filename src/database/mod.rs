//! Database module
//!
//! Pool setup, migrations and the repositories over the portal schema

pub mod connection;
pub mod repositories;
pub mod service;

// Re-export commonly used database components
pub use connection::{create_pool, health_check, run_migrations, DatabasePool, PoolConfig};
pub use repositories::{
    AdminRepository, ConnectionRepository, EventRepository, EventViewer, FeedbackRepository,
    GroupRepository, JobRepository, MentorshipRepository, MessageRepository,
    NotificationRepository, ProfileRepository,
};
pub use service::DatabaseService;
