//! Database repositories module
//!
//! One repository per table family, each owning a clone of the pool

pub mod admin;
pub mod connection;
pub mod event;
pub mod feedback;
pub mod group;
pub mod job;
pub mod mentorship;
pub mod message;
pub mod notification;
pub mod profile;

// Re-export repositories
pub use admin::AdminRepository;
pub use connection::ConnectionRepository;
pub use event::{EventRepository, EventViewer};
pub use feedback::FeedbackRepository;
pub use group::GroupRepository;
pub use job::JobRepository;
pub use mentorship::MentorshipRepository;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use profile::ProfileRepository;
