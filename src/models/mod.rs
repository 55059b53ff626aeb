//! Data models module
//!
//! Row types, request bodies and filters for every portal resource

pub mod admin;
pub mod auth;
pub mod connection;
pub mod event;
pub mod feedback;
pub mod group;
pub mod job;
pub mod mentorship;
pub mod message;
pub mod notification;
pub mod profile;

// Re-export commonly used models
pub use admin::{AlumniDashboard, DashboardStats, EmployerDashboard};
pub use connection::{Connection, ConnectionStatus};
pub use event::{Event, EventRsvp};
pub use feedback::Feedback;
pub use group::{Group, GroupMember, GroupPost, GroupRole};
pub use job::{ApplicationStatus, Company, Job, JobApplication};
pub use mentorship::{Mentor, MentorshipRequest};
pub use message::{Conversation, Message};
pub use notification::Notification;
pub use profile::Profile;
