//! Admin and dashboard aggregates

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::event::Event;
use super::job::{ApplicationWithApplicant, Job};
use super::mentorship::MentorshipRequest;

/// Portal-wide counters for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct DashboardStats {
    pub total_users: i64,
    pub verified_users: i64,
    pub pending_verifications: i64,
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub pending_job_approvals: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    pub total_applications: i64,
    pub total_groups: i64,
    pub approved_mentors: i64,
    pub messages_last_7_days: i64,
    pub total_feedback: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlumniDashboard {
    pub profile_completeness: u8,
    pub upcoming_events: Vec<Event>,
    pub recent_jobs: Vec<Job>,
    pub connection_count: i64,
    pub pending_connection_requests: i64,
    pub unread_messages: i64,
    pub unread_notifications: i64,
    pub mentorship_requests: Vec<MentorshipRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplicationCounts {
    pub job_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub is_approved: bool,
    pub total: i64,
    pub pending: i64,
    pub reviewed: i64,
    pub shortlisted: i64,
    pub accepted: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerDashboard {
    pub jobs: Vec<JobApplicationCounts>,
    pub total_applications: i64,
    pub recent_applications: Vec<ApplicationWithApplicant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub status: super::profile::VerificationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

impl EmployerDashboard {
    pub fn from_parts(
        jobs: Vec<JobApplicationCounts>,
        recent_applications: Vec<ApplicationWithApplicant>,
    ) -> Self {
        let total_applications = jobs.iter().map(|job| job.total).sum();
        Self {
            jobs,
            total_applications,
            recent_applications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employer_totals() {
        let counts = |total| JobApplicationCounts {
            job_id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            is_active: true,
            is_approved: true,
            total,
            pending: total,
            reviewed: 0,
            shortlisted: 0,
            accepted: 0,
            rejected: 0,
        };

        let dashboard = EmployerDashboard::from_parts(vec![counts(3), counts(4)], vec![]);
        assert_eq!(dashboard.total_applications, 7);
        assert_eq!(EmployerDashboard::from_parts(vec![], vec![]).total_applications, 0);
    }
}
