//! Job board models: jobs, companies, applications

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::{PortalError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub company_id: Option<Uuid>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: String,
    pub industry: Option<String>,
    pub salary_range: Option<String>,
    pub requirements: Option<String>,
    pub application_url: Option<String>,
    pub contact_email: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub posted_by: Uuid,
    pub is_active: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application joined with the applicant's profile and the job title
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationWithApplicant {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub applicant_id: Uuid,
    pub applicant_name: Option<String>,
    pub applicant_email: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInput {
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub company_name: Option<String>,
    pub company: Option<CompanyInput>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub industry: Option<String>,
    pub salary_range: Option<String>,
    pub requirements: Option<String>,
    pub application_url: Option<String>,
    pub contact_email: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub industry: Option<String>,
    pub salary_range: Option<String>,
    pub requirements: Option<String>,
    pub application_url: Option<String>,
    pub contact_email: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub job_id: Option<Uuid>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewApplicationRequest {
    pub status: ApplicationStatus,
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSort {
    #[default]
    Newest,
    Oldest,
    Deadline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobFilter {
    #[serde(default = "default_true")]
    pub active_only: bool,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: JobSort,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            active_only: true,
            job_type: None,
            location: None,
            industry: None,
            search: None,
            sort: JobSort::Newest,
        }
    }
}

fn default_true() -> bool {
    true
}

pub const JOB_TYPES: [&str; 5] = ["full_time", "part_time", "contract", "internship", "remote"];

pub fn is_valid_job_type(job_type: &str) -> bool {
    JOB_TYPES.contains(&job_type)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }

    /// Allowed review transitions
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Reviewed)
                | (Pending, Shortlisted)
                | (Pending, Rejected)
                | (Reviewed, Shortlisted)
                | (Reviewed, Rejected)
                | (Reviewed, Accepted)
                | (Shortlisted, Accepted)
                | (Shortlisted, Rejected)
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(PortalError::InvalidInput(format!(
                "Unknown application status: {}",
                other
            ))),
        }
    }
}

impl CreateJobRequest {
    /// Title, company, job type and deadline checks done before any write
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(PortalError::InvalidInput("title is required".to_string()));
        }

        let company_name = self
            .company
            .as_ref()
            .map(|c| c.name.as_str())
            .or(self.company_name.as_deref())
            .unwrap_or_default();
        if company_name.trim().is_empty() {
            return Err(PortalError::InvalidInput("company name is required".to_string()));
        }

        if let Some(job_type) = &self.job_type {
            if !is_valid_job_type(job_type) {
                return Err(PortalError::InvalidInput(format!(
                    "job_type must be one of: {}",
                    JOB_TYPES.join(", ")
                )));
            }
        }

        if matches!(self.deadline, Some(deadline) if deadline < now) {
            return Err(PortalError::InvalidInput("deadline must not be in the past".to_string()));
        }

        Ok(())
    }
}

impl Job {
    /// Applications need an active, approved posting whose deadline and expiry are ahead
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.is_approved
            && self.expires_at.map_or(true, |expiry| expiry > now)
            && self.deadline.map_or(true, |deadline| deadline > now)
    }
}
