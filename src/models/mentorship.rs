//! Mentorship models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_MAX_MENTEES: i32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mentor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expertise: Vec<String>,
    pub mentoring_statement: Option<String>,
    pub max_mentees: i32,
    pub is_available: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MentorWithProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expertise: Vec<String>,
    pub mentoring_statement: Option<String>,
    pub max_mentees: i32,
    pub is_available: bool,
    pub status: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub current_job_title: Option<String>,
    pub current_company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MentorshipRequest {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub goals: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMentorRequest {
    #[serde(default)]
    pub expertise: Vec<String>,
    pub mentoring_statement: Option<String>,
    pub max_mentees: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMentorshipRequest {
    pub mentor_id: Uuid,
    pub goals: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorshipDecision {
    Accepted,
    Declined,
}

impl MentorshipDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            MentorshipDecision::Accepted => "accepted",
            MentorshipDecision::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondMentorshipRequest {
    pub status: MentorshipDecision,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MentorFilter {
    pub expertise: Option<String>,
}
