//! Profile model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
    pub department: Option<String>,
    pub current_company: Option<String>,
    pub current_job_title: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub skills: Vec<String>,
    pub account_type: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub is_mentor: bool,
    pub is_employer: bool,
    pub alumni_verification_status: String,
    pub mentor_status: String,
    pub mentee_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal public view of a profile embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub current_job_title: Option<String>,
    pub current_company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
    pub account_type: Option<String>,
}

/// Fields a user may edit on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
    pub department: Option<String>,
    pub current_company: Option<String>,
    pub current_job_title: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFilter {
    pub search: Option<String>,
    pub graduation_year: Option<i32>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub is_mentor: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl Profile {
    /// Share of tracked profile fields that are filled in, rounded down
    pub fn completeness(&self) -> u8 {
        fn filled(value: &Option<String>) -> bool {
            value.as_deref().map_or(false, |v| !v.trim().is_empty())
        }

        let checks = [
            filled(&self.first_name),
            filled(&self.last_name),
            !self.email.trim().is_empty(),
            self.graduation_year.is_some(),
            filled(&self.degree),
            filled(&self.current_company),
            filled(&self.current_job_title),
            filled(&self.location),
            filled(&self.bio),
            filled(&self.avatar_url),
            filled(&self.linkedin_url),
            !self.skills.is_empty(),
        ];

        let complete = checks.iter().filter(|c| **c).count();
        (complete * 100 / checks.len()) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn blank_profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "grad@example.edu".to_string(),
            first_name: None,
            last_name: None,
            full_name: None,
            phone: None,
            graduation_year: None,
            degree: None,
            department: None,
            current_company: None,
            current_job_title: None,
            location: None,
            bio: None,
            avatar_url: None,
            linkedin_url: None,
            skills: vec![],
            account_type: "alumni".to_string(),
            is_admin: false,
            is_verified: false,
            is_mentor: false,
            is_employer: false,
            alumni_verification_status: "pending".to_string(),
            mentor_status: "pending".to_string(),
            mentee_status: "pending".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_completeness_counts_email_only() {
        assert_eq!(blank_profile().completeness(), 8);
    }

    #[test]
    fn test_completeness_ignores_whitespace() {
        let mut profile = blank_profile();
        profile.first_name = Some("Ada".to_string());
        profile.bio = Some("   ".to_string());
        profile.graduation_year = Some(2015);
        profile.skills = vec!["rust".to_string()];
        assert_eq!(profile.completeness(), 33);
    }

    #[test]
    fn test_update_rejects_privileged_fields() {
        let parsed: Result<UpdateProfileRequest, _> =
            serde_json::from_value(serde_json::json!({ "bio": "hi", "is_admin": true }));
        assert!(parsed.is_err());
    }
}
