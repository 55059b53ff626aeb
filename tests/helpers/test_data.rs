//! Test data fixtures and generators

use alumni_portal::models::event::CreateEventRequest;
use alumni_portal::models::job::CreateJobRequest;
use alumni_portal::models::profile::{CreateProfileRequest, Profile};
use alumni_portal::DatabaseService;
use chrono::{Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use uuid::Uuid;

pub fn profile_request(account_type: &str) -> CreateProfileRequest {
    CreateProfileRequest {
        id: Uuid::new_v4(),
        email: SafeEmail().fake(),
        first_name: Some(FirstName().fake()),
        last_name: Some(LastName().fake()),
        phone: None,
        graduation_year: Some((1990..2024).fake()),
        degree: Some("BSc Computer Science".to_string()),
        account_type: Some(account_type.to_string()),
    }
}

pub async fn insert_profile(db: &DatabaseService, account_type: &str) -> Profile {
    db.profiles
        .create(profile_request(account_type))
        .await
        .expect("Failed to insert profile")
}

pub fn event_request(max_attendees: Option<i32>) -> CreateEventRequest {
    let start = Utc::now() + Duration::days(7);
    CreateEventRequest {
        title: "Class of 2010 Reunion".to_string(),
        description: "An evening on the main quad".to_string(),
        category: Some("reunion".to_string()),
        location: Some("Main Quad".to_string()),
        is_virtual: false,
        virtual_link: None,
        start_date: start,
        end_date: start + Duration::hours(3),
        registration_deadline: None,
        max_attendees,
        featured_image_url: None,
        tags: vec!["reunion".to_string()],
    }
}

pub fn job_request(title: &str) -> CreateJobRequest {
    CreateJobRequest {
        title: title.to_string(),
        company_name: Some("Acme Analytics".to_string()),
        company: None,
        description: Some("Build data pipelines".to_string()),
        location: Some("Remote".to_string()),
        job_type: Some("full_time".to_string()),
        industry: Some("Technology".to_string()),
        salary_range: None,
        requirements: None,
        application_url: None,
        contact_email: None,
        deadline: None,
        expires_at: None,
    }
}
