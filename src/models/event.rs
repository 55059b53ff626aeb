//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::{PortalError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: Option<String>,
    pub is_virtual: bool,
    pub virtual_link: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_attendees: Option<i32>,
    pub featured_image_url: Option<String>,
    pub tags: Vec<String>,
    pub organizer_id: Uuid,
    pub is_published: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// RSVP joined with the attendee's public profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventAttendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub current_job_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_virtual: bool,
    pub virtual_link: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_attendees: Option<i32>,
    pub featured_image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub is_virtual: Option<bool>,
    pub virtual_link: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_attendees: Option<i32>,
    pub featured_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventFilter {
    #[serde(default = "default_true")]
    pub upcoming_only: bool,
    pub category: Option<String>,
    pub is_virtual: Option<bool>,
    pub search: Option<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            upcoming_only: true,
            category: None,
            is_virtual: None,
            search: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Schedule and capacity rules shared by create and update
pub fn validate_schedule(
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    registration_deadline: Option<DateTime<Utc>>,
    max_attendees: Option<i32>,
) -> Result<()> {
    if end_date < start_date {
        return Err(PortalError::InvalidInput(
            "end_date must not be before start_date".to_string(),
        ));
    }

    if let Some(deadline) = registration_deadline {
        if deadline > start_date {
            return Err(PortalError::InvalidInput(
                "registration_deadline must not be after start_date".to_string(),
            ));
        }
    }

    if let Some(max) = max_attendees {
        if max <= 0 {
            return Err(PortalError::InvalidInput(
                "max_attendees must be greater than 0".to_string(),
            ));
        }
    }

    Ok(())
}

impl Event {
    /// Why a new RSVP is refused at `now`, if it is
    pub fn registration_closed_reason(&self, now: DateTime<Utc>) -> Option<&'static str> {
        if !self.is_published {
            return Some("Event is not open for registration");
        }
        if self.start_date <= now {
            return Some("Event has already started");
        }
        match self.registration_deadline {
            Some(deadline) if deadline < now => Some("Registration deadline has passed"),
            _ => None,
        }
    }

    pub fn is_full(&self, attendee_count: i64) -> bool {
        self.max_attendees
            .map_or(false, |max| attendee_count >= i64::from(max))
    }
}
