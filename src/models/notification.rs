//! In-app notification and outbound message models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub profile_id: Uuid,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to_email: String,
    pub subject: String,
    pub html_content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppRequest {
    pub to_number: String,
    pub template_name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Outcome of an outbound delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub success: bool,
    pub message_id: Option<String>,
}

/// Preset messages delivered in-app and over outbound channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    Welcome,
    EventReminder,
    JobApplicationUpdate,
    ConnectionAccepted,
    MentorshipUpdate,
}

impl NotificationTemplate {
    pub const ALL: [NotificationTemplate; 5] = [
        NotificationTemplate::Welcome,
        NotificationTemplate::EventReminder,
        NotificationTemplate::JobApplicationUpdate,
        NotificationTemplate::ConnectionAccepted,
        NotificationTemplate::MentorshipUpdate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NotificationTemplate::Welcome => "welcome",
            NotificationTemplate::EventReminder => "event_reminder",
            NotificationTemplate::JobApplicationUpdate => "job_application_update",
            NotificationTemplate::ConnectionAccepted => "connection_accepted",
            NotificationTemplate::MentorshipUpdate => "mentorship_update",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationTemplate::Welcome => "Welcome to the Alumni Portal",
            NotificationTemplate::EventReminder => "Upcoming event: {event_title}",
            NotificationTemplate::JobApplicationUpdate => "Application update: {job_title}",
            NotificationTemplate::ConnectionAccepted => "New connection",
            NotificationTemplate::MentorshipUpdate => "Mentorship request {status}",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            NotificationTemplate::Welcome => {
                "Hi {name}, your account has been created. Complete your profile to connect with fellow alumni."
            }
            NotificationTemplate::EventReminder => {
                "{event_title} starts on {start_date}. We look forward to seeing you there."
            }
            NotificationTemplate::JobApplicationUpdate => {
                "Your application for {job_title} is now {status}."
            }
            NotificationTemplate::ConnectionAccepted => {
                "{name} accepted your connection request."
            }
            NotificationTemplate::MentorshipUpdate => {
                "Your mentorship request was {status}."
            }
        }
    }

    /// Title and body with `{placeholder}` values substituted
    pub fn render(&self, params: &BTreeMap<String, String>) -> (String, String) {
        (substitute(self.title(), params), substitute(self.body(), params))
    }
}

impl std::str::FromStr for NotificationTemplate {
    type Err = crate::utils::errors::PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|template| template.name() == s)
            .ok_or_else(|| {
                crate::utils::errors::PortalError::InvalidInput(format!(
                    "Unknown notification template: {}",
                    s
                ))
            })
    }
}

/// Unknown placeholders are left as written
pub fn substitute(text: &str, params: &BTreeMap<String, String>) -> String {
    params.iter().fold(text.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_template_rendering() {
        let (title, body) = NotificationTemplate::JobApplicationUpdate
            .render(&params(&[("job_title", "Data Engineer"), ("status", "shortlisted")]));
        assert_eq!(title, "Application update: Data Engineer");
        assert_eq!(body, "Your application for Data Engineer is now shortlisted.");
    }

    #[test]
    fn test_missing_placeholder_is_kept() {
        assert_eq!(substitute("Hi {name}", &BTreeMap::new()), "Hi {name}");
    }

    #[test]
    fn test_template_names_round_trip() {
        for template in NotificationTemplate::ALL {
            assert_eq!(template.name().parse::<NotificationTemplate>().unwrap(), template);
        }
        assert!("promo".parse::<NotificationTemplate>().is_err());
    }
}
