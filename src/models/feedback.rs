//! Feedback model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub page_url: String,
    pub feedback_type: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeedbackRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default = "default_feedback_type")]
    pub feedback_type: String,
    pub message: String,
}

fn default_feedback_type() -> String {
    "general".to_string()
}

impl Feedback {
    /// Chat message body sent to the feedback webhook
    pub fn to_chat_message(&self) -> String {
        format!(
            "New Feedback Submitted!\n\n*Type:* {}\n*From:* {} ({})\n*Page:* {}\n*Message:* {}",
            self.feedback_type, self.name, self.email, self.page_url, self.message
        )
    }
}
