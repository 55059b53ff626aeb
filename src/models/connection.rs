//! Connection model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Connection {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Connection joined with the profile on the other side from the viewer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionWithProfile {
    pub id: Uuid,
    pub status: String,
    pub other_user_id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub current_job_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequests {
    pub incoming: Vec<ConnectionWithProfile>,
    pub outgoing: Vec<ConnectionWithProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConnectionRequest {
    pub recipient_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionResponse {
    Accepted,
    Declined,
}

impl ConnectionResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionResponse::Accepted => "accepted",
            ConnectionResponse::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondConnectionRequest {
    pub status: ConnectionResponse,
}

/// Relationship between a viewer and another user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    None,
    #[serde(rename = "self")]
    SelfProfile,
    PendingSent,
    PendingReceived,
    Connected,
    Declined,
}

impl ConnectionStatus {
    /// Resolve the viewer's status from the pair's connection row, if any
    pub fn resolve(viewer: Uuid, other: Uuid, connection: Option<&Connection>) -> Self {
        if viewer == other {
            return ConnectionStatus::SelfProfile;
        }

        match connection {
            None => ConnectionStatus::None,
            Some(conn) => match conn.status.as_str() {
                "accepted" => ConnectionStatus::Connected,
                "declined" => ConnectionStatus::Declined,
                "pending" if conn.requester_id == viewer => ConnectionStatus::PendingSent,
                "pending" => ConnectionStatus::PendingReceived,
                _ => ConnectionStatus::None,
            },
        }
    }
}
