//! Database service layer
//!
//! Bundles the repositories and hosts operations that span several of them.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::database::{
    AdminRepository, ConnectionRepository, DatabasePool, EventRepository, FeedbackRepository,
    GroupRepository, JobRepository, MentorshipRepository, MessageRepository,
    NotificationRepository, ProfileRepository,
};
use crate::models::connection::{Connection, ConnectionResponse};
use crate::models::job::{JobApplication, ReviewApplicationRequest};
use crate::models::mentorship::{MentorshipDecision, MentorshipRequest};
use crate::models::message::{Message, SendMessageRequest, MAX_MESSAGE_LENGTH};
use crate::models::notification::{CreateNotificationRequest, Notification, NotificationTemplate};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::require_text;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub profiles: ProfileRepository,
    pub events: EventRepository,
    pub jobs: JobRepository,
    pub messages: MessageRepository,
    pub connections: ConnectionRepository,
    pub groups: GroupRepository,
    pub mentorship: MentorshipRepository,
    pub notifications: NotificationRepository,
    pub feedback: FeedbackRepository,
    pub admin: AdminRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            jobs: JobRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            connections: ConnectionRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            mentorship: MentorshipRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            feedback: FeedbackRepository::new(pool.clone()),
            admin: AdminRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Deliver an in-app notification rendered from a template
    pub async fn notify(
        &self,
        profile_id: Uuid,
        template: NotificationTemplate,
        params: &BTreeMap<String, String>,
        link: Option<String>,
    ) -> Result<Notification> {
        let (title, message) = template.render(params);
        self.notifications
            .create(CreateNotificationRequest {
                profile_id,
                title,
                message,
                link,
            })
            .await
    }

    /// Notification failures never fail the primary operation
    async fn notify_quietly(
        &self,
        profile_id: Uuid,
        template: NotificationTemplate,
        params: BTreeMap<String, String>,
        link: Option<String>,
    ) {
        if let Err(e) = self.notify(profile_id, template, &params, link).await {
            tracing::warn!(
                profile_id = %profile_id,
                template = template.name(),
                error = %e,
                "Failed to store notification"
            );
        }
    }

    /// Send a message to a user or into an existing conversation
    pub async fn send_message(&self, sender_id: Uuid, request: SendMessageRequest) -> Result<Message> {
        let content = require_text("content", &request.content, MAX_MESSAGE_LENGTH)?;

        let (conversation_id, recipient_id) = match (request.conversation_id, request.recipient_id) {
            (Some(conversation_id), _) => {
                if self.messages.find_conversation(conversation_id).await?.is_none() {
                    return Err(PortalError::not_found("Conversation", conversation_id));
                }
                if !self.messages.is_participant(conversation_id, sender_id).await? {
                    return Err(PortalError::PermissionDenied(
                        "You are not a participant in this conversation".to_string(),
                    ));
                }
                let recipient_id = self
                    .messages
                    .other_participant(conversation_id, sender_id)
                    .await?
                    .ok_or_else(|| {
                        PortalError::InvalidInput("Conversation has no other participant".to_string())
                    })?;
                (conversation_id, recipient_id)
            }
            (None, Some(recipient_id)) => {
                if self.profiles.find_by_id(recipient_id).await?.is_none() {
                    return Err(PortalError::not_found("Profile", recipient_id));
                }
                let conversation_id = self
                    .messages
                    .get_or_create_conversation(sender_id, recipient_id)
                    .await?;
                (conversation_id, recipient_id)
            }
            (None, None) => {
                return Err(PortalError::InvalidInput(
                    "Either recipient_id or conversation_id is required".to_string(),
                ));
            }
        };

        self.messages
            .send(conversation_id, sender_id, recipient_id, &content)
            .await
    }

    /// Respond to a connection request; accepting notifies the requester
    pub async fn respond_to_connection(
        &self,
        connection_id: Uuid,
        user_id: Uuid,
        response: ConnectionResponse,
    ) -> Result<Connection> {
        let connection = self
            .connections
            .respond(connection_id, user_id, response)
            .await?;

        if response == ConnectionResponse::Accepted {
            let name = self
                .profiles
                .find_by_id(user_id)
                .await?
                .and_then(|p| p.full_name)
                .unwrap_or_else(|| "A fellow alumnus".to_string());

            let params = BTreeMap::from([("name".to_string(), name)]);
            self.notify_quietly(
                connection.requester_id,
                NotificationTemplate::ConnectionAccepted,
                params,
                Some(format!("/profiles/{}", user_id)),
            )
            .await;
        }

        Ok(connection)
    }

    /// Review an application as its job's poster or an admin
    pub async fn review_application(
        &self,
        application_id: Uuid,
        reviewer_id: Uuid,
        is_admin: bool,
        request: ReviewApplicationRequest,
    ) -> Result<JobApplication> {
        let application = self
            .jobs
            .find_application(application_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Job application", application_id))?;

        let job = self
            .jobs
            .find_by_id(application.job_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Job", application.job_id))?;

        if job.posted_by != reviewer_id && !is_admin {
            return Err(PortalError::PermissionDenied(
                "Only the job poster can review applications".to_string(),
            ));
        }

        let reviewed = self
            .jobs
            .review_application(application_id, request.status, request.review_notes, reviewer_id)
            .await?;

        let params = BTreeMap::from([
            ("job_title".to_string(), job.title.clone()),
            ("status".to_string(), reviewed.status.clone()),
        ]);
        self.notify_quietly(
            reviewed.applicant_id,
            NotificationTemplate::JobApplicationUpdate,
            params,
            Some(format!("/jobs/{}", job.id)),
        )
        .await;

        Ok(reviewed)
    }

    /// Mentor's decision on a request; the mentee is notified
    pub async fn respond_to_mentorship(
        &self,
        request_id: Uuid,
        mentor_user_id: Uuid,
        decision: MentorshipDecision,
    ) -> Result<MentorshipRequest> {
        let request = self
            .mentorship
            .respond(request_id, mentor_user_id, decision)
            .await?;

        let params = BTreeMap::from([("status".to_string(), decision.as_str().to_string())]);
        self.notify_quietly(
            request.mentee_id,
            NotificationTemplate::MentorshipUpdate,
            params,
            Some("/mentorship".to_string()),
        )
        .await;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_message_validates_before_touching_the_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap();
        let service = DatabaseService::new(pool);

        let blank = SendMessageRequest {
            recipient_id: Some(Uuid::new_v4()),
            conversation_id: None,
            content: "   ".to_string(),
        };
        assert!(matches!(
            service.send_message(Uuid::new_v4(), blank).await,
            Err(PortalError::InvalidInput(_))
        ));

        let too_long = SendMessageRequest {
            recipient_id: Some(Uuid::new_v4()),
            conversation_id: None,
            content: "x".repeat(MAX_MESSAGE_LENGTH + 1),
        };
        assert!(matches!(
            service.send_message(Uuid::new_v4(), too_long).await,
            Err(PortalError::InvalidInput(_))
        ));
    }
}
