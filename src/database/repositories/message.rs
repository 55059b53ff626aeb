//! Conversation and message repository

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::message::{Conversation, ConversationSummary, Message};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::participant_key;

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, recipient_id, content, read_at, created_at";

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotently resolve the one conversation between two users.
    ///
    /// The normalized pair key is unique, so concurrent callers converge on
    /// the same row through the upsert.
    pub async fn get_or_create_conversation(&self, user_a: Uuid, user_b: Uuid) -> Result<Uuid> {
        if user_a == user_b {
            return Err(PortalError::InvalidInput(
                "Cannot start a conversation with yourself".to_string(),
            ));
        }

        let key = participant_key(user_a, user_b);
        let mut tx = self.pool.begin().await?;

        let conversation_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO conversations (participant_key, created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (participant_key) DO UPDATE SET participant_key = EXCLUDED.participant_key
            RETURNING id
            "#,
        )
        .bind(&key)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO conversation_participants (conversation_id, user_id)
            VALUES ($1, $2), ($1, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(conversation_id)
        .bind(user_a)
        .bind(user_b)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(conversation_id)
    }

    pub async fn find_conversation(&self, id: Uuid) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT id, participant_key, last_message_at, created_at, updated_at FROM conversations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    pub async fn is_participant(&self, conversation_id: Uuid, user_id: Uuid) -> Result<bool> {
        let is_participant: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM conversation_participants WHERE conversation_id = $1 AND user_id = $2)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(is_participant)
    }

    /// The participant of the conversation that is not `user_id`
    pub async fn other_participant(&self, conversation_id: Uuid, user_id: Uuid) -> Result<Option<Uuid>> {
        let other: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM conversation_participants WHERE conversation_id = $1 AND user_id <> $2 LIMIT 1",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(other)
    }

    /// Store a message and bump the conversation's activity time
    pub async fn send(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO messages (conversation_id, sender_id, recipient_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        );
        let message = sqlx::query_as::<_, Message>(&sql)
            .bind(conversation_id)
            .bind(sender_id)
            .bind(recipient_id)
            .bind(content)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE conversations SET last_message_at = $2, updated_at = $2 WHERE id = $1")
            .bind(conversation_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// Every message the user sent or received, newest first
    pub async fn list_for_user(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Message>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            MESSAGE_COLUMNS
        );

        let messages = sqlx::query_as::<_, Message>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    /// Thread between two users, oldest first
    pub async fn between(&self, user_id: Uuid, other_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Message>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC
            LIMIT $3 OFFSET $4
            "#,
            MESSAGE_COLUMNS
        );

        let messages = sqlx::query_as::<_, Message>(&sql)
            .bind(user_id)
            .bind(other_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    /// Inbox view with the last message and unread count per conversation
    pub async fn recent_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationSummary>> {
        let conversations = sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT c.id AS conversation_id,
                   other.user_id AS other_user_id,
                   p.full_name AS other_user_name,
                   p.avatar_url AS other_user_avatar,
                   last_message.content AS last_message_content,
                   c.last_message_at,
                   (SELECT COUNT(*) FROM messages m
                    WHERE m.conversation_id = c.id AND m.recipient_id = $1 AND m.read_at IS NULL
                   ) AS unread_count
            FROM conversations c
            JOIN conversation_participants me
              ON me.conversation_id = c.id AND me.user_id = $1
            JOIN conversation_participants other
              ON other.conversation_id = c.id AND other.user_id <> $1
            LEFT JOIN profiles p ON p.id = other.user_id
            LEFT JOIN LATERAL (
                SELECT content FROM messages
                WHERE conversation_id = c.id
                ORDER BY created_at DESC
                LIMIT 1
            ) last_message ON TRUE
            ORDER BY c.last_message_at DESC NULLS LAST, c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    /// Mark one message read; only its recipient may do so
    pub async fn mark_read(&self, message_id: Uuid, recipient_id: Uuid) -> Result<Option<Message>> {
        let sql = format!(
            r#"
            UPDATE messages
            SET read_at = COALESCE(read_at, $3)
            WHERE id = $1 AND recipient_id = $2
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        );

        let message = sqlx::query_as::<_, Message>(&sql)
            .bind(message_id)
            .bind(recipient_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    pub async fn mark_conversation_as_read(&self, conversation_id: Uuid, recipient_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = $3
            WHERE conversation_id = $1 AND recipient_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(conversation_id)
        .bind(recipient_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
