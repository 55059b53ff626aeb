//! In-app notification repository

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::notification::{CreateNotificationRequest, Notification};
use crate::utils::errors::Result;

const NOTIFICATION_COLUMNS: &str =
    "id, profile_id, title, message, link, is_read, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateNotificationRequest) -> Result<Notification> {
        let sql = format!(
            r#"
            INSERT INTO notifications (profile_id, title, message, link, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );

        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(request.profile_id)
            .bind(request.title)
            .bind(request.message)
            .bind(request.link)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(notification)
    }

    pub async fn list(&self, profile_id: Uuid, unread_only: bool, limit: i64, offset: i64) -> Result<Vec<Notification>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE profile_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            NOTIFICATION_COLUMNS
        );

        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(profile_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, profile_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE profile_id = $1 AND NOT is_read",
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Only the owner's notification is touched
    pub async fn mark_read(&self, id: Uuid, profile_id: Uuid) -> Result<Option<Notification>> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET is_read = TRUE, updated_at = $3
            WHERE id = $1 AND profile_id = $2
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );

        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(profile_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(notification)
    }

    pub async fn mark_all_read(&self, profile_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = $2 WHERE profile_id = $1 AND NOT is_read",
        )
        .bind(profile_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
