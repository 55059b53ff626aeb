//! Feedback repository

use chrono::Utc;
use sqlx::PgPool;

use crate::models::feedback::{CreateFeedbackRequest, Feedback};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateFeedbackRequest) -> Result<Feedback> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (name, email, page_url, feedback_type, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, page_url, feedback_type, message, created_at
            "#,
        )
        .bind(request.name.trim())
        .bind(request.email.trim())
        .bind(request.page_url)
        .bind(request.feedback_type)
        .bind(request.message.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Feedback>> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, name, email, page_url, feedback_type, message, created_at
            FROM feedback
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback)
    }
}
