//! Connection repository

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::connection::{Connection, ConnectionResponse, ConnectionWithProfile};
use crate::utils::errors::{PortalError, Result};

const CONNECTION_COLUMNS: &str = "id, requester_id, recipient_id, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
}

impl ConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Connection>> {
        let sql = format!("SELECT {} FROM connections WHERE id = $1", CONNECTION_COLUMNS);
        let connection = sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(connection)
    }

    /// The pair's connection row in either direction
    pub async fn find_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Option<Connection>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM connections
            WHERE (requester_id = $1 AND recipient_id = $2)
               OR (requester_id = $2 AND recipient_id = $1)
            "#,
            CONNECTION_COLUMNS
        );

        let connection = sqlx::query_as::<_, Connection>(&sql)
            .bind(user_a)
            .bind(user_b)
            .fetch_optional(&self.pool)
            .await?;

        Ok(connection)
    }

    /// Send a connection request. A declined pair is reopened as pending.
    pub async fn request(&self, requester_id: Uuid, recipient_id: Uuid) -> Result<Connection> {
        if requester_id == recipient_id {
            return Err(PortalError::InvalidInput(
                "Cannot connect with yourself".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let sql = format!(
            r#"
            SELECT {}
            FROM connections
            WHERE (requester_id = $1 AND recipient_id = $2)
               OR (requester_id = $2 AND recipient_id = $1)
            FOR UPDATE
            "#,
            CONNECTION_COLUMNS
        );
        let existing = sqlx::query_as::<_, Connection>(&sql)
            .bind(requester_id)
            .bind(recipient_id)
            .fetch_optional(&mut *tx)
            .await?;

        let connection = match existing {
            Some(conn) if conn.status == "pending" => {
                return Err(PortalError::Conflict(
                    "A connection request is already pending".to_string(),
                ));
            }
            Some(conn) if conn.status == "accepted" => {
                return Err(PortalError::Conflict("Already connected".to_string()));
            }
            Some(conn) => {
                let sql = format!(
                    r#"
                    UPDATE connections
                    SET requester_id = $2, recipient_id = $3, status = 'pending', updated_at = $4
                    WHERE id = $1
                    RETURNING {}
                    "#,
                    CONNECTION_COLUMNS
                );
                sqlx::query_as::<_, Connection>(&sql)
                    .bind(conn.id)
                    .bind(requester_id)
                    .bind(recipient_id)
                    .bind(now)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                    INSERT INTO connections (requester_id, recipient_id, status, created_at, updated_at)
                    VALUES ($1, $2, 'pending', $3, $3)
                    RETURNING {}
                    "#,
                    CONNECTION_COLUMNS
                );
                sqlx::query_as::<_, Connection>(&sql)
                    .bind(requester_id)
                    .bind(recipient_id)
                    .bind(now)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(connection)
    }

    /// Accept or decline a pending request addressed to `recipient_id`
    pub async fn respond(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        response: ConnectionResponse,
    ) -> Result<Connection> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM connections WHERE id = $1 FOR UPDATE", CONNECTION_COLUMNS);
        let current = sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| PortalError::not_found("Connection", id))?;

        if current.recipient_id != recipient_id {
            return Err(PortalError::PermissionDenied(
                "Only the recipient can respond to a connection request".to_string(),
            ));
        }
        if current.status != "pending" {
            return Err(PortalError::Conflict(format!(
                "Connection request is already {}",
                current.status
            )));
        }

        let sql = format!(
            "UPDATE connections SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            CONNECTION_COLUMNS
        );
        let connection = sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .bind(response.as_str())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(connection)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Accepted connections with the other side's profile
    pub async fn list_accepted(&self, user_id: Uuid) -> Result<Vec<ConnectionWithProfile>> {
        self.with_profiles(
            user_id,
            "(c.requester_id = $1 OR c.recipient_id = $1) AND c.status = 'accepted'",
        )
        .await
    }

    pub async fn pending_incoming(&self, user_id: Uuid) -> Result<Vec<ConnectionWithProfile>> {
        self.with_profiles(user_id, "c.recipient_id = $1 AND c.status = 'pending'")
            .await
    }

    pub async fn pending_outgoing(&self, user_id: Uuid) -> Result<Vec<ConnectionWithProfile>> {
        self.with_profiles(user_id, "c.requester_id = $1 AND c.status = 'pending'")
            .await
    }

    async fn with_profiles(&self, user_id: Uuid, condition: &str) -> Result<Vec<ConnectionWithProfile>> {
        let sql = format!(
            r#"
            SELECT c.id, c.status, p.id AS other_user_id, p.full_name, p.avatar_url,
                   p.current_job_title, c.created_at
            FROM connections c
            JOIN profiles p
              ON p.id = CASE WHEN c.requester_id = $1 THEN c.recipient_id ELSE c.requester_id END
            WHERE {}
            ORDER BY c.updated_at DESC
            "#,
            condition
        );

        let connections = sqlx::query_as::<_, ConnectionWithProfile>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(connections)
    }

    pub async fn count_accepted(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM connections WHERE (requester_id = $1 OR recipient_id = $1) AND status = 'accepted'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_pending_incoming(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM connections WHERE recipient_id = $1 AND status = 'pending'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
