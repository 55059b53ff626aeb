//! Event repository implementation

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::event::{
    CreateEventRequest, Event, EventAttendee, EventFilter, EventRsvp, UpdateEventRequest,
};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::like_pattern;

pub(crate) const EVENT_COLUMNS: &str = "id, title, description, category, location, is_virtual, \
    virtual_link, start_date, end_date, registration_deadline, max_attendees, featured_image_url, \
    tags, organizer_id, is_published, is_approved, created_at, updated_at";

/// Who is asking, for visibility of unpublished events
#[derive(Debug, Clone, Copy, Default)]
pub struct EventViewer {
    pub user_id: Option<Uuid>,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event organized by `organizer_id`
    pub async fn create(&self, organizer_id: Uuid, request: CreateEventRequest) -> Result<Event> {
        let sql = format!(
            r#"
            INSERT INTO events (title, description, category, location, is_virtual, virtual_link,
                                start_date, end_date, registration_deadline, max_attendees,
                                featured_image_url, tags, organizer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(request.title.trim())
            .bind(request.description)
            .bind(request.category.unwrap_or_else(|| "general".to_string()))
            .bind(request.location)
            .bind(request.is_virtual)
            .bind(request.virtual_link)
            .bind(request.start_date)
            .bind(request.end_date)
            .bind(request.registration_deadline)
            .bind(request.max_attendees)
            .bind(request.featured_image_url)
            .bind(request.tags)
            .bind(organizer_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(event)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Update event
    pub async fn update(&self, id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        let sql = format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                location = COALESCE($5, location),
                is_virtual = COALESCE($6, is_virtual),
                virtual_link = COALESCE($7, virtual_link),
                start_date = COALESCE($8, start_date),
                end_date = COALESCE($9, end_date),
                registration_deadline = COALESCE($10, registration_deadline),
                max_attendees = COALESCE($11, max_attendees),
                featured_image_url = COALESCE($12, featured_image_url),
                tags = COALESCE($13, tags),
                is_published = COALESCE($14, is_published),
                updated_at = $15
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(request.title)
            .bind(request.description)
            .bind(request.category)
            .bind(request.location)
            .bind(request.is_virtual)
            .bind(request.virtual_link)
            .bind(request.start_date)
            .bind(request.end_date)
            .bind(request.registration_deadline)
            .bind(request.max_attendees)
            .bind(request.featured_image_url)
            .bind(request.tags)
            .bind(request.is_published)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PortalError::not_found("Event", id))?;

        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Filtered listing ordered by start date
    pub async fn list(
        &self,
        filter: &EventFilter,
        viewer: EventViewer,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM events WHERE TRUE", EVENT_COLUMNS));

        if !viewer.is_admin {
            query.push(" AND ((is_published AND is_approved)");
            if let Some(user_id) = viewer.user_id {
                query.push(" OR organizer_id = ").push_bind(user_id);
            }
            query.push(")");
        }
        if filter.upcoming_only {
            query.push(" AND start_date >= ").push_bind(Utc::now());
        }
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(is_virtual) = filter.is_virtual {
            query.push(" AND is_virtual = ").push_bind(is_virtual);
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            query
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query
            .push(" ORDER BY start_date ASC, id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    /// Register `user_id` for the event with the event row locked
    pub async fn rsvp(&self, event_id: Uuid, user_id: Uuid) -> Result<EventRsvp> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM events WHERE id = $1 FOR UPDATE", EVENT_COLUMNS);
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| PortalError::not_found("Event", event_id))?;

        if let Some(reason) = event.registration_closed_reason(Utc::now()) {
            return Err(PortalError::InvalidInput(reason.to_string()));
        }

        let already_registered: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM event_rsvps WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_registered {
            return Err(PortalError::Conflict(
                "Already registered for this event".to_string(),
            ));
        }

        let attendee_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM event_rsvps WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;

        if event.is_full(attendee_count) {
            return Err(PortalError::Conflict("Event is full".to_string()));
        }

        let rsvp = sqlx::query_as::<_, EventRsvp>(
            r#"
            INSERT INTO event_rsvps (event_id, user_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, user_id, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rsvp)
    }

    pub async fn cancel_rsvp(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM event_rsvps WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn attendees(&self, event_id: Uuid) -> Result<Vec<EventAttendee>> {
        let attendees = sqlx::query_as::<_, EventAttendee>(
            r#"
            SELECT r.id, r.event_id, r.user_id, r.created_at,
                   p.full_name, p.avatar_url, p.current_job_title
            FROM event_rsvps r
            JOIN profiles p ON p.id = r.user_id
            WHERE r.event_id = $1
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    pub async fn attendee_count(&self, event_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_rsvps WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Upcoming events the user has an RSVP for
    pub async fn upcoming_for_attendee(&self, user_id: Uuid, limit: i64) -> Result<Vec<Event>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM events
            WHERE id IN (SELECT event_id FROM event_rsvps WHERE user_id = $1)
              AND start_date >= NOW()
            ORDER BY start_date ASC
            LIMIT $2
            "#,
            EVENT_COLUMNS
        );

        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }
}
