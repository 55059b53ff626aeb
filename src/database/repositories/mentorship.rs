//! Mentor and mentorship request repository

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::mentorship::{
    CreateMentorshipRequest, Mentor, MentorFilter, MentorWithProfile, MentorshipDecision,
    MentorshipRequest, RegisterMentorRequest, DEFAULT_MAX_MENTEES,
};
use crate::utils::errors::{PortalError, Result};

const MENTOR_COLUMNS: &str = "id, user_id, expertise, mentoring_statement, max_mentees, \
    is_available, status, created_at, updated_at";

const REQUEST_COLUMNS: &str =
    "id, mentor_id, mentee_id, goals, message, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct MentorshipRepository {
    pool: PgPool,
}

impl MentorshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register the user as a mentor awaiting admin approval
    pub async fn register_mentor(&self, user_id: Uuid, request: RegisterMentorRequest) -> Result<Mentor> {
        let max_mentees = request.max_mentees.unwrap_or(DEFAULT_MAX_MENTEES);
        if max_mentees <= 0 {
            return Err(PortalError::InvalidInput(
                "max_mentees must be greater than 0".to_string(),
            ));
        }

        let sql = format!(
            r#"
            INSERT INTO mentors (user_id, expertise, mentoring_statement, max_mentees, is_available,
                                 status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, 'pending', $5, $5)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING {}
            "#,
            MENTOR_COLUMNS
        );

        sqlx::query_as::<_, Mentor>(&sql)
            .bind(user_id)
            .bind(request.expertise)
            .bind(request.mentoring_statement)
            .bind(max_mentees)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PortalError::Conflict("Already registered as a mentor".to_string()))
    }

    pub async fn find_mentor(&self, id: Uuid) -> Result<Option<Mentor>> {
        let sql = format!("SELECT {} FROM mentors WHERE id = $1", MENTOR_COLUMNS);
        let mentor = sqlx::query_as::<_, Mentor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(mentor)
    }

    /// Approved, available mentors with their profiles
    pub async fn list_available(&self, filter: &MentorFilter, limit: i64, offset: i64) -> Result<Vec<MentorWithProfile>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT m.id, m.user_id, m.expertise, m.mentoring_statement, m.max_mentees,
                   m.is_available, m.status, p.full_name, p.avatar_url, p.current_job_title,
                   p.current_company
            FROM mentors m
            JOIN profiles p ON p.id = m.user_id
            WHERE m.status = 'approved' AND m.is_available
            "#,
        );

        if let Some(expertise) = filter.expertise.as_deref().filter(|e| !e.trim().is_empty()) {
            query
                .push(" AND ")
                .push_bind(expertise.trim().to_string())
                .push(" = ANY(m.expertise)");
        }

        query
            .push(" ORDER BY p.full_name ASC NULLS LAST, m.id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let mentors = query.build_query_as::<MentorWithProfile>().fetch_all(&self.pool).await?;
        Ok(mentors)
    }

    /// Admin decision on a mentor application, mirrored onto the profile
    pub async fn set_mentor_approval(&self, id: Uuid, approved: bool) -> Result<Option<Mentor>> {
        let status = if approved { "approved" } else { "rejected" };
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE mentors SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            MENTOR_COLUMNS
        );
        let mentor = sqlx::query_as::<_, Mentor>(&sql)
            .bind(id)
            .bind(status)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(mentor) = &mentor {
            sqlx::query(
                "UPDATE profiles SET is_mentor = $2, mentor_status = $3, updated_at = $4 WHERE id = $1",
            )
            .bind(mentor.user_id)
            .bind(approved)
            .bind(status)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(mentor)
    }

    /// Ask an approved mentor for mentorship
    pub async fn create_request(&self, mentee_id: Uuid, request: CreateMentorshipRequest) -> Result<MentorshipRequest> {
        let mentor = self
            .find_mentor(request.mentor_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Mentor", request.mentor_id))?;

        if mentor.user_id == mentee_id {
            return Err(PortalError::InvalidInput(
                "You cannot request mentorship from yourself".to_string(),
            ));
        }
        if mentor.status != "approved" || !mentor.is_available {
            return Err(PortalError::InvalidInput(
                "This mentor is not accepting requests".to_string(),
            ));
        }

        let sql = format!(
            r#"
            INSERT INTO mentorship_requests (mentor_id, mentee_id, goals, message, status,
                                             created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $5)
            ON CONFLICT (mentor_id, mentee_id) WHERE status = 'pending' DO NOTHING
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, MentorshipRequest>(&sql)
            .bind(mentor.id)
            .bind(mentee_id)
            .bind(request.goals)
            .bind(request.message)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                PortalError::Conflict("A request to this mentor is already pending".to_string())
            })
    }

    /// Requests where the user is the mentee or the mentor
    pub async fn requests_for_user(&self, user_id: Uuid) -> Result<Vec<MentorshipRequest>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM mentorship_requests
            WHERE mentee_id = $1
               OR mentor_id IN (SELECT id FROM mentors WHERE user_id = $1)
            ORDER BY created_at DESC
            "#,
            REQUEST_COLUMNS
        );

        let requests = sqlx::query_as::<_, MentorshipRequest>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    /// Mentor's answer; accepting respects the mentor's capacity
    pub async fn respond(
        &self,
        request_id: Uuid,
        mentor_user_id: Uuid,
        decision: MentorshipDecision,
    ) -> Result<MentorshipRequest> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM mentorship_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        );
        let current = sqlx::query_as::<_, MentorshipRequest>(&sql)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| PortalError::not_found("Mentorship request", request_id))?;

        // Lock the mentor so concurrent accepts see each other
        let sql = format!("SELECT {} FROM mentors WHERE id = $1 FOR UPDATE", MENTOR_COLUMNS);
        let mentor = sqlx::query_as::<_, Mentor>(&sql)
            .bind(current.mentor_id)
            .fetch_one(&mut *tx)
            .await?;

        if mentor.user_id != mentor_user_id {
            return Err(PortalError::PermissionDenied(
                "Only the mentor can respond to this request".to_string(),
            ));
        }
        if current.status != "pending" {
            return Err(PortalError::Conflict(format!(
                "Mentorship request is already {}",
                current.status
            )));
        }

        if decision == MentorshipDecision::Accepted {
            let accepted: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM mentorship_requests WHERE mentor_id = $1 AND status = 'accepted'",
            )
            .bind(mentor.id)
            .fetch_one(&mut *tx)
            .await?;

            if accepted >= i64::from(mentor.max_mentees) {
                return Err(PortalError::Conflict(
                    "Mentor has reached the maximum number of mentees".to_string(),
                ));
            }
        }

        let sql = format!(
            "UPDATE mentorship_requests SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            REQUEST_COLUMNS
        );
        let updated = sqlx::query_as::<_, MentorshipRequest>(&sql)
            .bind(request_id)
            .bind(decision.as_str())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
