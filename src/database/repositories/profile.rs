//! Profile repository implementation

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::profile::{
    CreateProfileRequest, Profile, ProfileFilter, UpdateProfileRequest, VerificationStatus,
};
use crate::utils::errors::Result;
use crate::utils::helpers::like_pattern;

pub(crate) const PROFILE_COLUMNS: &str = "id, email, first_name, last_name, full_name, phone, \
    graduation_year, degree, department, current_company, current_job_title, location, bio, \
    avatar_url, linkedin_url, skills, account_type, is_admin, is_verified, is_mentor, is_employer, \
    alumni_verification_status, mentor_status, mentee_status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the profile row for a freshly registered identity
    pub async fn create(&self, request: CreateProfileRequest) -> Result<Profile> {
        let account_type = request
            .account_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "alumni".to_string());
        let is_employer = account_type == "employer";

        let sql = format!(
            r#"
            INSERT INTO profiles (id, email, first_name, last_name, full_name, phone, graduation_year,
                                  degree, account_type, is_employer, is_verified,
                                  alumni_verification_status, mentor_status, mentee_status,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, NULLIF(CONCAT_WS(' ', $3, $4), ''), $5, $6, $7, $8, $9, FALSE,
                    'pending', 'pending', 'pending', $10, $10)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(request.id)
            .bind(request.email.trim().to_lowercase())
            .bind(request.first_name)
            .bind(request.last_name)
            .bind(request.phone)
            .bind(request.graduation_year)
            .bind(request.degree)
            .bind(account_type)
            .bind(is_employer)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(profile)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let sql = format!("SELECT {} FROM profiles WHERE email = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Apply a self-service edit; `full_name` follows the name parts
    pub async fn update(&self, id: Uuid, request: UpdateProfileRequest) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                full_name = NULLIF(CONCAT_WS(' ', COALESCE($2, first_name), COALESCE($3, last_name)), ''),
                phone = COALESCE($4, phone),
                graduation_year = COALESCE($5, graduation_year),
                degree = COALESCE($6, degree),
                department = COALESCE($7, department),
                current_company = COALESCE($8, current_company),
                current_job_title = COALESCE($9, current_job_title),
                location = COALESCE($10, location),
                bio = COALESCE($11, bio),
                avatar_url = COALESCE($12, avatar_url),
                linkedin_url = COALESCE($13, linkedin_url),
                skills = COALESCE($14, skills),
                updated_at = $15
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(request.first_name)
            .bind(request.last_name)
            .bind(request.phone)
            .bind(request.graduation_year)
            .bind(request.degree)
            .bind(request.department)
            .bind(request.current_company)
            .bind(request.current_job_title)
            .bind(request.location)
            .bind(request.bio)
            .bind(request.avatar_url)
            .bind(request.linkedin_url)
            .bind(request.skills)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Directory search ordered by name
    pub async fn search(&self, filter: &ProfileFilter, limit: i64, offset: i64) -> Result<Vec<Profile>> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM profiles WHERE TRUE", PROFILE_COLUMNS));

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            query
                .push(" AND (full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR current_company ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR current_job_title ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(year) = filter.graduation_year {
            query.push(" AND graduation_year = ").push_bind(year);
        }
        if let Some(department) = filter.department.as_deref().filter(|d| !d.is_empty()) {
            query.push(" AND department = ").push_bind(department.to_string());
        }
        if let Some(location) = filter.location.as_deref().filter(|l| !l.is_empty()) {
            query.push(" AND location ILIKE ").push_bind(like_pattern(location));
        }
        if let Some(is_mentor) = filter.is_mentor {
            query.push(" AND is_mentor = ").push_bind(is_mentor);
        }

        query
            .push(" ORDER BY full_name ASC NULLS LAST, id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let profiles = query.build_query_as::<Profile>().fetch_all(&self.pool).await?;
        Ok(profiles)
    }

    /// Set the alumni verification outcome
    pub async fn set_verification(&self, id: Uuid, status: VerificationStatus) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET alumni_verification_status = $2,
                is_verified = $3,
                updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(status == VerificationStatus::Approved)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    pub async fn is_admin(&self, id: Uuid) -> Result<bool> {
        let is_admin: Option<bool> = sqlx::query_scalar("SELECT is_admin FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(is_admin.unwrap_or(false))
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
