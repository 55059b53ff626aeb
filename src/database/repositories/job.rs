//! Job board repository: jobs, companies, applications and bookmarks

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::admin::JobApplicationCounts;
use crate::models::job::{
    ApplicationStatus, ApplicationWithApplicant, Company, CompanyInput, CreateJobRequest, Job,
    JobApplication, JobFilter, JobSort, UpdateJobRequest,
};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::like_pattern;

pub(crate) const JOB_COLUMNS: &str = "id, title, company_name, company_id, description, location, \
    job_type, industry, salary_range, requirements, application_url, contact_email, deadline, \
    expires_at, posted_by, is_active, is_approved, created_at, updated_at";

const APPLICATION_COLUMNS: &str = "id, job_id, applicant_id, cover_letter, resume_url, status, \
    review_notes, reviewed_by, created_at, updated_at";

const APPLICATION_WITH_APPLICANT: &str = r#"
    SELECT a.id, a.job_id, j.title AS job_title, a.applicant_id,
           p.full_name AS applicant_name, p.email AS applicant_email,
           a.cover_letter, a.resume_url, a.status, a.created_at
    FROM job_applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN profiles p ON p.id = a.applicant_id
"#;

#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert the company (when given) and insert the job in one transaction
    pub async fn create(&self, posted_by: Uuid, request: CreateJobRequest) -> Result<Job> {
        let mut tx = self.pool.begin().await?;

        let company = match request.company {
            Some(input) => Some(upsert_company(&mut tx, posted_by, input).await?),
            None => None,
        };

        let company_name = company
            .as_ref()
            .map(|c| c.name.clone())
            .or(request.company_name)
            .map(|name| name.trim().to_string())
            .unwrap_or_default();

        let sql = format!(
            r#"
            INSERT INTO jobs (title, company_name, company_id, description, location, job_type,
                              industry, salary_range, requirements, application_url, contact_email,
                              deadline, expires_at, posted_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            RETURNING {}
            "#,
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(request.title.trim())
            .bind(company_name)
            .bind(company.map(|c| c.id))
            .bind(request.description)
            .bind(request.location)
            .bind(request.job_type.unwrap_or_else(|| "full_time".to_string()))
            .bind(request.industry)
            .bind(request.salary_range)
            .bind(request.requirements)
            .bind(request.application_url)
            .bind(request.contact_email)
            .bind(request.deadline)
            .bind(request.expires_at)
            .bind(posted_by)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(job)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    pub async fn update(&self, id: Uuid, request: UpdateJobRequest) -> Result<Job> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                job_type = COALESCE($5, job_type),
                industry = COALESCE($6, industry),
                salary_range = COALESCE($7, salary_range),
                requirements = COALESCE($8, requirements),
                application_url = COALESCE($9, application_url),
                contact_email = COALESCE($10, contact_email),
                deadline = COALESCE($11, deadline),
                expires_at = COALESCE($12, expires_at),
                is_active = COALESCE($13, is_active),
                updated_at = $14
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(request.title)
            .bind(request.description)
            .bind(request.location)
            .bind(request.job_type)
            .bind(request.industry)
            .bind(request.salary_range)
            .bind(request.requirements)
            .bind(request.application_url)
            .bind(request.contact_email)
            .bind(request.deadline)
            .bind(request.expires_at)
            .bind(request.is_active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PortalError::not_found("Job", id))?;

        Ok(job)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Filtered, sorted listing. Non-admins see approved jobs and their own.
    pub async fn list(
        &self,
        filter: &JobFilter,
        viewer: Option<Uuid>,
        is_admin: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM jobs WHERE TRUE", JOB_COLUMNS));

        if !is_admin {
            query.push(" AND (is_approved");
            if let Some(user_id) = viewer {
                query.push(" OR posted_by = ").push_bind(user_id);
            }
            query.push(")");
        }
        if filter.active_only {
            query
                .push(" AND is_active AND (expires_at IS NULL OR expires_at > ")
                .push_bind(Utc::now())
                .push(")");
        }
        if let Some(job_type) = filter.job_type.as_deref().filter(|t| !t.is_empty()) {
            query.push(" AND job_type = ").push_bind(job_type.to_string());
        }
        if let Some(location) = filter.location.as_deref().filter(|l| !l.trim().is_empty()) {
            query.push(" AND location ILIKE ").push_bind(like_pattern(location));
        }
        if let Some(industry) = filter.industry.as_deref().filter(|i| !i.is_empty()) {
            query.push(" AND industry = ").push_bind(industry.to_string());
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            query
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR company_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query.push(match filter.sort {
            JobSort::Newest => " ORDER BY created_at DESC, id ASC",
            JobSort::Oldest => " ORDER BY created_at ASC, id ASC",
            JobSort::Deadline => " ORDER BY deadline ASC NULLS LAST, created_at DESC, id ASC",
        });
        query
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let jobs = query.build_query_as::<Job>().fetch_all(&self.pool).await?;
        Ok(jobs)
    }

    /// Latest approved, open jobs
    pub async fn recent(&self, limit: i64) -> Result<Vec<Job>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM jobs
            WHERE is_approved AND is_active AND (expires_at IS NULL OR expires_at > NOW())
            ORDER BY created_at DESC
            LIMIT $1
            "#,
            JOB_COLUMNS
        );

        let jobs = sqlx::query_as::<_, Job>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(jobs)
    }

    pub async fn set_approval(&self, id: Uuid, approved: bool) -> Result<Option<Job>> {
        let sql = format!(
            "UPDATE jobs SET is_approved = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(approved)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    /// Submit an application; one per job and applicant
    pub async fn apply(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        cover_letter: Option<String>,
        resume_url: Option<String>,
    ) -> Result<JobApplication> {
        let job = self
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Job", job_id))?;

        if !job.is_open(Utc::now()) {
            return Err(PortalError::InvalidInput(
                "This job is no longer accepting applications".to_string(),
            ));
        }

        let sql = format!(
            r#"
            INSERT INTO job_applications (job_id, applicant_id, cover_letter, resume_url, status,
                                          created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $5)
            ON CONFLICT (job_id, applicant_id) DO NOTHING
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );

        sqlx::query_as::<_, JobApplication>(&sql)
            .bind(job_id)
            .bind(applicant_id)
            .bind(cover_letter)
            .bind(resume_url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PortalError::Conflict("You have already applied to this job".to_string()))
    }

    pub async fn find_application(&self, id: Uuid) -> Result<Option<JobApplication>> {
        let sql = format!("SELECT {} FROM job_applications WHERE id = $1", APPLICATION_COLUMNS);
        let application = sqlx::query_as::<_, JobApplication>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(application)
    }

    pub async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<ApplicationWithApplicant>> {
        let sql = format!("{} WHERE a.job_id = $1 ORDER BY a.created_at DESC", APPLICATION_WITH_APPLICANT);
        let applications = sqlx::query_as::<_, ApplicationWithApplicant>(&sql)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(applications)
    }

    pub async fn applications_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<ApplicationWithApplicant>> {
        let sql = format!(
            "{} WHERE a.applicant_id = $1 ORDER BY a.created_at DESC",
            APPLICATION_WITH_APPLICANT
        );
        let applications = sqlx::query_as::<_, ApplicationWithApplicant>(&sql)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(applications)
    }

    pub async fn pending_applications(&self, limit: i64, offset: i64) -> Result<Vec<ApplicationWithApplicant>> {
        let sql = format!(
            "{} WHERE a.status = 'pending' ORDER BY a.created_at ASC LIMIT $1 OFFSET $2",
            APPLICATION_WITH_APPLICANT
        );
        let applications = sqlx::query_as::<_, ApplicationWithApplicant>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(applications)
    }

    /// Move an application to `next`, enforcing review transitions under a row lock
    pub async fn review_application(
        &self,
        id: Uuid,
        next: ApplicationStatus,
        review_notes: Option<String>,
        reviewer: Uuid,
    ) -> Result<JobApplication> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM job_applications WHERE id = $1 FOR UPDATE",
            APPLICATION_COLUMNS
        );
        let current = sqlx::query_as::<_, JobApplication>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| PortalError::not_found("Job application", id))?;

        let status: ApplicationStatus = current.status.parse()?;
        if status.is_terminal() {
            return Err(PortalError::Conflict(format!("Application is already {}", status)));
        }
        if !status.can_transition_to(next) {
            return Err(PortalError::Conflict(format!(
                "Cannot change application status from {} to {}",
                status, next
            )));
        }

        let sql = format!(
            r#"
            UPDATE job_applications
            SET status = $2,
                review_notes = COALESCE($3, review_notes),
                reviewed_by = $4,
                updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, JobApplication>(&sql)
            .bind(id)
            .bind(next.as_str())
            .bind(review_notes)
            .bind(reviewer)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(application)
    }

    /// Returns false when the bookmark already existed
    pub async fn bookmark(&self, job_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO job_bookmarks (job_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(job_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_bookmark(&self, job_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_bookmarks WHERE job_id = $1 AND user_id = $2")
            .bind(job_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn bookmarked(&self, user_id: Uuid) -> Result<Vec<Job>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM jobs
            WHERE id IN (SELECT job_id FROM job_bookmarks WHERE user_id = $1)
            ORDER BY created_at DESC
            "#,
            JOB_COLUMNS
        );

        let jobs = sqlx::query_as::<_, Job>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(jobs)
    }

    /// Per-job application tallies for a poster
    pub async fn application_counts_for_poster(&self, posted_by: Uuid) -> Result<Vec<JobApplicationCounts>> {
        let counts = sqlx::query_as::<_, JobApplicationCounts>(
            r#"
            SELECT j.id AS job_id, j.title, j.is_active, j.is_approved,
                   COUNT(a.id) AS total,
                   COUNT(a.id) FILTER (WHERE a.status = 'pending') AS pending,
                   COUNT(a.id) FILTER (WHERE a.status = 'reviewed') AS reviewed,
                   COUNT(a.id) FILTER (WHERE a.status = 'shortlisted') AS shortlisted,
                   COUNT(a.id) FILTER (WHERE a.status = 'accepted') AS accepted,
                   COUNT(a.id) FILTER (WHERE a.status = 'rejected') AS rejected
            FROM jobs j
            LEFT JOIN job_applications a ON a.job_id = j.id
            WHERE j.posted_by = $1
            GROUP BY j.id
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(posted_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    pub async fn recent_applications_for_poster(
        &self,
        posted_by: Uuid,
        limit: i64,
    ) -> Result<Vec<ApplicationWithApplicant>> {
        let sql = format!(
            "{} WHERE j.posted_by = $1 ORDER BY a.created_at DESC LIMIT $2",
            APPLICATION_WITH_APPLICANT
        );
        let applications = sqlx::query_as::<_, ApplicationWithApplicant>(&sql)
            .bind(posted_by)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(applications)
    }
}

async fn upsert_company(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    created_by: Uuid,
    input: CompanyInput,
) -> Result<Company> {
    let company = sqlx::query_as::<_, Company>(
        r#"
        INSERT INTO companies (name, website, industry, logo_url, description, created_by,
                               created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (name) DO UPDATE
        SET website = COALESCE(EXCLUDED.website, companies.website),
            industry = COALESCE(EXCLUDED.industry, companies.industry),
            logo_url = COALESCE(EXCLUDED.logo_url, companies.logo_url),
            description = COALESCE(EXCLUDED.description, companies.description),
            updated_at = EXCLUDED.updated_at
        RETURNING id, name, website, industry, logo_url, description, created_by, created_at, updated_at
        "#,
    )
    .bind(input.name.trim())
    .bind(input.website)
    .bind(input.industry)
    .bind(input.logo_url)
    .bind(input.description)
    .bind(created_by)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(company)
}
