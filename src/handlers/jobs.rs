//! Job board: postings, applications, reviews and bookmarks

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::{AdminUser, OptionalAuthUser};
use crate::models::job::{
    is_valid_job_type, ApplicationWithApplicant, ApplyRequest, CreateJobRequest, Job, JobApplication,
    JobFilter, ReviewApplicationRequest, UpdateJobRequest, JOB_TYPES,
};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{Pagination, DEFAULT_PAGE_SIZE};
use crate::utils::logging::log_user_action;

pub async fn list_jobs(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(page): Query<Pagination>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<Vec<Job>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    let is_admin = match &viewer {
        Some(user) => state.is_admin(user).await?,
        None => false,
    };

    let jobs = state
        .db
        .jobs
        .list(&filter, viewer.map(|u| u.id), is_admin, limit, offset)
        .await?;

    Ok(Json(jobs))
}

/// Unapproved postings are only visible to their poster and admins
pub async fn get_job(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>> {
    let job = find_job(&state, id).await?;

    if !job.is_approved {
        let allowed = match &viewer {
            Some(user) => job.posted_by == user.id || state.is_admin(user).await?,
            None => false,
        };
        if !allowed {
            return Err(PortalError::not_found("Job", id));
        }
    }

    Ok(Json(job))
}

pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<impl IntoResponse> {
    request.validate(Utc::now())?;

    let job = state.db.jobs.create(user.id, request).await?;
    log_user_action(user.id, "post_job", Some(&job.id.to_string()));

    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateJobRequest>,
) -> Result<Json<Job>> {
    let job = find_job(&state, id).await?;
    ensure_poster(&state, &user, &job).await?;

    if let Some(job_type) = &request.job_type {
        if !is_valid_job_type(job_type) {
            return Err(PortalError::InvalidInput(format!(
                "job_type must be one of: {}",
                JOB_TYPES.join(", ")
            )));
        }
    }
    if matches!(&request.title, Some(title) if title.trim().is_empty()) {
        return Err(PortalError::InvalidInput("title must not be empty".to_string()));
    }

    let updated = state.db.jobs.update(id, request).await?;
    info!(job_id = %id, user_id = %user.id, "Job updated");
    Ok(Json(updated))
}

pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let job = find_job(&state, id).await?;
    ensure_poster(&state, &user, &job).await?;

    if !state.db.jobs.delete(id).await? {
        return Err(PortalError::not_found("Job", id));
    }

    log_user_action(user.id, "delete_job", Some(&id.to_string()));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn apply_to_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplyRequest>,
) -> Result<impl IntoResponse> {
    submit_application(&state, &user, id, request).await
}

/// Same as `apply_to_job` with the job id in the body
pub async fn create_application(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ApplyRequest>,
) -> Result<impl IntoResponse> {
    let job_id = request
        .job_id
        .ok_or_else(|| PortalError::InvalidInput("job_id is required".to_string()))?;

    submit_application(&state, &user, job_id, request).await
}

async fn submit_application(
    state: &AppState,
    user: &AuthUser,
    job_id: Uuid,
    request: ApplyRequest,
) -> Result<(StatusCode, Json<JobApplication>)> {
    let application = state
        .db
        .jobs
        .apply(job_id, user.id, request.cover_letter, request.resume_url)
        .await?;

    log_user_action(user.id, "apply_job", Some(&job_id.to_string()));
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn job_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationWithApplicant>>> {
    let job = find_job(&state, id).await?;
    if job.posted_by != user.id {
        return Err(PortalError::PermissionDenied(
            "Only the job poster can view applications".to_string(),
        ));
    }

    Ok(Json(state.db.jobs.applications_for_job(id).await?))
}

pub async fn my_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ApplicationWithApplicant>>> {
    Ok(Json(state.db.jobs.applications_by_applicant(user.id).await?))
}

pub async fn pending_applications(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ApplicationWithApplicant>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.jobs.pending_applications(limit, offset).await?))
}

pub async fn review_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewApplicationRequest>,
) -> Result<Json<JobApplication>> {
    let is_admin = state.is_admin(&user).await?;
    let application = state
        .db
        .review_application(id, user.id, is_admin, request)
        .await?;

    log_user_action(user.id, "review_application", Some(&application.status));
    Ok(Json(application))
}

pub async fn bookmark_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    find_job(&state, id).await?;
    let created = state.db.jobs.bookmark(id, user.id).await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(json!({ "job_id": id, "bookmarked": true }))))
}

pub async fn remove_bookmark(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.jobs.remove_bookmark(id, user.id).await? {
        return Err(PortalError::not_found("Bookmark", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bookmarked_jobs(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Job>>> {
    Ok(Json(state.db.jobs.bookmarked(user.id).await?))
}

async fn find_job(state: &AppState, id: Uuid) -> Result<Job> {
    state
        .db
        .jobs
        .find_by_id(id)
        .await?
        .ok_or_else(|| PortalError::not_found("Job", id))
}

async fn ensure_poster(state: &AppState, user: &AuthUser, job: &Job) -> Result<()> {
    if job.posted_by == user.id || state.is_admin(user).await? {
        Ok(())
    } else {
        Err(PortalError::PermissionDenied(
            "Only the poster can modify this job".to_string(),
        ))
    }
}
