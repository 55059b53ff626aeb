//! Approval queues for jobs and mentors

use axum::extract::State;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path};
use crate::middleware::AdminUser;
use crate::models::admin::ApprovalRequest;
use crate::models::job::Job;
use crate::models::mentorship::Mentor;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::logging::log_admin_action;

fn decision(approved: bool) -> &'static str {
    if approved {
        "approved"
    } else {
        "rejected"
    }
}

pub async fn set_job_approval(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<Job>> {
    let job = state
        .db
        .jobs
        .set_approval(id, request.approved)
        .await?
        .ok_or_else(|| PortalError::not_found("Job", id))?;

    log_admin_action(admin.id, "job_approval", Some(&id.to_string()), Some(decision(request.approved)));
    Ok(Json(job))
}

pub async fn set_mentor_approval(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<Mentor>> {
    let mentor = state
        .db
        .mentorship
        .set_mentor_approval(id, request.approved)
        .await?
        .ok_or_else(|| PortalError::not_found("Mentor", id))?;

    log_admin_action(admin.id, "mentor_approval", Some(&id.to_string()), Some(decision(request.approved)));
    Ok(Json(mentor))
}
