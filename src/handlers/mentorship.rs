//! Mentor directory and mentorship requests

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path, Query};
use crate::models::mentorship::{
    CreateMentorshipRequest, MentorFilter, MentorWithProfile, MentorshipRequest, RegisterMentorRequest,
    RespondMentorshipRequest,
};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::Result;
use crate::utils::helpers::{Pagination, DEFAULT_PAGE_SIZE};
use crate::utils::logging::log_user_action;

pub async fn list_mentors(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<MentorFilter>,
) -> Result<Json<Vec<MentorWithProfile>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.mentorship.list_available(&filter, limit, offset).await?))
}

pub async fn register_mentor(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RegisterMentorRequest>,
) -> Result<impl IntoResponse> {
    let mentor = state.db.mentorship.register_mentor(user.id, request).await?;
    log_user_action(user.id, "register_mentor", Some(&mentor.id.to_string()));
    Ok((StatusCode::CREATED, Json(mentor)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<MentorshipRequest>>> {
    Ok(Json(state.db.mentorship.requests_for_user(user.id).await?))
}

pub async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateMentorshipRequest>,
) -> Result<impl IntoResponse> {
    let created = state.db.mentorship.create_request(user.id, request).await?;
    log_user_action(user.id, "mentorship_request", Some(&created.mentor_id.to_string()));
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn respond_to_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RespondMentorshipRequest>,
) -> Result<Json<MentorshipRequest>> {
    let updated = state
        .db
        .respond_to_mentorship(id, user.id, request.status)
        .await?;

    log_user_action(user.id, "mentorship_response", Some(request.status.as_str()));
    Ok(Json(updated))
}
