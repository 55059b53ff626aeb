//! Alumni directory and admin user management

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::AdminUser;
use crate::models::admin::VerificationRequest;
use crate::models::profile::{CreateProfileRequest, Profile, ProfileFilter};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{is_valid_email, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::utils::logging::log_admin_action;

/// Anonymous directory listing
pub async fn directory(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<ProfileFilter>,
) -> Result<Json<Vec<Profile>>> {
    let (limit, offset) = page.resolve(MAX_PAGE_SIZE);
    Ok(Json(state.db.profiles.search(&filter, limit, offset).await?))
}

pub async fn protected_directory(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(page): Query<Pagination>,
    Query(filter): Query<ProfileFilter>,
) -> Result<Json<Vec<Profile>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.profiles.search(&filter, limit, offset).await?))
}

pub async fn get_profile(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Profile>> {
    let profile = state
        .db
        .profiles
        .find_by_id(id)
        .await?
        .ok_or_else(|| PortalError::not_found("Profile", id))?;

    Ok(Json(profile))
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
    Query(filter): Query<ProfileFilter>,
) -> Result<Json<Vec<Profile>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.profiles.search(&filter, limit, offset).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>> {
    get_profile(State(state), Path(id)).await
}

/// Insert a profile for an identity that already exists with the provider
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse> {
    if !is_valid_email(request.email.trim()) {
        return Err(PortalError::InvalidInput("A valid email address is required".to_string()));
    }

    let profile = state.db.profiles.create(request).await?;
    log_admin_action(admin.id, "create_user", Some(&profile.id.to_string()), None);

    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn set_verification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<VerificationRequest>,
) -> Result<Json<Profile>> {
    let profile = state
        .db
        .profiles
        .set_verification(id, request.status)
        .await?
        .ok_or_else(|| PortalError::not_found("Profile", id))?;

    log_admin_action(admin.id, "set_verification", Some(&id.to_string()), Some(request.status.as_str()));
    Ok(Json(profile))
}
