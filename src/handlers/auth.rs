//! Registration, login and the caller's own account

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{info, warn};

use crate::handlers::extract::Json;
use crate::models::auth::{LegacyRegisterRequest, LoginRequest, RegisterRequest};
use crate::models::profile::{Profile, UpdateProfileRequest};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let registration = state.services.users.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "user": registration.user,
            "profile": registration.profile,
        })),
    ))
}

pub async fn register_legacy(
    State(state): State<AppState>,
    Json(request): Json<LegacyRegisterRequest>,
) -> Result<impl IntoResponse> {
    let registration = state.services.users.register_legacy(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully. Please check your email for verification.",
            "user_id": registration.user.id,
        })),
    ))
}

/// Credential check that reports whether the account exists
pub async fn test_login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Response {
    match state.services.users.sign_in(&request.email, &request.password).await {
        Ok(session) => {
            info!(user_id = %session.user.id, "Test login succeeded");
            Json(json!({
                "success": true,
                "user_exists": true,
                "user_id": session.user.id,
                "email": session.user.email,
            }))
            .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Test login failed");
            (
                e.status_code(),
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "user_exists": false,
                })),
            )
                .into_response()
        }
    }
}

/// Password login returning the provider's access token
pub async fn login_token(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let session = state
        .services
        .users
        .sign_in(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            PortalError::Authentication(_) => {
                PortalError::Authentication("Invalid email or password".to_string())
            }
            other => other,
        })?;

    Ok(Json(json!({
        "access_token": session.access_token,
        "token_type": "bearer",
    })))
}

pub async fn current_user(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}

pub async fn own_profile(State(state): State<AppState>, user: AuthUser) -> Result<Json<Profile>> {
    let profile = state
        .db
        .profiles
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| PortalError::not_found("Profile", user.id))?;

    Ok(Json(profile))
}

pub async fn update_own_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    let profile = state
        .db
        .profiles
        .update(user.id, request)
        .await?
        .ok_or_else(|| PortalError::not_found("Profile", user.id))?;

    info!(user_id = %user.id, "Profile updated");
    Ok(Json(profile))
}
