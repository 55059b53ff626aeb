//! Alumni connection requests

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path};
use crate::models::connection::{
    Connection, ConnectionRequests, ConnectionStatus, ConnectionWithProfile, CreateConnectionRequest,
    RespondConnectionRequest,
};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::logging::log_user_action;

pub async fn connection_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(other_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let connection = if other_id == user.id {
        None
    } else {
        state.db.connections.find_between(user.id, other_id).await?
    };

    let status = ConnectionStatus::resolve(user.id, other_id, connection.as_ref());
    Ok(Json(json!({
        "status": status,
        "connection_id": connection.map(|c| c.id),
    })))
}

pub async fn request_connection(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateConnectionRequest>,
) -> Result<impl IntoResponse> {
    if request.recipient_id != user.id
        && state.db.profiles.find_by_id(request.recipient_id).await?.is_none()
    {
        return Err(PortalError::not_found("Profile", request.recipient_id));
    }

    let connection = state
        .db
        .connections
        .request(user.id, request.recipient_id)
        .await?;

    log_user_action(user.id, "connection_request", Some(&request.recipient_id.to_string()));
    Ok((StatusCode::CREATED, Json(connection)))
}

pub async fn respond_to_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RespondConnectionRequest>,
) -> Result<Json<Connection>> {
    let connection = state
        .db
        .respond_to_connection(id, user.id, request.status)
        .await?;

    log_user_action(user.id, "connection_response", Some(request.status.as_str()));
    Ok(Json(connection))
}

pub async fn list_connections(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ConnectionWithProfile>>> {
    Ok(Json(state.db.connections.list_accepted(user.id).await?))
}

pub async fn pending_requests(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ConnectionRequests>> {
    let (incoming, outgoing) = tokio::try_join!(
        state.db.connections.pending_incoming(user.id),
        state.db.connections.pending_outgoing(user.id),
    )?;

    Ok(Json(ConnectionRequests { incoming, outgoing }))
}

/// Either party may remove the connection
pub async fn remove_connection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let connection = state
        .db
        .connections
        .find_by_id(id)
        .await?
        .ok_or_else(|| PortalError::not_found("Connection", id))?;

    if connection.requester_id != user.id && connection.recipient_id != user.id {
        return Err(PortalError::PermissionDenied(
            "You are not part of this connection".to_string(),
        ));
    }

    state.db.connections.delete(id).await?;
    log_user_action(user.id, "connection_removed", Some(&id.to_string()));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn connection_count(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let count = state.db.connections.count_accepted(user_id).await?;
    Ok(Json(json!({ "user_id": user_id, "count": count })))
}
