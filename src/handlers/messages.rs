//! Direct messages and conversations

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path, Query};
use crate::models::message::{ConversationSummary, Message, SendMessageRequest, StartConversationRequest};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{Pagination, DEFAULT_PAGE_SIZE};

pub async fn start_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<StartConversationRequest>,
) -> Result<impl IntoResponse> {
    if request.other_user_id != user.id
        && state.db.profiles.find_by_id(request.other_user_id).await?.is_none()
    {
        return Err(PortalError::not_found("Profile", request.other_user_id));
    }

    let conversation_id = state
        .db
        .messages
        .get_or_create_conversation(user.id, request.other_user_id)
        .await?;

    Ok(Json(json!({ "conversation_id": conversation_id })))
}

pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state.db.send_message(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Message>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.messages.list_for_user(user.id, limit, offset).await?))
}

pub async fn messages_with_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(other_id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Message>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.messages.between(user.id, other_id, limit, offset).await?))
}

pub async fn recent_conversations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ConversationSummary>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(
        state
            .db
            .messages
            .recent_conversations(user.id, limit, offset)
            .await?,
    ))
}

/// Only the recipient can mark a message read; anyone else sees a 404
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>> {
    let message = state
        .db
        .messages
        .mark_read(id, user.id)
        .await?
        .ok_or_else(|| PortalError::not_found("Message", id))?;

    Ok(Json(message))
}

pub async fn mark_conversation_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.db.messages.is_participant(id, user.id).await? {
        return Err(PortalError::not_found("Conversation", id));
    }

    let updated = state.db.messages.mark_conversation_as_read(id, user.id).await?;
    Ok(Json(json!({ "conversation_id": id, "marked_read": updated })))
}

pub async fn unread_count(State(state): State<AppState>, user: AuthUser) -> Result<impl IntoResponse> {
    let count = state.db.messages.unread_count(user.id).await?;
    Ok(Json(json!({ "unread_count": count })))
}
