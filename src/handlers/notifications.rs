//! In-app notifications and the admin outbound channels

use axum::extract::State;
use serde_json::json;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::AdminUser;
use crate::models::notification::{EmailRequest, Notification, NotificationFilter, WhatsAppRequest};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{is_valid_phone, require_text, Pagination, DEFAULT_PAGE_SIZE};
use crate::utils::logging::log_admin_action;

const MAX_SUBJECT_LENGTH: usize = 200;

pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<Pagination>,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<Vec<Notification>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(
        state
            .db
            .notifications
            .list(user.id, filter.unread_only, limit, offset)
            .await?,
    ))
}

pub async fn unread_count(State(state): State<AppState>, user: AuthUser) -> Result<Json<serde_json::Value>> {
    let count = state.db.notifications.unread_count(user.id).await?;
    Ok(Json(json!({ "unread_count": count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let notification = state
        .db
        .notifications
        .mark_read(id, user.id)
        .await?
        .ok_or_else(|| PortalError::not_found("Notification", id))?;

    Ok(Json(notification))
}

pub async fn mark_all_read(State(state): State<AppState>, user: AuthUser) -> Result<Json<serde_json::Value>> {
    let updated = state.db.notifications.mark_all_read(user.id).await?;
    Ok(Json(json!({ "marked_read": updated })))
}

pub async fn send_email(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<EmailRequest>,
) -> Result<Json<serde_json::Value>> {
    let subject = require_text("subject", &request.subject, MAX_SUBJECT_LENGTH)?;
    if request.html_content.trim().is_empty() {
        return Err(PortalError::InvalidInput("html_content is required".to_string()));
    }

    let report = state
        .services
        .notifications
        .send_email(request.to_email.trim(), &subject, &request.html_content)
        .await?;

    log_admin_action(admin.id, "send_email", Some(request.to_email.trim()), report.message_id.as_deref());
    Ok(Json(json!({ "status": "success" })))
}

pub async fn send_whatsapp(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<WhatsAppRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.to_number.trim().is_empty() || request.template_name.trim().is_empty() {
        return Err(PortalError::InvalidInput(
            "to_number and template_name are required".to_string(),
        ));
    }
    if !is_valid_phone(request.to_number.trim()) {
        return Err(PortalError::InvalidInput(format!(
            "Invalid WhatsApp number: {}",
            request.to_number.trim()
        )));
    }

    let report = state
        .services
        .notifications
        .send_whatsapp_template(
            request.to_number.trim(),
            request.template_name.trim(),
            &request.parameters,
        )
        .await?;

    log_admin_action(admin.id, "send_whatsapp", Some(request.template_name.trim()), None);
    Ok(Json(json!({
        "status": "success",
        "ticket_id": report.message_id,
    })))
}
