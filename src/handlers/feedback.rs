//! Site feedback submissions

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;

use crate::handlers::extract::{Json, Query};
use crate::middleware::AdminUser;
use crate::models::feedback::{CreateFeedbackRequest, Feedback};
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{is_valid_email, require_text, Pagination, DEFAULT_PAGE_SIZE};

const MAX_FEEDBACK_LENGTH: usize = 5000;

/// Store the feedback, then alert the admins; a failed alert keeps the record
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(mut request): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse> {
    request.name = require_text("name", &request.name, 200)?;
    request.message = require_text("message", &request.message, MAX_FEEDBACK_LENGTH)?;
    if !is_valid_email(request.email.trim()) {
        return Err(PortalError::InvalidInput("A valid email address is required".to_string()));
    }

    let feedback = state.db.feedback.create(request).await?;

    let notified = match state.services.notifications.send_feedback_alert(&feedback).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                feedback_id = %feedback.id,
                error = %e,
                recoverable = e.is_recoverable(),
                "Feedback stored but alert failed"
            );
            false
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "feedback": feedback,
            "notified": notified,
        })),
    ))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Feedback>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.feedback.list(limit, offset).await?))
}
