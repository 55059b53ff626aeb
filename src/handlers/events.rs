//! Event listing, management and RSVPs

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path, Query};
use crate::database::EventViewer;
use crate::middleware::OptionalAuthUser;
use crate::models::event::{
    validate_schedule, CreateEventRequest, Event, EventAttendee, EventFilter, UpdateEventRequest,
};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{require_text, Pagination, DEFAULT_PAGE_SIZE};
use crate::utils::logging::log_user_action;

const MAX_TITLE_LENGTH: usize = 200;

pub async fn list_events(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(page): Query<Pagination>,
    Query(filter): Query<EventFilter>,
) -> Result<Json<Vec<Event>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    let viewer = match &viewer {
        Some(user) => EventViewer {
            user_id: Some(user.id),
            is_admin: state.is_admin(user).await?,
        },
        None => EventViewer::default(),
    };

    Ok(Json(state.db.events.list(&filter, viewer, limit, offset).await?))
}

/// Drafts and unapproved events are only visible to their organizer and admins
pub async fn get_event(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = find_event(&state, id).await?;

    if !(event.is_published && event.is_approved) {
        let allowed = match &viewer {
            Some(user) => event.organizer_id == user.id || state.is_admin(user).await?,
            None => false,
        };
        if !allowed {
            return Err(PortalError::not_found("Event", id));
        }
    }

    Ok(Json(event))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut request): Json<CreateEventRequest>,
) -> Result<impl IntoResponse> {
    request.title = require_text("title", &request.title, MAX_TITLE_LENGTH)?;
    validate_schedule(
        request.start_date,
        request.end_date,
        request.registration_deadline,
        request.max_attendees,
    )?;

    let event = state.db.events.create(user.id, request).await?;
    log_user_action(user.id, "create_event", Some(&event.id.to_string()));

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    let event = find_event(&state, id).await?;
    ensure_organizer(&state, &user, &event).await?;

    if let Some(title) = &request.title {
        require_text("title", title, MAX_TITLE_LENGTH)?;
    }
    validate_schedule(
        request.start_date.unwrap_or(event.start_date),
        request.end_date.unwrap_or(event.end_date),
        request.registration_deadline.or(event.registration_deadline),
        request.max_attendees.or(event.max_attendees),
    )?;

    let updated = state.db.events.update(id, request).await?;
    info!(event_id = %id, user_id = %user.id, "Event updated");
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let event = find_event(&state, id).await?;
    ensure_organizer(&state, &user, &event).await?;

    if !state.db.events.delete(id).await? {
        return Err(PortalError::not_found("Event", id));
    }

    log_user_action(user.id, "delete_event", Some(&id.to_string()));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn register_for_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let rsvp = state.db.events.rsvp(id, user.id).await?;
    log_user_action(user.id, "event_rsvp", Some(&id.to_string()));

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Successfully registered for event",
            "rsvp": rsvp,
        })),
    ))
}

pub async fn cancel_registration(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.db.events.cancel_rsvp(id, user.id).await? {
        return Err(PortalError::not_found("Event registration", id));
    }

    log_user_action(user.id, "event_rsvp_cancelled", Some(&id.to_string()));
    Ok(Json(json!({ "message": "Registration cancelled" })))
}

pub async fn attendees(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EventAttendee>>> {
    find_event(&state, id).await?;
    Ok(Json(state.db.events.attendees(id).await?))
}

async fn find_event(state: &AppState, id: Uuid) -> Result<Event> {
    state
        .db
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| PortalError::not_found("Event", id))
}

async fn ensure_organizer(state: &AppState, user: &AuthUser, event: &Event) -> Result<()> {
    if event.organizer_id == user.id || state.is_admin(user).await? {
        Ok(())
    } else {
        Err(PortalError::PermissionDenied(
            "Only the organizer can modify this event".to_string(),
        ))
    }
}
