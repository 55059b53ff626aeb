//! HTTP handlers module
//!
//! One submodule per resource; `router` wires them under `/api` together
//! with the shared middleware stack.

pub mod admin;
pub mod auth;
pub mod connections;
pub mod dashboard;
pub mod events;
pub mod extract;
pub mod feedback;
pub mod groups;
pub mod health;
pub mod jobs;
pub mod mentorship;
pub mod messages;
pub mod notifications;
pub mod profiles;

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::warn;

use crate::middleware::{log_requests, rate_limit};
use crate::state::AppState;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/api", get(health::root))
        .route("/api/", get(health::root))
        .route("/api/health", get(health::health))
        // Auth and the caller's own account
        .route("/api/auth/register", post(auth::register))
        .route("/api/register", post(auth::register_legacy))
        .route("/api/auth/test-login", post(auth::test_login))
        .route("/api/login/test", post(auth::login_token))
        .route("/api/user", get(auth::current_user))
        .route("/api/profile", get(auth::own_profile).put(auth::update_own_profile))
        // Directory and user management
        .route("/api/profiles", get(profiles::directory))
        .route("/api/profiles/protected", get(profiles::protected_directory))
        .route("/api/profiles/:id", get(profiles::get_profile))
        .route("/api/users", get(profiles::list_users).post(profiles::create_user))
        .route("/api/users/:id", get(profiles::get_user))
        .route("/api/admin/users/:id/verification", put(profiles::set_verification))
        // Events
        .route("/api/events", get(events::list_events).post(events::create_event))
        .route(
            "/api/events/:id",
            get(events::get_event).put(events::update_event).delete(events::delete_event),
        )
        .route(
            "/api/events/:id/register",
            post(events::register_for_event).delete(events::cancel_registration),
        )
        .route(
            "/api/events/:id/rsvp",
            post(events::register_for_event).delete(events::cancel_registration),
        )
        .route("/api/events/:id/attendees", get(events::attendees))
        // Jobs and applications
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/jobs/bookmarked", get(jobs::bookmarked_jobs))
        .route(
            "/api/jobs/:id",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/api/jobs/:id/apply", post(jobs::apply_to_job))
        .route("/api/jobs/:id/applications", get(jobs::job_applications))
        .route(
            "/api/jobs/:id/bookmark",
            post(jobs::bookmark_job).delete(jobs::remove_bookmark),
        )
        .route(
            "/api/job-applications",
            get(jobs::my_applications).post(jobs::create_application),
        )
        .route("/api/job-applications/pending", get(jobs::pending_applications))
        .route("/api/job-applications/:id/review", put(jobs::review_application))
        .route("/api/admin/jobs/:id/approval", put(admin::set_job_approval))
        // Messaging
        .route(
            "/api/conversations",
            get(messages::recent_conversations).post(messages::start_conversation),
        )
        .route("/api/conversations/:id/read", post(messages::mark_conversation_read))
        .route("/api/messages", get(messages::list_messages).post(messages::send_message))
        .route("/api/messages/recent", get(messages::recent_conversations))
        .route("/api/messages/unread-count", get(messages::unread_count))
        .route("/api/messages/conversations/:user_id", get(messages::messages_with_user))
        .route("/api/messages/:id/read", put(messages::mark_read))
        // Connections
        .route(
            "/api/connections",
            get(connections::list_connections).post(connections::request_connection),
        )
        .route("/api/connections/requests", get(connections::pending_requests))
        .route("/api/connections/status/:user_id", get(connections::connection_status))
        .route("/api/connections/count/:user_id", get(connections::connection_count))
        .route(
            "/api/connections/:id",
            put(connections::respond_to_request).delete(connections::remove_connection),
        )
        // Groups
        .route("/api/groups", get(groups::list_groups).post(groups::create_group))
        .route("/api/groups/:id", get(groups::get_group))
        .route("/api/groups/:id/join", post(groups::join_group))
        .route("/api/groups/:id/leave", post(groups::leave_group))
        .route("/api/groups/:id/posts", get(groups::list_posts).post(groups::create_post))
        .route(
            "/api/groups/:id/posts/:post_id",
            axum::routing::delete(groups::delete_post),
        )
        .route("/api/groups/:id/members", get(groups::list_members))
        .route(
            "/api/groups/:id/members/:user_id",
            put(groups::update_member_role).delete(groups::remove_member),
        )
        // Mentorship
        .route("/api/mentors", get(mentorship::list_mentors).post(mentorship::register_mentor))
        .route("/api/admin/mentors/:id/approval", put(admin::set_mentor_approval))
        .route(
            "/api/mentorship-requests",
            get(mentorship::list_requests).post(mentorship::create_request),
        )
        .route("/api/mentorship-requests/:id", put(mentorship::respond_to_request))
        // Notifications
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/notifications/read-all", put(notifications::mark_all_read))
        .route("/api/notifications/:id/read", put(notifications::mark_read))
        .route("/api/notifications/email", post(notifications::send_email))
        .route("/api/notifications/whatsapp", post(notifications::send_whatsapp))
        // Feedback
        .route("/api/feedback", post(feedback::submit_feedback))
        .route("/api/admin/feedback", get(feedback::list_feedback))
        // Dashboards
        .route("/api/dashboard/stats", get(dashboard::admin_stats))
        .route("/api/dashboard/alumni", get(dashboard::alumni))
        .route("/api/dashboard/employer", get(dashboard::employer));

    if let Some(limiter) = state.rate_limiter.clone() {
        app = app.layer(axum::middleware::from_fn_with_state(limiter, rate_limit));
    }

    let cors = cors_layer(&state.settings.server.cors_origins);
    let timeout = TimeoutLayer::new(state.settings.request_timeout());

    app.layer(timeout)
        .layer(cors)
        .layer(axum::middleware::from_fn(log_requests))
        .with_state(state)
}

/// Any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(allowed))
    }
}
