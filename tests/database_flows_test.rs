//! End-to-end flows against a real Postgres
//!
//! Each test skips itself when no database is reachable.

mod helpers;

use alumni_portal::database::EventViewer;
use alumni_portal::models::connection::{ConnectionResponse, ConnectionStatus};
use alumni_portal::models::event::{EventFilter, UpdateEventRequest};
use alumni_portal::models::group::{CreateGroupRequest, CreatePostRequest, GroupRole};
use alumni_portal::models::job::{ApplicationStatus, JobFilter, JobSort, ReviewApplicationRequest};
use alumni_portal::models::mentorship::{CreateMentorshipRequest, MentorshipDecision, RegisterMentorRequest};
use alumni_portal::PortalError;
use assert_matches::assert_matches;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use helpers::test_context::TEST_ADMIN_EMAIL;
use helpers::*;
use serde_json::{json, Value};
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
#[serial]
async fn test_registration_creates_profile_and_welcome() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let identity = IdentityMockServer::new().await;
    let user_id = Uuid::new_v4();
    identity.mock_sign_up(user_id, "grace@example.edu").await;

    let ctx = TestContext::new(test_settings(&identity.url()), test_db.pool.clone());
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "Grace@Example.edu",
                "password": "long-enough-password",
                "user_metadata": {
                    "first_name": "Grace",
                    "last_name": "Hopper",
                    "graduation_year": "1934",
                    "primary_role": "alumni"
                }
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["profile"]["email"], "grace@example.edu");
    assert_eq!(body["profile"]["full_name"], "Grace Hopper");
    assert_eq!(body["profile"]["graduation_year"], 1934);

    let profile = ctx.db().profiles.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(profile.account_type, "alumni");
    assert_eq!(ctx.db().notifications.unread_count(user_id).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_rsvp_capacity_and_duplicates() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let organizer = insert_profile(db, "alumni").await;
    let first = insert_profile(db, "alumni").await;
    let second = insert_profile(db, "alumni").await;

    let event = db.events.create(organizer.id, event_request(Some(1))).await.unwrap();

    db.events.rsvp(event.id, first.id).await.unwrap();
    assert_matches!(db.events.rsvp(event.id, first.id).await, Err(PortalError::Conflict(msg)) if msg.contains("Already registered"));
    assert_matches!(db.events.rsvp(event.id, second.id).await, Err(PortalError::Conflict(msg)) if msg.contains("full"));

    assert!(db.events.cancel_rsvp(event.id, first.id).await.unwrap());
    db.events.rsvp(event.id, second.id).await.unwrap();
    assert_eq!(db.events.attendee_count(event.id).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_job_application_lifecycle() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let poster = insert_profile(db, "employer").await;
    let applicant = insert_profile(db, "alumni").await;
    let job = db.jobs.create(poster.id, job_request("Data Engineer")).await.unwrap();
    assert!(!job.is_approved);
    assert_matches!(
        db.jobs.apply(job.id, applicant.id, None, None).await,
        Err(PortalError::InvalidInput(_))
    );
    db.jobs.set_approval(job.id, true).await.unwrap();

    let application = db
        .jobs
        .apply(job.id, applicant.id, Some("I build pipelines".to_string()), None)
        .await
        .unwrap();
    assert_eq!(application.status, "pending");
    assert_matches!(
        db.jobs.apply(job.id, applicant.id, None, None).await,
        Err(PortalError::Conflict(_))
    );

    let stranger = insert_profile(db, "alumni").await;
    let review = |status| ReviewApplicationRequest { status, review_notes: None };
    assert_matches!(
        db.review_application(application.id, stranger.id, false, review(ApplicationStatus::Reviewed)).await,
        Err(PortalError::PermissionDenied(_))
    );
    assert_matches!(
        db.review_application(application.id, poster.id, false, review(ApplicationStatus::Accepted)).await,
        Err(PortalError::Conflict(_))
    );

    let reviewed = db
        .review_application(application.id, poster.id, false, review(ApplicationStatus::Reviewed))
        .await
        .unwrap();
    assert_eq!(reviewed.status, "reviewed");
    assert_eq!(reviewed.reviewed_by, Some(poster.id));
    assert_eq!(db.notifications.unread_count(applicant.id).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_conversation_is_shared_by_both_directions() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let a = insert_profile(db, "alumni").await;
    let b = insert_profile(db, "alumni").await;

    let first = db.messages.get_or_create_conversation(a.id, b.id).await.unwrap();
    let second = db.messages.get_or_create_conversation(b.id, a.id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(test_db.count_records("conversations").await, 1);

    let token = ctx.token_for(a.id, &a.email);
    let response = ctx
        .router
        .clone()
        .oneshot(authed("POST", "/api/messages", &token, Some(json!({ "recipient_id": b.id, "content": "Hello!" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(db.messages.unread_count(b.id).await.unwrap(), 1);
    assert_eq!(db.messages.mark_conversation_as_read(first, b.id).await.unwrap(), 1);
    assert_eq!(db.messages.unread_count(b.id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_connection_status_transitions() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let alice = insert_profile(db, "alumni").await;
    let bob = insert_profile(db, "alumni").await;

    let request = db.connections.request(alice.id, bob.id).await.unwrap();
    let current = db.connections.find_between(alice.id, bob.id).await.unwrap();
    assert_eq!(ConnectionStatus::resolve(alice.id, bob.id, current.as_ref()), ConnectionStatus::PendingSent);
    assert_eq!(ConnectionStatus::resolve(bob.id, alice.id, current.as_ref()), ConnectionStatus::PendingReceived);

    assert_matches!(db.connections.request(bob.id, alice.id).await, Err(PortalError::Conflict(_)));
    assert_matches!(
        db.respond_to_connection(request.id, alice.id, ConnectionResponse::Accepted).await,
        Err(PortalError::PermissionDenied(_))
    );

    db.respond_to_connection(request.id, bob.id, ConnectionResponse::Declined)
        .await
        .unwrap();

    // A declined pair can be asked again
    let reopened = db.connections.request(alice.id, bob.id).await.unwrap();
    assert_eq!(reopened.id, request.id);
    assert_eq!(reopened.status, "pending");

    db.respond_to_connection(reopened.id, bob.id, ConnectionResponse::Accepted)
        .await
        .unwrap();
    let current = db.connections.find_between(bob.id, alice.id).await.unwrap();
    assert_eq!(ConnectionStatus::resolve(alice.id, bob.id, current.as_ref()), ConnectionStatus::Connected);
    assert_eq!(db.connections.count_accepted(alice.id).await.unwrap(), 1);
    assert_eq!(db.notifications.unread_count(alice.id).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_last_group_admin_cannot_leave() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let founder = insert_profile(db, "alumni").await;
    let member = insert_profile(db, "alumni").await;

    let group = db
        .groups
        .create_group_and_add_admin(
            founder.id,
            CreateGroupRequest {
                name: "Bay Area Alumni".to_string(),
                description: None,
                is_private: false,
                tags: vec!["regional".to_string()],
                group_avatar_url: None,
            },
        )
        .await
        .unwrap();

    assert!(db.groups.join(group.id, member.id).await.unwrap());
    assert!(!db.groups.join(group.id, member.id).await.unwrap());

    assert_matches!(db.groups.leave(group.id, founder.id).await, Err(PortalError::Conflict(_)));
    assert!(db.groups.leave(group.id, member.id).await.unwrap());
    assert_eq!(db.groups.members(group.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_mentor_capacity_is_enforced() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let mentor_profile = insert_profile(db, "alumni").await;
    let first = insert_profile(db, "student").await;
    let second = insert_profile(db, "student").await;

    let mentor = db
        .mentorship
        .register_mentor(
            mentor_profile.id,
            RegisterMentorRequest {
                expertise: vec!["data science".to_string()],
                mentoring_statement: None,
                max_mentees: Some(1),
            },
        )
        .await
        .unwrap();

    let ask = || CreateMentorshipRequest {
        mentor_id: mentor.id,
        goals: Some("Career switch".to_string()),
        message: None,
    };
    assert_matches!(db.mentorship.create_request(first.id, ask()).await, Err(PortalError::InvalidInput(_)));

    db.mentorship.set_mentor_approval(mentor.id, true).await.unwrap();
    let first_request = db.mentorship.create_request(first.id, ask()).await.unwrap();
    let second_request = db.mentorship.create_request(second.id, ask()).await.unwrap();
    assert_matches!(db.mentorship.create_request(first.id, ask()).await, Err(PortalError::Conflict(_)));

    db.respond_to_mentorship(first_request.id, mentor_profile.id, MentorshipDecision::Accepted)
        .await
        .unwrap();
    assert_matches!(
        db.respond_to_mentorship(second_request.id, mentor_profile.id, MentorshipDecision::Accepted).await,
        Err(PortalError::Conflict(_))
    );

    let profile = db.profiles.find_by_id(mentor_profile.id).await.unwrap().unwrap();
    assert!(profile.is_mentor);
}

#[tokio::test]
#[serial]
async fn test_alumni_dashboard_and_admin_gate() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let alumnus = insert_profile(db, "alumni").await;
    let friend = insert_profile(db, "alumni").await;
    let pending = db.connections.request(friend.id, alumnus.id).await.unwrap();
    assert_eq!(pending.status, "pending");

    let token = ctx.token_for(alumnus.id, &alumnus.email);
    let response = ctx
        .router
        .clone()
        .oneshot(authed("GET", "/api/dashboard/alumni", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["connection_count"], 0);
    assert_eq!(body["pending_connection_requests"], 1);

    let response = ctx
        .router
        .clone()
        .oneshot(authed("GET", "/api/dashboard/stats", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = ctx.token_for(Uuid::new_v4(), TEST_ADMIN_EMAIL);
    let response = ctx
        .router
        .clone()
        .oneshot(authed("GET", "/api/dashboard/stats", &admin_token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total_users"], 2);
}

#[tokio::test]
#[serial]
async fn test_feedback_kept_when_alert_fails() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let webhooks = WebhookMockServer::new().await;
    webhooks.mock_callmebot(500).await;

    let mut settings = test_settings("http://127.0.0.1:1");
    settings.notifications.callmebot_url = webhooks.callmebot_url();
    settings.notifications.feedback_phone = Some("+15550001111".to_string());
    settings.notifications.feedback_api_key = Some("test-callmebot-key".to_string());
    let ctx = TestContext::new(settings, test_db.pool.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/feedback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "name": "Ada",
                "email": "ada@example.edu",
                "page_url": "/jobs",
                "feedback_type": "bug",
                "message": "Filters reset on back navigation"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["notified"], false);
    assert_eq!(body["feedback"]["feedback_type"], "bug");
    assert_eq!(test_db.count_records("feedback").await, 1);
    assert_eq!(webhooks.received_bodies().await.len(), 1);
}

fn group_request(name: &str) -> CreateGroupRequest {
    CreateGroupRequest {
        name: name.to_string(),
        description: None,
        is_private: false,
        tags: vec![],
        group_avatar_url: None,
    }
}

#[tokio::test]
#[serial]
async fn test_unpublished_event_detail_is_hidden() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let organizer = insert_profile(db, "alumni").await;
    let stranger = insert_profile(db, "alumni").await;
    let event = db.events.create(organizer.id, event_request(None)).await.unwrap();
    let uri = format!("/api/events/{}", event.id);

    let anonymous = Request::builder().uri(&uri).body(Body::empty()).unwrap();
    let response = ctx.router.clone().oneshot(anonymous).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    db.events
        .update(event.id, UpdateEventRequest { is_published: Some(false), ..Default::default() })
        .await
        .unwrap();

    let anonymous = Request::builder().uri(&uri).body(Body::empty()).unwrap();
    let response = ctx.router.clone().oneshot(anonymous).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let token = ctx.token_for(stranger.id, &stranger.email);
    let response = ctx.router.clone().oneshot(authed("GET", &uri, &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let token = ctx.token_for(organizer.id, &organizer.email);
    let response = ctx.router.clone().oneshot(authed("GET", &uri, &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["is_published"], false);

    let token = ctx.token_for(Uuid::new_v4(), TEST_ADMIN_EMAIL);
    let response = ctx.router.clone().oneshot(authed("GET", &uri, &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_only_author_or_group_admin_deletes_posts() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let founder = insert_profile(db, "alumni").await;
    let moderator = insert_profile(db, "alumni").await;
    let author = insert_profile(db, "alumni").await;

    let group = db
        .groups
        .create_group_and_add_admin(founder.id, group_request("Chess Club Alumni"))
        .await
        .unwrap();
    db.groups.join(group.id, moderator.id).await.unwrap();
    db.groups.join(group.id, author.id).await.unwrap();
    db.groups
        .update_member_role(group.id, moderator.id, GroupRole::Moderator)
        .await
        .unwrap();

    let post = |content: &str| CreatePostRequest {
        content: content.to_string(),
        image_url: None,
        parent_post_id: None,
    };
    let first = db.groups.create_post(group.id, author.id, post("Anyone up for a rematch?")).await.unwrap();
    let second = db.groups.create_post(group.id, author.id, post("Board night on Friday")).await.unwrap();

    let delete_uri = |post_id: Uuid| format!("/api/groups/{}/posts/{}", group.id, post_id);

    let token = ctx.token_for(moderator.id, &moderator.email);
    let response = ctx
        .router
        .clone()
        .oneshot(authed("DELETE", &delete_uri(first.id), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let token = ctx.token_for(founder.id, &founder.email);
    let response = ctx
        .router
        .clone()
        .oneshot(authed("DELETE", &delete_uri(first.id), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let token = ctx.token_for(author.id, &author.email);
    let response = ctx
        .router
        .clone()
        .oneshot(authed("DELETE", &delete_uri(second.id), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(db.groups.find_post(second.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_event_listing_visibility_and_upcoming_default() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let organizer = insert_profile(db, "alumni").await;
    let published = db.events.create(organizer.id, event_request(None)).await.unwrap();
    let draft = db.events.create(organizer.id, event_request(None)).await.unwrap();
    db.events
        .update(draft.id, UpdateEventRequest { is_published: Some(false), ..Default::default() })
        .await
        .unwrap();

    let mut past_request = event_request(None);
    past_request.start_date = Utc::now() - Duration::days(30);
    past_request.end_date = past_request.start_date + Duration::hours(2);
    let past = db.events.create(organizer.id, past_request).await.unwrap();

    let ids = |events: Vec<alumni_portal::models::event::Event>| -> Vec<Uuid> {
        events.into_iter().map(|e| e.id).collect()
    };

    let anonymous = ids(db.events.list(&EventFilter::default(), EventViewer::default(), 50, 0).await.unwrap());
    assert_eq!(anonymous, vec![published.id]);

    let organizer_view = EventViewer { user_id: Some(organizer.id), is_admin: false };
    let own = ids(db.events.list(&EventFilter::default(), organizer_view, 50, 0).await.unwrap());
    assert_eq!(own.len(), 2);
    assert!(own.contains(&draft.id));
    assert!(!own.contains(&past.id));

    let all_dates = EventFilter { upcoming_only: false, ..EventFilter::default() };
    let with_past = ids(db.events.list(&all_dates, EventViewer::default(), 50, 0).await.unwrap());
    assert_eq!(with_past, vec![past.id, published.id]);

    let response = ctx
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], published.id.to_string());
}

#[tokio::test]
#[serial]
async fn test_job_filters_and_sort_orders() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let poster = insert_profile(db, "employer").await;
    let now = Utc::now();

    let mut analyst = job_request("Data Analyst");
    analyst.location = Some("San Francisco, CA".to_string());
    analyst.deadline = Some(now + Duration::days(20));
    let analyst = db.jobs.create(poster.id, analyst).await.unwrap();

    let mut engineer = job_request("Platform Engineer");
    engineer.location = Some("Remote".to_string());
    engineer.deadline = Some(now + Duration::days(5));
    let engineer = db.jobs.create(poster.id, engineer).await.unwrap();

    let mut designer = job_request("Product Designer");
    designer.company_name = Some("Pixel Works".to_string());
    designer.location = Some("New York, NY".to_string());
    let designer = db.jobs.create(poster.id, designer).await.unwrap();

    for job in [&analyst, &engineer, &designer] {
        db.jobs.set_approval(job.id, true).await.unwrap();
    }

    let list = |filter: JobFilter| async move {
        db.jobs
            .list(&filter, None, false, 50, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect::<Vec<_>>()
    };

    let by_location = JobFilter { location: Some("francisco".to_string()), ..JobFilter::default() };
    assert_eq!(list(by_location).await, vec![analyst.id]);

    let by_title = JobFilter { search: Some("ENGINEER".to_string()), ..JobFilter::default() };
    assert_eq!(list(by_title).await, vec![engineer.id]);

    let by_company = JobFilter { search: Some("pixel".to_string()), ..JobFilter::default() };
    assert_eq!(list(by_company).await, vec![designer.id]);

    assert_eq!(list(JobFilter::default()).await, vec![designer.id, engineer.id, analyst.id]);

    let oldest = JobFilter { sort: JobSort::Oldest, ..JobFilter::default() };
    assert_eq!(list(oldest).await, vec![analyst.id, engineer.id, designer.id]);

    let deadline = JobFilter { sort: JobSort::Deadline, ..JobFilter::default() };
    assert_eq!(list(deadline).await, vec![engineer.id, analyst.id, designer.id]);
}

#[tokio::test]
#[serial]
async fn test_job_listing_hides_expired_and_unapproved() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let poster = insert_profile(db, "employer").await;
    let viewer = insert_profile(db, "alumni").await;

    let live = db.jobs.create(poster.id, job_request("Data Analyst")).await.unwrap();
    db.jobs.set_approval(live.id, true).await.unwrap();

    let mut expired = job_request("Summer Intern");
    expired.expires_at = Some(Utc::now() - Duration::days(1));
    let expired = db.jobs.create(poster.id, expired).await.unwrap();
    db.jobs.set_approval(expired.id, true).await.unwrap();

    let pending = db.jobs.create(poster.id, job_request("Staff Engineer")).await.unwrap();

    let ids = |jobs: Vec<alumni_portal::models::job::Job>| -> Vec<Uuid> {
        jobs.into_iter().map(|j| j.id).collect()
    };

    let visible = ids(db.jobs.list(&JobFilter::default(), Some(viewer.id), false, 50, 0).await.unwrap());
    assert_eq!(visible, vec![live.id]);

    let including_expired = JobFilter { active_only: false, ..JobFilter::default() };
    let visible = ids(db.jobs.list(&including_expired, Some(viewer.id), false, 50, 0).await.unwrap());
    assert_eq!(visible.len(), 2);
    assert!(visible.contains(&expired.id));
    assert!(!visible.contains(&pending.id));

    let own = ids(db.jobs.list(&JobFilter::default(), Some(poster.id), false, 50, 0).await.unwrap());
    assert!(own.contains(&pending.id));

    let admin = ids(db.jobs.list(&JobFilter::default(), None, true, 50, 0).await.unwrap());
    assert_eq!(admin.len(), 2);
    assert!(admin.contains(&pending.id));
}

#[tokio::test]
#[serial]
async fn test_rsvp_after_deadline_is_rejected() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let organizer = insert_profile(db, "alumni").await;
    let attendee = insert_profile(db, "alumni").await;

    let mut request = event_request(None);
    request.registration_deadline = Some(Utc::now() - Duration::hours(1));
    let event = db.events.create(organizer.id, request).await.unwrap();

    assert_matches!(
        db.events.rsvp(event.id, attendee.id).await,
        Err(PortalError::InvalidInput(msg)) if msg.contains("deadline")
    );

    let token = ctx.token_for(attendee.id, &attendee.email);
    let uri = format!("/api/events/{}/register", event.id);
    let response = ctx.router.clone().oneshot(authed("POST", &uri, &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "invalid_input");
    assert_eq!(db.events.attendee_count(event.id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_applications_need_an_open_posting() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(test_settings("http://127.0.0.1:1"), test_db.pool.clone());
    let db = ctx.db();

    let poster = insert_profile(db, "employer").await;
    let applicant = insert_profile(db, "alumni").await;

    let mut closed = job_request("Research Assistant");
    closed.deadline = Some(Utc::now() - Duration::hours(2));
    let closed = db.jobs.create(poster.id, closed).await.unwrap();
    db.jobs.set_approval(closed.id, true).await.unwrap();

    assert_matches!(
        db.jobs.apply(closed.id, applicant.id, None, None).await,
        Err(PortalError::InvalidInput(msg)) if msg.contains("no longer accepting")
    );

    let unapproved = db.jobs.create(poster.id, job_request("Lab Manager")).await.unwrap();
    let token = ctx.token_for(applicant.id, &applicant.email);
    let uri = format!("/api/jobs/{}/apply", unapproved.id);
    let response = ctx
        .router
        .clone()
        .oneshot(authed("POST", &uri, &token, Some(json!({ "cover_letter": "Keen to help" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(db.jobs.applications_for_job(unapproved.id).await.unwrap().len(), 0);
}
