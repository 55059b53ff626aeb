//! Mock external services for testing
//!
//! `IdentityMockServer` stands in for the hosted auth provider,
//! `WebhookMockServer` for SendGrid, WATI and CallMeBot.

use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub struct IdentityMockServer {
    pub server: MockServer,
}

impl IdentityMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Sign-up succeeds and returns a user with `user_id`
    pub async fn mock_sign_up(&self, user_id: Uuid, email: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(header("apikey", "test-anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": user_id,
                "email": email,
                "user_metadata": {},
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_up_rejected(&self, message: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "msg": message })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_in(&self, user_id: Uuid, email: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "provider-access-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "provider-refresh-token",
                "user": { "id": user_id, "email": email },
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_in_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_outage(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "upstream down" })))
            .mount(&self.server)
            .await;
    }
}

pub struct WebhookMockServer {
    pub server: MockServer,
}

impl WebhookMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn sendgrid_url(&self) -> String {
        format!("{}/v3/mail/send", self.server.uri())
    }

    pub fn wati_endpoint(&self) -> String {
        self.server.uri()
    }

    pub fn callmebot_url(&self) -> String {
        format!("{}/whatsapp.php", self.server.uri())
    }

    pub async fn mock_sendgrid(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("authorization", "Bearer test-sendgrid-key"))
            .respond_with(ResponseTemplate::new(status).insert_header("x-message-id", "sg-message-1"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_wati(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/v1/sendTemplateMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_callmebot(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/whatsapp.php"))
            .and(body_string_contains("apikey=test-callmebot-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string("Message queued"))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request the server has seen
    pub async fn received_bodies(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|r| String::from_utf8_lossy(&r.body).into_owned())
            .collect()
    }
}
