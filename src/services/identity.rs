//! Identity provider client
//!
//! Sign-up and password sign-in are delegated to a hosted auth provider
//! speaking the GoTrue REST dialect. Tokens it issues are verified locally by
//! [`crate::services::auth::AuthService`].

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::utils::errors::{PortalError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub user: IdentityUser,
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl IdentityClient {
    pub fn new(config: &AuthConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.provider_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    /// Create an identity; `metadata` is stored as the provider's user metadata
    pub async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<IdentityUser> {
        debug!(email = %email, "Signing up with identity provider");

        let response = self
            .client
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;

        let body = Self::checked_json(response).await?;

        // With auto-confirm the provider wraps the user in a session
        let user = body.get("user").cloned().unwrap_or(body);
        Ok(serde_json::from_value(user)?)
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<IdentitySession> {
        debug!(email = %email, "Signing in with identity provider");

        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body = Self::checked_json(response).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Client errors are credential problems; anything else is the provider's fault
    async fn checked_json(response: Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }

        let message = provider_message(&body).unwrap_or_else(|| status.to_string());
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            Err(PortalError::Authentication(message))
        } else {
            warn!(status = status.as_u16(), error = %message, "Identity provider request failed");
            Err(PortalError::Integration(format!("Identity provider error: {}", message)))
        }
    }
}

fn provider_message(body: &Value) -> Option<String> {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
