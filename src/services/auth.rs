//! Authentication service implementation
//!
//! Verifies bearer tokens issued by the identity provider and decides who
//! counts as a portal administrator.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::utils::errors::{PortalError, Result};

/// Claims carried by provider access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub aud: Option<String>,
    pub exp: i64,
}

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    audience: String,
    admin_emails: HashSet<String>,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            audience: config.audience.clone(),
            admin_emails: config
                .admin_emails
                .iter()
                .map(|email| email.trim().to_lowercase())
                .collect(),
        }
    }

    /// Check signature, audience and expiry, then map the claims
    pub fn verify(&self, token: &str) -> Result<AuthUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| PortalError::Authentication("Token subject is not a user id".to_string()))?;

        debug!(user_id = %id, "Token verified");
        Ok(AuthUser {
            id,
            email: claims.email,
            role: claims.role,
        })
    }

    /// Sign a token the way the provider does; used for test logins and fixtures
    pub fn issue_token(&self, user_id: Uuid, email: Option<&str>, ttl_seconds: i64) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            role: Some("authenticated".to_string()),
            aud: Some(self.audience.clone()),
            exp: Utc::now().timestamp() + ttl_seconds,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Admin by configuration, independent of the profile flag
    pub fn is_admin_email(&self, email: Option<&str>) -> bool {
        email
            .map(|e| self.admin_emails.contains(&e.trim().to_lowercase()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config() -> AuthConfig {
        AuthConfig {
            provider_url: "http://localhost:9999".to_string(),
            anon_key: "anon".to_string(),
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            audience: "authenticated".to_string(),
            admin_emails: vec!["Dean@Example.edu".to_string()],
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let service = AuthService::new(&config());
        let user_id = Uuid::new_v4();
        let token = service.issue_token(user_id, Some("grad@example.edu"), 300).unwrap();

        let user = service.verify(&token).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("grad@example.edu"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = AuthService::new(&config());
        let token = service.issue_token(Uuid::new_v4(), None, -3600).unwrap();
        assert_matches!(service.verify(&token), Err(PortalError::Token(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = AuthService::new(&config());
        let mut other = config();
        other.jwt_secret = "ffffffffffffffffffffffffffffffff".to_string();
        let verifier = AuthService::new(&other);

        let token = issuer.issue_token(Uuid::new_v4(), None, 300).unwrap();
        assert_matches!(verifier.verify(&token), Err(PortalError::Token(_)));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let issuer = AuthService::new(&config());
        let mut other = config();
        other.audience = "service_role".to_string();
        let verifier = AuthService::new(&other);

        let token = issuer.issue_token(Uuid::new_v4(), None, 300).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_admin_emails_case_insensitive() {
        let service = AuthService::new(&config());
        assert!(service.is_admin_email(Some("dean@example.edu")));
        assert!(!service.is_admin_email(Some("student@example.edu")));
        assert!(!service.is_admin_email(None));
    }
}
