//! User service implementation
//!
//! Registration flow: create the identity with the provider, insert the
//! matching profile row, then greet the new member.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::database::DatabaseService;
use crate::models::auth::{LegacyRegisterRequest, RegisterRequest, UserMetadata, MIN_PASSWORD_LENGTH};
use crate::models::notification::NotificationTemplate;
use crate::models::profile::{CreateProfileRequest, Profile};
use crate::services::identity::{IdentityClient, IdentitySession, IdentityUser};
use crate::services::notification::NotificationService;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{is_valid_email, split_full_name};
use crate::utils::logging::log_user_action;

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: IdentityUser,
    pub profile: Profile,
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseService,
    identity: IdentityClient,
    notifications: NotificationService,
}

impl UserService {
    pub fn new(db: DatabaseService, identity: IdentityClient, notifications: NotificationService) -> Self {
        Self {
            db,
            identity,
            notifications,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Registration> {
        let email = validate_credentials(&request.email, &request.password)?;
        let metadata = request.user_metadata;

        let user = self
            .identity
            .sign_up(&email, &request.password, serde_json::to_value(&metadata)?)
            .await?;

        self.create_profile(user, &email, metadata).await
    }

    /// Sign-up with a single display name split into first and last
    pub async fn register_legacy(&self, request: LegacyRegisterRequest) -> Result<Registration> {
        if request.full_name.trim().is_empty() {
            return Err(PortalError::InvalidInput(
                "Email, password, and full name are required".to_string(),
            ));
        }
        let email = validate_credentials(&request.email, &request.password)?;

        let (first_name, last_name) = split_full_name(&request.full_name);
        let metadata = UserMetadata {
            first_name: Some(first_name),
            last_name: Some(last_name).filter(|l| !l.is_empty()),
            ..UserMetadata::default()
        };

        let user = self
            .identity
            .sign_up(&email, &request.password, json!({ "full_name": request.full_name.trim() }))
            .await?;

        self.create_profile(user, &email, metadata).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession> {
        self.identity
            .sign_in_with_password(email.trim(), password)
            .await
    }

    async fn create_profile(&self, user: IdentityUser, email: &str, metadata: UserMetadata) -> Result<Registration> {
        let profile = self
            .db
            .profiles
            .create(CreateProfileRequest {
                id: user.id,
                email: email.to_string(),
                first_name: metadata.first_name,
                last_name: metadata.last_name,
                phone: metadata.phone,
                graduation_year: metadata.graduation_year,
                degree: metadata.degree,
                account_type: metadata.primary_role,
            })
            .await?;

        log_user_action(profile.id, "registered", Some(&profile.account_type));
        info!(user_id = %profile.id, "New profile registered");

        self.welcome(&profile).await;

        Ok(Registration { user, profile })
    }

    /// Best-effort greeting in-app and, when configured, by email
    async fn welcome(&self, profile: &Profile) {
        let name = profile
            .first_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "there".to_string());
        let params = BTreeMap::from([("name".to_string(), name)]);

        if let Err(e) = self
            .db
            .notify(profile.id, NotificationTemplate::Welcome, &params, Some("/profile".to_string()))
            .await
        {
            warn!(user_id = %profile.id, error = %e, "Failed to store welcome notification");
        }

        if self.notifications.email_enabled() {
            if let Err(e) = self
                .notifications
                .send_template_email(&profile.email, NotificationTemplate::Welcome, &params)
                .await
            {
                warn!(user_id = %profile.id, error = %e, "Failed to send welcome email");
            }
        }
    }
}

/// Normalized email when the pair is acceptable for sign-up
fn validate_credentials(email: &str, password: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(PortalError::InvalidInput("A valid email address is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PortalError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(email)
}
