//! Shared application state
//!
//! Cloned into every handler; everything inside is either `Arc` or a cheap
//! pool handle.

use std::sync::Arc;

use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::middleware::RequestRateLimiter;
use crate::services::{AuthUser, ServiceFactory};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseService,
    pub services: ServiceFactory,
    pub rate_limiter: Option<RequestRateLimiter>,
}

impl AppState {
    pub fn new(settings: Settings, pool: DatabasePool) -> Result<Self> {
        let db = DatabaseService::new(pool);
        let services = ServiceFactory::new(&settings, db.clone())?;
        let rate_limiter = if settings.rate_limit.enabled {
            Some(RequestRateLimiter::new(&settings.rate_limit)?)
        } else {
            None
        };

        Ok(Self {
            settings: Arc::new(settings),
            db,
            services,
            rate_limiter,
        })
    }

    /// Admin by configured email or by the profile flag
    pub async fn is_admin(&self, user: &AuthUser) -> Result<bool> {
        if self.services.auth.is_admin_email(user.email.as_deref()) {
            return Ok(true);
        }
        self.db.profiles.is_admin(user.id).await
    }
}
