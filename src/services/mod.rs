//! Services module
//!
//! Business logic that sits between the HTTP handlers and the database layer,
//! plus the clients for external providers.

pub mod auth;
pub mod dashboard;
pub mod identity;
pub mod notification;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, AuthUser};
pub use dashboard::DashboardService;
pub use identity::IdentityClient;
pub use notification::NotificationService;
pub use user::UserService;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth: AuthService,
    pub identity: IdentityClient,
    pub notifications: NotificationService,
    pub users: UserService,
    pub dashboard: DashboardService,
}

impl ServiceFactory {
    pub fn new(settings: &Settings, db: DatabaseService) -> Result<Self> {
        let auth = AuthService::new(&settings.auth);
        let identity = IdentityClient::new(&settings.auth, settings.request_timeout())?;
        let notifications = NotificationService::new(settings.notifications.clone())?;
        let users = UserService::new(db.clone(), identity.clone(), notifications.clone());
        let dashboard = DashboardService::new(db, settings.dashboard_timeout());

        Ok(Self {
            auth,
            identity,
            notifications,
            users,
            dashboard,
        })
    }
}
