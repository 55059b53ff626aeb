//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub request_timeout_seconds: u64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

/// Identity provider and token verification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub provider_url: String,
    pub anon_key: String,
    pub jwt_secret: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

/// Outbound notification integrations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationsConfig {
    pub sendgrid_api_key: Option<String>,
    pub sender_email: Option<String>,
    #[serde(default = "default_sendgrid_url")]
    pub sendgrid_url: String,
    pub wati_endpoint: Option<String>,
    pub wati_access_token: Option<String>,
    #[serde(default = "default_callmebot_url")]
    pub callmebot_url: String,
    pub feedback_phone: Option<String>,
    pub feedback_api_key: Option<String>,
    #[serde(default = "default_notification_timeout")]
    pub timeout_seconds: u64,
}

/// Dashboard aggregation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    pub timeout_ms: u64,
}

/// Per-client request rate limiting
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_minute: u32,
    pub burst: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the rolling log file; no file output when unset
    pub log_dir: Option<String>,
    #[serde(default)]
    pub json: bool,
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_sendgrid_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

fn default_callmebot_url() -> String {
    "https://api.callmebot.com/whatsapp.php".to_string()
}

fn default_notification_timeout() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8003,
            cors_origins: vec![],
            request_timeout_seconds: 30,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sendgrid_api_key: None,
            sender_email: None,
            sendgrid_url: default_sendgrid_url(),
            wati_endpoint: None,
            wati_access_token: None,
            callmebot_url: default_callmebot_url(),
            feedback_phone: None,
            feedback_api_key: None,
            timeout_seconds: default_notification_timeout(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 120,
            burst: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a specific file (extension optional) layered under environment variables
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("ALUMNI_PORTAL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("auth.admin_emails")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::PortalError> {
        super::validation::validate_settings(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn dashboard_timeout(&self) -> Duration {
        Duration::from_millis(self.dashboard.timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgresql://localhost/alumni_portal".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: default_acquire_timeout(),
            },
            auth: AuthConfig {
                provider_url: "http://localhost:9999".to_string(),
                anon_key: String::new(),
                jwt_secret: "development-secret-change-me-0123456789".to_string(),
                audience: default_audience(),
                admin_emails: vec![],
            },
            notifications: NotificationsConfig::default(),
            dashboard: DashboardConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
