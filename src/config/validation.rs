//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use url::Url;

use super::Settings;
use crate::utils::errors::{PortalError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_notifications_config(&settings.notifications)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    if settings.dashboard.timeout_ms == 0 {
        return Err(PortalError::Config(
            "Dashboard timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(PortalError::Config("Server host is required".to_string()));
    }

    if config.request_timeout_seconds == 0 {
        return Err(PortalError::Config(
            "Request timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PortalError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(PortalError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(PortalError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    Url::parse(&config.provider_url)
        .map_err(|e| PortalError::Config(format!("Invalid identity provider URL: {}", e)))?;

    if config.jwt_secret.len() < 32 {
        return Err(PortalError::Config(
            "JWT secret must be at least 32 bytes".to_string(),
        ));
    }

    if config.audience.is_empty() {
        return Err(PortalError::Config("Token audience is required".to_string()));
    }

    Ok(())
}

fn validate_notifications_config(config: &super::NotificationsConfig) -> Result<()> {
    Url::parse(&config.sendgrid_url)
        .map_err(|e| PortalError::Config(format!("Invalid SendGrid URL: {}", e)))?;
    Url::parse(&config.callmebot_url)
        .map_err(|e| PortalError::Config(format!("Invalid CallMeBot URL: {}", e)))?;

    if let Some(endpoint) = &config.wati_endpoint {
        Url::parse(endpoint)
            .map_err(|e| PortalError::Config(format!("Invalid WATI endpoint: {}", e)))?;
    }

    if config.timeout_seconds == 0 {
        return Err(PortalError::Config(
            "Notification timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.enabled && (config.requests_per_minute == 0 || config.burst == 0) {
        return Err(PortalError::Config(
            "Rate limit and burst must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PortalError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(PortalError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    if let Some(dir) = &config.log_dir {
        if dir.trim().is_empty() {
            return Err(PortalError::Config("log_dir must not be empty when set".to_string()));
        }
        if std::path::Path::new(dir).is_file() {
            return Err(PortalError::Config(format!(
                "log_dir must be a directory, found a file: {}",
                dir
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "short".to_string();
        assert_matches!(validate_settings(&settings), Err(PortalError::Config(msg)) if msg.contains("JWT"));
    }

    #[test]
    fn test_pool_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(PortalError::Config(_)));

        settings.database.min_connections = 1;
        settings.database.max_connections = 0;
        assert_matches!(validate_settings(&settings), Err(PortalError::Config(_)));
    }

    #[test]
    fn test_bad_urls_rejected() {
        let mut settings = Settings::default();
        settings.notifications.wati_endpoint = Some("not a url".to_string());
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.auth.provider_url = "::".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_log_dir_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();

        settings.logging.log_dir = Some(dir.path().to_string_lossy().into_owned());
        assert!(validate_settings(&settings).is_ok());

        let file = dir.path().join("portal.log");
        std::fs::write(&file, b"").unwrap();
        settings.logging.log_dir = Some(file.to_string_lossy().into_owned());
        assert_matches!(validate_settings(&settings), Err(PortalError::Config(msg)) if msg.contains("directory"));

        settings.logging.log_dir = Some("  ".to_string());
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_disabled_rate_limit_skips_bounds() {
        let mut settings = Settings::default();
        settings.rate_limit.enabled = false;
        settings.rate_limit.requests_per_minute = 0;
        assert!(validate_settings(&settings).is_ok());
    }
}
