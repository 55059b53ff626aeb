//! Error handling for the alumni portal
//!
//! This module defines the main error type used throughout the application
//! and its mapping onto HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for the alumni portal
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Integration error: {0}")]
    Integration(String),
}

/// Result type alias for portal operations
pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        PortalError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            PortalError::Database(_) => false,
            PortalError::Migration(_) => false,
            PortalError::Http(_) => true,
            PortalError::Serialization(_) => false,
            PortalError::Token(_) => false,
            PortalError::ConfigLoad(_) => false,
            PortalError::Io(_) => true,
            PortalError::UrlParse(_) => false,
            PortalError::Config(_) => false,
            PortalError::Authentication(_) => false,
            PortalError::PermissionDenied(_) => false,
            PortalError::NotFound { .. } => false,
            PortalError::Conflict(_) => false,
            PortalError::InvalidInput(_) => false,
            PortalError::RateLimitExceeded => true,
            PortalError::ServiceUnavailable(_) => true,
            PortalError::Timeout(_) => true,
            PortalError::Integration(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PortalError::Database(_) => ErrorSeverity::Critical,
            PortalError::Migration(_) => ErrorSeverity::Critical,
            PortalError::Config(_) | PortalError::ConfigLoad(_) => ErrorSeverity::Critical,
            PortalError::PermissionDenied(_) => ErrorSeverity::Warning,
            PortalError::Authentication(_) | PortalError::Token(_) => ErrorSeverity::Warning,
            PortalError::RateLimitExceeded => ErrorSeverity::Warning,
            PortalError::InvalidInput(_) | PortalError::NotFound { .. } | PortalError::Conflict(_) => {
                ErrorSeverity::Info
            }
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Database(e) => database_status(e),
            PortalError::Authentication(_) | PortalError::Token(_) => StatusCode::UNAUTHORIZED,
            PortalError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
            PortalError::Conflict(_) => StatusCode::CONFLICT,
            PortalError::InvalidInput(_) | PortalError::Serialization(_) => StatusCode::BAD_REQUEST,
            PortalError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            PortalError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PortalError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PortalError::Integration(_) | PortalError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the response body
    pub fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "invalid_input",
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::CONFLICT => "conflict",
            StatusCode::TOO_MANY_REQUESTS => "rate_limited",
            StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
            StatusCode::GATEWAY_TIMEOUT => "timeout",
            StatusCode::BAD_GATEWAY => "upstream_error",
            _ => "internal_error",
        }
    }

    /// Message safe to show to API clients
    fn public_message(&self) -> String {
        match self {
            PortalError::Database(e) => match database_status(e) {
                StatusCode::CONFLICT => "Resource already exists".to_string(),
                StatusCode::BAD_REQUEST => "Referenced resource does not exist".to_string(),
                _ => "Internal server error".to_string(),
            },
            PortalError::Migration(_)
            | PortalError::ConfigLoad(_)
            | PortalError::Config(_)
            | PortalError::Io(_)
            | PortalError::UrlParse(_) => "Internal server error".to_string(),
            PortalError::Token(_) => "Invalid authentication credentials".to_string(),
            PortalError::Http(_) => "Upstream service request failed".to_string(),
            other => other.to_string(),
        }
    }
}

/// Unique and foreign-key violations are client errors
fn database_status(error: &sqlx::Error) -> StatusCode {
    match error {
        sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => StatusCode::CONFLICT,
            Some("23503") | Some("23514") | Some("22P02") => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(error = %self, status = status.as_u16(), "Request failed");
            }
            ErrorSeverity::Warning => {
                tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
            }
            ErrorSeverity::Info => {
                tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            }
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<JsonRejection> for PortalError {
    fn from(rejection: JsonRejection) -> Self {
        PortalError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for PortalError {
    fn from(rejection: PathRejection) -> Self {
        PortalError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for PortalError {
    fn from(rejection: QueryRejection) -> Self {
        PortalError::InvalidInput(rejection.body_text())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
