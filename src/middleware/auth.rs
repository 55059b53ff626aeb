//! Authentication extractors
//!
//! Handlers declare the caller they need by argument type: `AuthUser` for any
//! signed-in user, `OptionalAuthUser` for public routes that tailor results
//! to a viewer, `AdminUser` for administrative routes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};

/// Signed-in caller that also passed the admin check
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

/// Caller when a token was presented, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

/// Token from `Authorization: Bearer <token>`, `None` when the header is absent
pub fn bearer_token(parts: &Parts) -> Result<Option<&str>> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| PortalError::Authentication("Malformed authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PortalError::Authentication("Expected a bearer token".to_string()))?;

    Ok(Some(token))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = PortalError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts)?
            .ok_or_else(|| PortalError::Authentication("Missing bearer token".to_string()))?;

        state.services.auth.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            e
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = PortalError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match bearer_token(parts)? {
            Some(token) => Ok(OptionalAuthUser(Some(state.services.auth.verify(token)?))),
            None => Ok(OptionalAuthUser(None)),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = PortalError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if state.is_admin(&user).await? {
            Ok(AdminUser(user))
        } else {
            warn!(user_id = %user.id, path = %parts.uri.path(), "Unauthorized admin access attempt");
            Err(PortalError::PermissionDenied("Admin privileges required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/user");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))).unwrap(), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(None)).unwrap(), None);
        assert_matches!(bearer_token(&parts_with(Some("Basic Zm9v"))), Err(PortalError::Authentication(_)));
        assert_matches!(bearer_token(&parts_with(Some("Bearer   "))), Err(PortalError::Authentication(_)));
    }
}
