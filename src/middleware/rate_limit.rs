//! Rate limiting middleware
//!
//! One GCRA bucket per client, keyed on the first `x-forwarded-for` hop or
//! the peer address. Requests over the quota get 429.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::utils::errors::{PortalError, Result};

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Key used when neither a forwarded address nor a peer address is known
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Debug)]
pub struct RequestRateLimiter {
    limiter: Arc<KeyedLimiter>,
}

impl RequestRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.requests_per_minute)
            .ok_or_else(|| PortalError::Config("rate_limit.requests_per_minute must be positive".to_string()))?;
        let burst = NonZeroU32::new(config.burst)
            .ok_or_else(|| PortalError::Config("rate_limit.burst must be positive".to_string()))?;

        let quota = Quota::per_minute(per_minute).allow_burst(burst);
        Ok(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        })
    }

    /// Consume one cell for `client`
    pub fn check(&self, client: &str) -> Result<()> {
        match self.limiter.check_key(&client.to_string()) {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(client = %client, "Rate limit exceeded");
                Err(PortalError::RateLimitExceeded)
            }
        }
    }

    /// Drop buckets that have fully refilled
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        debug!(tracked_clients = self.limiter.len(), "Cleaned up rate limit buckets");
    }
}

/// Client identity for rate limiting
pub fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub async fn rate_limit(State(limiter): State<RequestRateLimiter>, request: Request, next: Next) -> Response {
    let key = client_key(&request);
    match limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::Body;

    fn limiter(requests_per_minute: u32, burst: u32) -> RequestRateLimiter {
        RequestRateLimiter::new(&RateLimitConfig {
            enabled: true,
            requests_per_minute,
            burst,
        })
        .unwrap()
    }

    #[test]
    fn test_burst_then_reject() {
        let limiter = limiter(1, 3);

        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert_matches!(limiter.check("10.0.0.1"), Err(PortalError::RateLimitExceeded));

        // Separate bucket per client
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_zero_quota_is_a_config_error() {
        let result = RequestRateLimiter::new(&RateLimitConfig {
            enabled: true,
            requests_per_minute: 0,
            burst: 1,
        });
        assert_matches!(result, Err(PortalError::Config(_)));
    }

    #[test]
    fn test_client_key_prefers_forwarded_header() {
        let request = Request::builder()
            .uri("/api/jobs")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "203.0.113.7");

        let anonymous = Request::builder().uri("/api/jobs").body(Body::empty()).unwrap();
        assert_eq!(client_key(&anonymous), UNKNOWN_CLIENT);
    }
}
