use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{ACCESS_TOKEN_PREFIX, REFRESH_TOKEN_PREFIX};

/// Access/refresh token pair persisted alongside the session user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Short-lived bearer token sent with API requests
    pub access_token: String,
    /// Long-lived token exchanged for a new access token
    pub refresh_token: String,
    /// Access token expiry, milliseconds since the Unix epoch
    pub expires_at: i64,
}

impl AuthTokens {
    /// Issues a placeholder token pair for a user.
    ///
    /// The tokens are opaque strings made of a fixed prefix, the user id and
    /// the issue time. They carry no signature and must be replaced by tokens
    /// from a trusted backend.
    pub fn issue(user_id: &str, ttl: Duration) -> Self {
        let now = now_millis();
        Self {
            access_token: format!("{}_{}_{}", ACCESS_TOKEN_PREFIX, user_id, now),
            refresh_token: format!("{}_{}_{}", REFRESH_TOKEN_PREFIX, user_id, now),
            expires_at: expiry_from(now, ttl),
        }
    }

    /// Returns a copy carrying a new access token and a pushed-out expiry.
    /// The refresh token is kept.
    pub fn refreshed(&self, ttl: Duration) -> Self {
        let now = now_millis();
        Self {
            access_token: format!("{}_refreshed_{}", ACCESS_TOKEN_PREFIX, now),
            refresh_token: self.refresh_token.clone(),
            expires_at: expiry_from(now, ttl),
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Check if the access token is past its expiry.
    ///
    /// Nothing in the session flow consults this; expiry is left to the
    /// server, which answers 401 for stale tokens.
    pub fn is_expired(&self) -> bool {
        now_millis() >= self.expires_at
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn expiry_from(now: i64, ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now.saturating_add(ttl_ms)
}

/// Extracts bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}
