//! Session and gate-token types

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Identity-provider session handle.
///
/// Owned by the identity provider; Vestry only mirrors it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Provider uid
    pub uid: UserId,
    /// Email reported by the provider
    pub email: Option<String>,
}

impl Session {
    /// Create a new session handle
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            email,
        }
    }
}

/// Claims carried by a signed gate token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateClaims {
    /// Session uid
    pub uid: String,
    /// Issue timestamp (milliseconds)
    pub issued: i64,
    /// Expiration timestamp (milliseconds)
    pub expires: i64,
}

impl GateClaims {
    /// Create claims valid for `max_age_secs` from now
    pub fn new(uid: &UserId, max_age_secs: u64) -> Self {
        let now = Utc::now().timestamp_millis();
        let ttl_ms = i64::try_from(max_age_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self {
            uid: uid.to_string(),
            issued: now,
            expires: now.saturating_add(ttl_ms),
        }
    }

    /// Check if the claims are expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires
    }

    /// Get the user ID
    pub fn user_id(&self) -> UserId {
        UserId::new(self.uid.clone())
    }
}
