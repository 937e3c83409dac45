//! Token storage and management

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Tokens closer than this to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 300;

/// Stored access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    /// Unix seconds; `None` means the expiry is unknown.
    pub expires_at: Option<i64>,
}

impl StoredToken {
    /// A lifetime too large to represent is stored as no expiry.
    pub fn new(token: String, expires_in_secs: Option<u64>) -> Self {
        let expires_at = expires_in_secs.and_then(|secs| {
            i64::try_from(secs)
                .ok()
                .and_then(|secs| Utc::now().timestamp().checked_add(secs))
        });
        Self { token, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        match self.remaining_secs() {
            Some(left) => left <= EXPIRY_SKEW_SECS,
            None => false,
        }
    }

    /// Seconds until expiry (negative once past it).
    pub fn remaining_secs(&self) -> Option<i64> {
        self.expires_at
            .map(|exp| exp.saturating_sub(Utc::now().timestamp()))
    }
}

/// Token store trait for different storage backends
pub trait TokenStore {
    fn get_fcm_token(&self) -> Option<StoredToken>;
    fn set_fcm_token(&mut self, token: String, expires_in: Option<u64>);
    fn clear_tokens(&mut self);
}
