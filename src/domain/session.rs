//! Login sessions mapping opaque tokens to user identity.
//!
//! Sessions are written by the external OAuth login flow; the core only
//! resolves them, deletes them at logout, and drops them once expired.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// One login session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token presented by the client.
    pub token: String,
    /// The user this session authenticates.
    pub user_id: UserId,
    /// OAuth access token held for the user.
    pub access_token: String,
    /// OAuth refresh token held for the user.
    pub refresh_token: String,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` once the session has passed its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
