//! Session resolution against the sessions table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::UserId;
use crate::error::MarketError;
use crate::persistence::Store;

/// Resolves an opaque session token to a user identity.
///
/// The login flow that creates sessions lives outside this service; the
/// core only consumes them.
#[async_trait]
pub trait SessionProvider: Send + Sync + std::fmt::Debug {
    /// Resolves a token to the authenticated user, or `None` for an
    /// unknown or expired session.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn resolve(&self, token: &str) -> Result<Option<UserId>, MarketError>;

    /// Deletes the session behind a token. Returns `false` when no such
    /// session existed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn logout(&self, token: &str) -> Result<bool, MarketError>;
}

/// [`SessionProvider`] backed by the sessions table.
///
/// Expiry is detected at resolution time; an expired row is deleted
/// opportunistically and treated as absent.
#[derive(Debug)]
pub struct StoreSessions {
    store: Arc<dyn Store>,
}

impl StoreSessions {
    /// Creates the provider.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionProvider for StoreSessions {
    async fn resolve(&self, token: &str) -> Result<Option<UserId>, MarketError> {
        let Some(session) = self.store.get_session(token).await? else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            self.store.delete_session(token).await?;
            return Ok(None);
        }
        Ok(Some(session.user_id))
    }

    async fn logout(&self, token: &str) -> Result<bool, MarketError> {
        self.store.delete_session(token).await
    }
}
