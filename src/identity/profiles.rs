//! Public profile projection with the placeholder fallback.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{PublicProfile, UserId};

/// Resolves user identity to a public profile.
///
/// Profile data is owned by the external identity collaborator; an
/// absent profile is substituted with the placeholder rather than
/// failing the embedding response.
#[async_trait]
pub trait ProfileProvider: Send + Sync + std::fmt::Debug {
    /// Looks up a user's public profile, `None` when unknown.
    async fn lookup(&self, user: &UserId) -> Option<PublicProfile>;

    /// Looks up a profile, substituting [`PublicProfile::placeholder`]
    /// when the user cannot be resolved.
    async fn resolve(&self, user: &UserId) -> PublicProfile {
        match self.lookup(user).await {
            Some(profile) => profile,
            None => PublicProfile::placeholder(user.clone()),
        }
    }
}

/// Process-local [`ProfileProvider`] fed by the login flow.
#[derive(Debug, Default)]
pub struct StaticProfiles {
    profiles: RwLock<HashMap<UserId, PublicProfile>>,
}

impl StaticProfiles {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a profile.
    pub async fn insert(&self, profile: PublicProfile) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl ProfileProvider for StaticProfiles {
    async fn lookup(&self, user: &UserId) -> Option<PublicProfile> {
        let profiles = self.profiles.read().await;
        profiles.get(user).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::profile::UNKNOWN_USER;

    #[tokio::test]
    async fn known_user_resolves_to_their_profile() {
        let provider = StaticProfiles::new();
        provider
            .insert(PublicProfile {
                user_id: UserId::new("u1"),
                display_name: "TraderTom".to_string(),
                avatar_url: Some("https://cdn.example/u1.png".to_string()),
            })
            .await;

        let profile = provider.resolve(&UserId::new("u1")).await;
        assert_eq!(profile.display_name, "TraderTom");
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_the_placeholder() {
        let provider = StaticProfiles::new();
        let profile = provider.resolve(&UserId::new("ghost")).await;
        assert_eq!(profile.display_name, UNKNOWN_USER);
        assert!(profile.avatar_url.is_none());
    }
}
