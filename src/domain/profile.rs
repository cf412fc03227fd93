//! Public profile projection embedded into responses.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Display name shown when a user's profile cannot be resolved.
pub const UNKNOWN_USER: &str = "Unknown User";

/// The public-facing slice of a user: display name and avatar.
///
/// Produced by the external profile collaborator. When a lookup comes
/// back empty the response embeds [`PublicProfile::placeholder`] instead
/// of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    /// Stable user identity key.
    pub user_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Avatar image URL, when the user has one.
    pub avatar_url: Option<String>,
}

impl PublicProfile {
    /// The documented stand-in for an unresolvable user.
    #[must_use]
    pub fn placeholder(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: UNKNOWN_USER.to_string(),
            avatar_url: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_null_avatar() {
        let profile = PublicProfile::placeholder(UserId::new("u9"));
        assert_eq!(profile.display_name, UNKNOWN_USER);
        assert!(profile.avatar_url.is_none());
    }
}
