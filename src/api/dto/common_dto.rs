//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PublicProfile;

/// Public profile embedded into listing, interaction, and conversation
/// responses. Unresolvable users appear as the documented placeholder.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileDto {
    /// Stable user identity key.
    pub user_id: String,
    /// Display name, or `"Unknown User"`.
    pub display_name: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

impl From<PublicProfile> for ProfileDto {
    fn from(profile: PublicProfile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
        }
    }
}

/// Query parameters for game-filtered list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GameQuery {
    /// Game filter (`"mm2"`, `"adopt_me"`, `"sab"`, `"gag"`).
    #[serde(default)]
    pub game: Option<String>,
}

/// Response body for boolean delete operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    /// Whether a row was deleted.
    pub deleted: bool,
}
