//! Trade interaction DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::ProfileDto;

/// Request body for `POST /listings/{id}/interactions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInteractionRequest {
    /// Optional free-text pitch; moderated before persist.
    #[serde(default)]
    pub message: Option<String>,
}

/// Request body for `PATCH /interactions/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInteractionRequest {
    /// Target status (`"accepted"`, `"declined"`, `"completed"`).
    pub status: String,
}

/// A proposal with its initiator's profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct InteractionDto {
    /// Interaction identifier.
    pub id: Uuid,
    /// Target listing identifier.
    pub listing_id: Uuid,
    /// Initiator's public profile.
    pub initiator: ProfileDto,
    /// Free-text pitch.
    pub message: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status-change timestamp.
    pub updated_at: DateTime<Utc>,
}
