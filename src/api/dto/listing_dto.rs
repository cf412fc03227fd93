//! Trade listing DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::ProfileDto;
use super::item_dto::ItemSummaryDto;

/// Request body for `POST /listings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateListingRequest {
    /// Game the listed items belong to.
    pub game: String,
    /// Item ids the owner is giving. Must not be empty.
    pub offering: Vec<Uuid>,
    /// Item ids the owner wants. Must not be empty.
    pub requesting: Vec<Uuid>,
    /// Optional free-text notes; moderated before persist.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for `PATCH /listings/{id}`. Absent fields are left
/// unchanged; an empty `notes` string clears the notes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateListingRequest {
    /// New status (`"active"`, `"completed"`, `"cancelled"`).
    #[serde(default)]
    pub status: Option<String>,
    /// New offering side.
    #[serde(default)]
    pub offering: Option<Vec<Uuid>>,
    /// New requesting side.
    #[serde(default)]
    pub requesting: Option<Vec<Uuid>>,
    /// New notes; moderated before persist.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A trade listing with its creator's profile and resolved items.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingDto {
    /// Listing identifier.
    pub id: Uuid,
    /// Creator's public profile.
    pub owner: ProfileDto,
    /// Owning game.
    pub game: String,
    /// Offered items, in display order.
    pub offering: Vec<ItemSummaryDto>,
    /// Requested items, in display order.
    pub requesting: Vec<ItemSummaryDto>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}
