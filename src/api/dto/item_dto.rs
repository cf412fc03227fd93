//! Catalog item DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Item, ItemSummary};
use crate::error::MarketError;

/// Full catalog item for `GET /items/{id}` and admin responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDto {
    /// Item identifier.
    pub id: Uuid,
    /// Owning game.
    pub game: String,
    /// Display name.
    pub name: String,
    /// Section/category within the game.
    pub section: Option<String>,
    /// Base trading value.
    pub value: i64,
    /// Image reference.
    pub image_url: Option<String>,
    /// Game-specific payload, tagged by game.
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ItemDto {
    /// Builds the DTO, serializing the game-specific payload.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Internal`] if the payload cannot be
    /// serialized.
    pub fn from_item(item: Item) -> Result<Self, MarketError> {
        let details = serde_json::to_value(&item.details)
            .map_err(|e| MarketError::Internal(format!("serialize item details: {e}")))?;
        Ok(Self {
            id: item.id.as_uuid(),
            game: item.game.as_str().to_string(),
            name: item.name,
            section: item.section,
            value: item.value,
            image_url: item.image_url,
            details,
            created_at: item.created_at,
            updated_at: item.updated_at,
        })
    }
}

/// Cross-game item projection embedded into listing responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemSummaryDto {
    /// Item identifier.
    pub id: Uuid,
    /// Owning game.
    pub game: String,
    /// Display name, or `"Unknown Item"` for dangling references.
    pub name: String,
    /// Base trading value.
    pub value: i64,
    /// Image reference.
    pub image_url: Option<String>,
}

impl From<ItemSummary> for ItemSummaryDto {
    fn from(summary: ItemSummary) -> Self {
        Self {
            id: summary.id.as_uuid(),
            game: summary.game.as_str().to_string(),
            name: summary.name,
            value: summary.value,
            image_url: summary.image_url,
        }
    }
}

/// Request body for `PUT /admin/items/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertItemRequest {
    /// Owning game.
    pub game: String,
    /// Display name.
    pub name: String,
    /// Section/category within the game.
    #[serde(default)]
    pub section: Option<String>,
    /// Base trading value.
    pub value: i64,
    /// Image reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Game-specific payload tagged by game; defaults to an empty
    /// payload for the game.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}
