//! Catalog reads plus the admin write surface.
//!
//! The trading core treats the catalog as read-mostly reference data:
//! listings store item references and the catalog is joined in at read
//! time. Writes come only from the admin surface (and the companion
//! bot, which uses the same endpoints).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Game, Item, ItemDetails, ItemId, ItemSummary};
use crate::error::MarketError;
use crate::persistence::Store;

/// Fields accepted when creating or replacing a catalog item.
#[derive(Debug, Clone)]
pub struct ItemUpsert {
    /// Game the item belongs to.
    pub game: Game,
    /// Display name.
    pub name: String,
    /// Section/category within the game.
    pub section: Option<String>,
    /// Base trading value.
    pub value: i64,
    /// Image reference.
    pub image_url: Option<String>,
    /// Game-specific payload; must carry the same game tag.
    pub details: Option<ItemDetails>,
}

/// Catalog queries and admin mutations.
#[derive(Debug)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Lists items, optionally filtered by game, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn list(&self, game: Option<Game>) -> Result<Vec<Item>, MarketError> {
        self.store.items_by_game(game).await
    }

    /// Fetches one item.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the id does not resolve,
    /// or [`MarketError::Persistence`] on store failure.
    pub async fn get(&self, id: ItemId) -> Result<Item, MarketError> {
        self.store
            .get_item(id)
            .await?
            .ok_or(MarketError::NotFound("item"))
    }

    /// Creates or replaces an item under the given id. An existing
    /// item's creation timestamp is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] for an empty name, a negative
    /// value, or a details payload tagged with a different game;
    /// [`MarketError::Persistence`] on store failure.
    pub async fn upsert(&self, id: ItemId, upsert: ItemUpsert) -> Result<Item, MarketError> {
        if upsert.name.trim().is_empty() {
            return Err(MarketError::Validation(
                "item name must not be empty".to_string(),
            ));
        }
        if upsert.value < 0 {
            return Err(MarketError::Validation(
                "item value must not be negative".to_string(),
            ));
        }
        let details = upsert
            .details
            .unwrap_or_else(|| ItemDetails::empty_for(upsert.game));
        if details.game() != upsert.game {
            return Err(MarketError::Validation(
                "details payload belongs to a different game".to_string(),
            ));
        }

        let now = Utc::now();
        let created_at = self
            .store
            .get_item(id)
            .await?
            .map_or(now, |existing| existing.created_at);

        let item = Item {
            id,
            game: upsert.game,
            name: upsert.name.trim().to_string(),
            section: upsert.section,
            value: upsert.value,
            image_url: upsert.image_url,
            details,
            created_at,
            updated_at: now,
        };
        let item = self.store.upsert_item(item).await?;
        tracing::info!(item_id = %item.id, game = %item.game, name = %item.name, "catalog item upserted");
        Ok(item)
    }

    /// Deletes an item. Returns `false` when the id does not resolve.
    /// Listings referencing it keep their reference and display the
    /// placeholder from then on.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn remove(&self, id: ItemId) -> Result<bool, MarketError> {
        let removed = self.store.delete_item(id).await?;
        if removed {
            tracing::info!(item_id = %id, "catalog item deleted");
        }
        Ok(removed)
    }

    /// Resolves listing item references into display summaries,
    /// preserving input order. References that no longer resolve map to
    /// the placeholder summary instead of failing the response.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn summaries_for(
        &self,
        game: Game,
        refs: &[ItemId],
    ) -> Result<Vec<ItemSummary>, MarketError> {
        let found = self.store.resolve_items(refs).await?;
        let by_id: HashMap<ItemId, Item> = found.into_iter().map(|i| (i.id, i)).collect();
        Ok(refs
            .iter()
            .map(|id| {
                by_id
                    .get(id)
                    .map_or_else(|| ItemSummary::unknown(*id, game), ItemSummary::from)
            })
            .collect())
    }
}
