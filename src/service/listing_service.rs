//! Trade listing rules: quota, moderation gate, expiry sweep.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::{
    Game, ItemId, ListingId, ListingPatch, MAX_ITEMS_PER_SIDE, TradeListing, UserId,
};
use crate::error::MarketError;
use crate::moderation::ModerationGate;
use crate::persistence::Store;

/// Upper bound on listing notes, in characters.
pub const MAX_NOTES_LEN: usize = 500;

/// Business rules for the trade board.
///
/// Creation runs the moderation gate over notes and delegates the
/// quota-checked insert to the store. Reads of the public board first
/// sweep expired listings, so a stale listing can never be served; the
/// same sweep also runs on a timer from `main` so reads are not the only
/// cleanup trigger.
#[derive(Debug)]
pub struct ListingService {
    store: Arc<dyn Store>,
    moderation: Arc<ModerationGate>,
    quota: u32,
    retention: Duration,
}

impl ListingService {
    /// Creates the service with the configured quota and retention
    /// window.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        moderation: Arc<ModerationGate>,
        quota: u32,
        retention_days: u64,
    ) -> Self {
        // chrono::Duration::days panics far out of range; cap at a century.
        let days = i64::try_from(retention_days).unwrap_or(36_500).min(36_500);
        Self {
            store,
            moderation,
            quota,
            retention: Duration::days(days),
        }
    }

    /// Creates a new active listing for `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] for empty or oversized item
    /// sides, [`MarketError::ModerationRejected`] when the notes fail
    /// screening, [`MarketError::QuotaExceeded`] when the actor already
    /// holds the maximum number of active listings, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn create(
        &self,
        actor: &UserId,
        game: Game,
        offering: Vec<ItemId>,
        requesting: Vec<ItemId>,
        notes: Option<String>,
    ) -> Result<TradeListing, MarketError> {
        validate_side(&offering, "offering")?;
        validate_side(&requesting, "requesting")?;
        let notes = self.screen_notes(notes).await?;

        let listing = TradeListing::new(actor.clone(), game, offering, requesting, notes);
        let listing = self.store.insert_listing(listing, self.quota).await?;
        tracing::info!(listing_id = %listing.id, owner = %listing.owner, game = %listing.game, "listing created");
        Ok(listing)
    }

    /// Returns the public trade board, optionally filtered by game,
    /// newest first. Sweeps expired listings before reading.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn list_active(&self, game: Option<Game>) -> Result<Vec<TradeListing>, MarketError> {
        self.sweep().await?;
        self.store.active_listings(game).await
    }

    /// Returns all of `actor`'s listings (any status), newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn user_listings(&self, actor: &UserId) -> Result<Vec<TradeListing>, MarketError> {
        self.store.listings_by_owner(actor).await
    }

    /// Applies a partial update to a listing `actor` owns. New notes are
    /// moderated; a listing not owned by `actor` reads as not found.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] for an empty patch or invalid
    /// item sides, [`MarketError::ModerationRejected`] when new notes
    /// fail screening, [`MarketError::NotFound`] when the listing does
    /// not exist or is not owned by `actor`, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn update(
        &self,
        actor: &UserId,
        id: ListingId,
        mut patch: ListingPatch,
    ) -> Result<TradeListing, MarketError> {
        if patch.is_empty() {
            return Err(MarketError::Validation("no fields to update".to_string()));
        }
        if let Some(offering) = &patch.offering {
            validate_side(offering, "offering")?;
        }
        if let Some(requesting) = &patch.requesting {
            validate_side(requesting, "requesting")?;
        }
        if let Some(notes) = patch.notes.take() {
            patch.notes = Some(self.screen_notes(notes).await?);
        }

        self.store
            .update_listing(actor, id, patch)
            .await?
            .ok_or(MarketError::NotFound("listing"))
    }

    /// Deletes a listing `actor` owns. Returns `false` (not an error)
    /// when the listing does not exist or is not owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn delete(&self, actor: &UserId, id: ListingId) -> Result<bool, MarketError> {
        let deleted = self.store.delete_listing(actor, id).await?;
        if deleted {
            tracing::info!(listing_id = %id, owner = %actor, "listing deleted");
        }
        Ok(deleted)
    }

    /// Deletes every listing older than the retention window, returning
    /// the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn sweep(&self) -> Result<u64, MarketError> {
        let cutoff = Utc::now() - self.retention;
        let swept = self.store.delete_listings_before(cutoff).await?;
        if swept > 0 {
            tracing::info!(swept, "expired listings removed");
        }
        Ok(swept)
    }

    /// Trims, bounds, and moderates listing notes. Whitespace-only notes
    /// collapse to `None`.
    async fn screen_notes(&self, notes: Option<String>) -> Result<Option<String>, MarketError> {
        let Some(notes) = notes else {
            return Ok(None);
        };
        let trimmed = notes.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > MAX_NOTES_LEN {
            return Err(MarketError::Validation(format!(
                "notes may hold at most {MAX_NOTES_LEN} characters"
            )));
        }
        self.moderation.screen(trimmed).await?;
        Ok(Some(trimmed.to_string()))
    }
}

fn validate_side(side: &[ItemId], name: &str) -> Result<(), MarketError> {
    if side.is_empty() {
        return Err(MarketError::Validation(format!("{name} must not be empty")));
    }
    if side.len() > MAX_ITEMS_PER_SIDE {
        return Err(MarketError::Validation(format!(
            "{name} may hold at most {MAX_ITEMS_PER_SIDE} items"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ListingStatus;
    use crate::moderation::ModerationFilter;
    use crate::persistence::MemoryStore;

    fn service_with_store() -> (ListingService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let moderation = Arc::new(ModerationGate::new(ModerationFilter::new()));
        let service = ListingService::new(Arc::clone(&store) as Arc<dyn Store>, moderation, 3, 7);
        (service, store)
    }

    fn items(n: usize) -> Vec<ItemId> {
        (0..n).map(|_| ItemId::new()).collect()
    }

    #[tokio::test]
    async fn create_then_list_round_trips_as_active() {
        let (service, _) = service_with_store();
        let actor = UserId::new("u1");

        let created = service
            .create(&actor, Game::Mm2, items(2), items(1), None)
            .await;
        let Ok(created) = created else {
            panic!("create failed");
        };

        let Ok(mine) = service.user_listings(&actor).await else {
            panic!("list failed");
        };
        assert!(
            mine.iter()
                .any(|l| l.id == created.id && l.status == ListingStatus::Active)
        );
    }

    #[tokio::test]
    async fn fourth_listing_hits_the_quota_and_is_not_persisted() {
        let (service, _) = service_with_store();
        let actor = UserId::new("u1");
        for _ in 0..3 {
            let created = service
                .create(&actor, Game::Mm2, items(1), items(1), None)
                .await;
            assert!(created.is_ok());
        }

        let fourth = service
            .create(&actor, Game::Mm2, items(1), items(1), None)
            .await;
        let Err(MarketError::QuotaExceeded { limit: 3 }) = fourth else {
            panic!("expected quota error");
        };

        let Ok(mine) = service.user_listings(&actor).await else {
            panic!("list failed");
        };
        assert_eq!(mine.len(), 3);
    }

    #[tokio::test]
    async fn empty_sides_are_rejected() {
        let (service, _) = service_with_store();
        let actor = UserId::new("u1");

        let no_offer = service
            .create(&actor, Game::Mm2, vec![], items(1), None)
            .await;
        assert!(matches!(no_offer, Err(MarketError::Validation(_))));

        let oversized = service
            .create(&actor, Game::Mm2, items(MAX_ITEMS_PER_SIDE + 1), items(1), None)
            .await;
        assert!(matches!(oversized, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn offensive_notes_are_rejected_and_nothing_is_persisted() {
        let (service, _) = service_with_store();
        let actor = UserId::new("u1");

        let result = service
            .create(
                &actor,
                Game::Mm2,
                items(1),
                items(1),
                Some("quick trade n1gg3r".to_string()),
            )
            .await;
        assert!(matches!(result, Err(MarketError::ModerationRejected(_))));

        let Ok(mine) = service.user_listings(&actor).await else {
            panic!("list failed");
        };
        assert!(mine.is_empty());
    }

    #[tokio::test]
    async fn update_by_non_owner_matches_the_missing_id_error() {
        let (service, _) = service_with_store();
        let owner = UserId::new("u1");
        let stranger = UserId::new("u2");
        let Ok(listing) = service
            .create(&owner, Game::Mm2, items(1), items(1), None)
            .await
        else {
            panic!("create failed");
        };

        let patch = ListingPatch {
            status: Some(ListingStatus::Completed),
            ..ListingPatch::default()
        };
        let not_owner = service.update(&stranger, listing.id, patch.clone()).await;
        let missing = service.update(&stranger, ListingId::new(), patch).await;

        let (Err(a), Err(b)) = (not_owner, missing) else {
            panic!("expected errors");
        };
        assert_eq!(a.error_code(), b.error_code());
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields_alone() {
        let (service, _) = service_with_store();
        let actor = UserId::new("u1");
        let Ok(listing) = service
            .create(
                &actor,
                Game::AdoptMe,
                items(2),
                items(1),
                Some("dream pets only".to_string()),
            )
            .await
        else {
            panic!("create failed");
        };

        let patch = ListingPatch {
            status: Some(ListingStatus::Completed),
            ..ListingPatch::default()
        };
        let Ok(updated) = service.update(&actor, listing.id, patch).await else {
            panic!("update failed");
        };
        assert_eq!(updated.status, ListingStatus::Completed);
        assert_eq!(updated.offering, listing.offering);
        assert_eq!(updated.notes.as_deref(), Some("dream pets only"));
    }

    #[tokio::test]
    async fn backdated_listing_disappears_from_every_read_after_a_board_read() {
        let (service, store) = service_with_store();
        let actor = UserId::new("u1");

        let mut stale = TradeListing::new(actor.clone(), Game::Sab, items(1), items(1), None);
        stale.created_at = Utc::now() - Duration::days(8);
        let stale_id = stale.id;
        let inserted = store.insert_listing(stale, 3).await;
        assert!(inserted.is_ok());

        let Ok(board) = service.list_active(None).await else {
            panic!("board read failed");
        };
        assert!(board.iter().all(|l| l.id != stale_id));

        let Ok(mine) = service.user_listings(&actor).await else {
            panic!("list failed");
        };
        assert!(mine.iter().all(|l| l.id != stale_id), "row is gone, not hidden");
    }

    #[tokio::test]
    async fn board_filters_by_game() {
        let (service, _) = service_with_store();
        let actor = UserId::new("u1");
        let _ = service
            .create(&actor, Game::Mm2, items(1), items(1), None)
            .await;
        let _ = service
            .create(&actor, Game::Gag, items(1), items(1), None)
            .await;

        let Ok(board) = service.list_active(Some(Game::Gag)).await else {
            panic!("board read failed");
        };
        assert_eq!(board.len(), 1);
        assert!(board.iter().all(|l| l.game == Game::Gag));
    }

    #[tokio::test]
    async fn delete_returns_false_for_strangers_and_missing_ids() {
        let (service, _) = service_with_store();
        let owner = UserId::new("u1");
        let Ok(listing) = service
            .create(&owner, Game::Mm2, items(1), items(1), None)
            .await
        else {
            panic!("create failed");
        };

        assert_eq!(
            service.delete(&UserId::new("u2"), listing.id).await.ok(),
            Some(false)
        );
        assert_eq!(service.delete(&owner, listing.id).await.ok(), Some(true));
        assert_eq!(service.delete(&owner, listing.id).await.ok(), Some(false));
    }
}
