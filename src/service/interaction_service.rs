//! Trade interaction rules: creation against a listing, status machine.

use std::sync::Arc;

use crate::domain::{InteractionId, InteractionStatus, ListingId, TradeInteraction, UserId};
use crate::error::MarketError;
use crate::moderation::ModerationGate;
use crate::persistence::Store;

/// Upper bound on an interaction message, in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Business rules for proposals made against listings.
///
/// No quota applies here, unlike listings: a user may propose against
/// as many listings as they like.
#[derive(Debug)]
pub struct InteractionService {
    store: Arc<dyn Store>,
    moderation: Arc<ModerationGate>,
}

impl InteractionService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, moderation: Arc<ModerationGate>) -> Self {
        Self { store, moderation }
    }

    /// Records a new pending proposal from `actor` against a listing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the listing does not
    /// exist, [`MarketError::ModerationRejected`] when the message fails
    /// screening, [`MarketError::Validation`] for an oversized message,
    /// or [`MarketError::Persistence`] on store failure.
    pub async fn create(
        &self,
        actor: &UserId,
        listing_id: ListingId,
        message: Option<String>,
    ) -> Result<TradeInteraction, MarketError> {
        if self.store.get_listing(listing_id).await?.is_none() {
            return Err(MarketError::NotFound("listing"));
        }
        let message = self.screen_message(message).await?;

        let interaction = TradeInteraction::new(actor.clone(), listing_id, message);
        let interaction = self.store.insert_interaction(interaction).await?;
        tracing::info!(
            interaction_id = %interaction.id,
            listing_id = %listing_id,
            initiator = %actor,
            "interaction created"
        );
        Ok(interaction)
    }

    /// Lists all proposals against a listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the listing does not
    /// exist, or [`MarketError::Persistence`] on store failure.
    pub async fn list(&self, listing_id: ListingId) -> Result<Vec<TradeInteraction>, MarketError> {
        if self.store.get_listing(listing_id).await?.is_none() {
            return Err(MarketError::NotFound("listing"));
        }
        self.store.interactions_for_listing(listing_id).await
    }

    /// Moves an interaction through its status machine.
    ///
    /// The listing owner decides pending proposals (`accepted` or
    /// `declined`); either the owner or the initiator may mark an
    /// accepted proposal `completed`. Anyone else sees not-found.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the interaction (or its
    /// listing) does not exist or the actor is neither party,
    /// [`MarketError::Validation`] for an illegal transition, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn update_status(
        &self,
        actor: &UserId,
        id: InteractionId,
        next: InteractionStatus,
    ) -> Result<TradeInteraction, MarketError> {
        let interaction = self
            .store
            .get_interaction(id)
            .await?
            .ok_or(MarketError::NotFound("interaction"))?;
        let listing = self
            .store
            .get_listing(interaction.listing_id)
            .await?
            .ok_or(MarketError::NotFound("interaction"))?;

        let is_owner = actor == &listing.owner;
        let is_initiator = actor == &interaction.initiator;
        if !is_owner && !is_initiator {
            return Err(MarketError::NotFound("interaction"));
        }

        if !interaction.status.can_transition_to(next) {
            return Err(MarketError::Validation(format!(
                "cannot move interaction from {} to {next}",
                interaction.status
            )));
        }
        let allowed = match next {
            InteractionStatus::Accepted | InteractionStatus::Declined => is_owner,
            InteractionStatus::Completed => is_owner || is_initiator,
            InteractionStatus::Pending => false,
        };
        if !allowed {
            return Err(MarketError::Validation(format!(
                "only the listing owner may set status to {next}"
            )));
        }

        let updated = self
            .store
            .set_interaction_status(id, next)
            .await?
            .ok_or(MarketError::NotFound("interaction"))?;
        tracing::info!(interaction_id = %id, status = %next, "interaction status changed");
        Ok(updated)
    }

    async fn screen_message(&self, message: Option<String>) -> Result<Option<String>, MarketError> {
        let Some(message) = message else {
            return Ok(None);
        };
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > MAX_MESSAGE_LEN {
            return Err(MarketError::Validation(format!(
                "message may hold at most {MAX_MESSAGE_LEN} characters"
            )));
        }
        self.moderation.screen(trimmed).await?;
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Game, ItemId, TradeListing};
    use crate::moderation::ModerationFilter;
    use crate::persistence::MemoryStore;

    struct Fixture {
        service: InteractionService,
        store: Arc<MemoryStore>,
        owner: UserId,
        listing: ListingId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let moderation = Arc::new(ModerationGate::new(ModerationFilter::new()));
        let owner = UserId::new("owner");
        let listing = TradeListing::new(
            owner.clone(),
            Game::Mm2,
            vec![ItemId::new()],
            vec![ItemId::new()],
            None,
        );
        let listing_id = listing.id;
        let Ok(_) = store.insert_listing(listing, 3).await else {
            panic!("listing insert failed");
        };
        Fixture {
            service: InteractionService::new(Arc::clone(&store) as Arc<dyn Store>, moderation),
            store,
            owner,
            listing: listing_id,
        }
    }

    #[tokio::test]
    async fn create_starts_pending_and_lists_newest_first() {
        let f = fixture().await;
        let Ok(first) = f
            .service
            .create(&UserId::new("u2"), f.listing, Some("trade me".to_string()))
            .await
        else {
            panic!("create failed");
        };
        assert_eq!(first.status, InteractionStatus::Pending);

        let Ok(second) = f.service.create(&UserId::new("u3"), f.listing, None).await else {
            panic!("create failed");
        };

        let Ok(listed) = f.service.list(f.listing).await else {
            panic!("list failed");
        };
        assert_eq!(
            listed.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }

    #[tokio::test]
    async fn create_against_missing_listing_is_not_found() {
        let f = fixture().await;
        let result = f
            .service
            .create(&UserId::new("u2"), ListingId::new(), None)
            .await;
        assert!(matches!(result, Err(MarketError::NotFound(_))));
    }

    #[tokio::test]
    async fn offensive_message_is_rejected() {
        let f = fixture().await;
        let result = f
            .service
            .create(
                &UserId::new("u2"),
                f.listing,
                Some("l1sten f4ggot".to_string()),
            )
            .await;
        assert!(matches!(result, Err(MarketError::ModerationRejected(_))));

        let Ok(listed) = f.service.list(f.listing).await else {
            panic!("list failed");
        };
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn owner_accepts_then_either_party_completes() {
        let f = fixture().await;
        let initiator = UserId::new("u2");
        let Ok(interaction) = f.service.create(&initiator, f.listing, None).await else {
            panic!("create failed");
        };

        let Ok(accepted) = f
            .service
            .update_status(&f.owner, interaction.id, InteractionStatus::Accepted)
            .await
        else {
            panic!("accept failed");
        };
        assert_eq!(accepted.status, InteractionStatus::Accepted);

        let Ok(completed) = f
            .service
            .update_status(&initiator, interaction.id, InteractionStatus::Completed)
            .await
        else {
            panic!("complete failed");
        };
        assert_eq!(completed.status, InteractionStatus::Completed);
    }

    #[tokio::test]
    async fn initiator_cannot_accept_their_own_proposal() {
        let f = fixture().await;
        let initiator = UserId::new("u2");
        let Ok(interaction) = f.service.create(&initiator, f.listing, None).await else {
            panic!("create failed");
        };

        let result = f
            .service
            .update_status(&initiator, interaction.id, InteractionStatus::Accepted)
            .await;
        assert!(matches!(result, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn strangers_see_not_found() {
        let f = fixture().await;
        let Ok(interaction) = f.service.create(&UserId::new("u2"), f.listing, None).await else {
            panic!("create failed");
        };

        let result = f
            .service
            .update_status(
                &UserId::new("lurker"),
                interaction.id,
                InteractionStatus::Accepted,
            )
            .await;
        assert!(matches!(result, Err(MarketError::NotFound(_))));
    }

    #[tokio::test]
    async fn illegal_transitions_are_rejected() {
        let f = fixture().await;
        let Ok(interaction) = f.service.create(&UserId::new("u2"), f.listing, None).await else {
            panic!("create failed");
        };

        // pending → completed skips the acceptance step.
        let skipped = f
            .service
            .update_status(&f.owner, interaction.id, InteractionStatus::Completed)
            .await;
        assert!(matches!(skipped, Err(MarketError::Validation(_))));

        let Ok(_) = f
            .service
            .update_status(&f.owner, interaction.id, InteractionStatus::Declined)
            .await
        else {
            panic!("decline failed");
        };

        // declined is terminal.
        let revived = f
            .service
            .update_status(&f.owner, interaction.id, InteractionStatus::Accepted)
            .await;
        assert!(matches!(revived, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn deleting_the_listing_cascades_to_interactions() {
        let f = fixture().await;
        let Ok(interaction) = f.service.create(&UserId::new("u2"), f.listing, None).await else {
            panic!("create failed");
        };

        let Ok(true) = f.store.delete_listing(&f.owner, f.listing).await else {
            panic!("listing delete failed");
        };
        let Ok(orphan) = f.store.get_interaction(interaction.id).await else {
            panic!("lookup failed");
        };
        assert!(orphan.is_none());
    }
}
