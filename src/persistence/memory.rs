//! In-memory [`Store`] implementation.
//!
//! Backs the test suite and database-free local development. A single
//! [`tokio::sync::Mutex`] guards all state, which makes every operation
//! atomic and serializes the quota check-and-insert without further
//! machinery.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::Store;
use crate::domain::{
    Conversation, ConversationId, Game, InteractionId, InteractionStatus, Item, ItemId, ListingId,
    ListingPatch, ListingStatus, Message, MessageCursor, MessageId, Reactions, Session, TOMBSTONE,
    TradeInteraction, TradeListing, UserId, canonical_pair,
};
use crate::error::MarketError;

#[derive(Debug, Default)]
struct MemoryInner {
    items: HashMap<ItemId, Item>,
    listings: HashMap<ListingId, TradeListing>,
    interactions: HashMap<InteractionId, TradeInteraction>,
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<MessageId, Message>,
    sessions: HashMap<String, Session>,
}

impl MemoryInner {
    /// Removes interactions targeting any of the given listings.
    fn cascade_interactions(&mut self, listing_ids: &[ListingId]) {
        self.interactions
            .retain(|_, i| !listing_ids.contains(&i.listing_id));
    }
}

/// Process-local store with full [`Store`] semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_item(&self, item: Item) -> Result<Item, MarketError> {
        let mut inner = self.inner.lock().await;
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, MarketError> {
        let inner = self.inner.lock().await;
        Ok(inner.items.get(&id).cloned())
    }

    async fn delete_item(&self, id: ItemId) -> Result<bool, MarketError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.items.remove(&id).is_some())
    }

    async fn items_by_game(&self, game: Option<Game>) -> Result<Vec<Item>, MarketError> {
        let inner = self.inner.lock().await;
        let mut items: Vec<Item> = inner
            .items
            .values()
            .filter(|i| game.is_none_or(|g| i.game == g))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn resolve_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, MarketError> {
        let inner = self.inner.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.items.get(id).cloned())
            .collect())
    }

    async fn insert_listing(
        &self,
        listing: TradeListing,
        max_active: u32,
    ) -> Result<TradeListing, MarketError> {
        let mut inner = self.inner.lock().await;
        let active = inner
            .listings
            .values()
            .filter(|l| l.owner == listing.owner && l.status == ListingStatus::Active)
            .count();
        if listing.status == ListingStatus::Active && active >= max_active as usize {
            return Err(MarketError::QuotaExceeded { limit: max_active });
        }
        inner.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Option<TradeListing>, MarketError> {
        let inner = self.inner.lock().await;
        Ok(inner.listings.get(&id).cloned())
    }

    async fn active_listings(&self, game: Option<Game>) -> Result<Vec<TradeListing>, MarketError> {
        let inner = self.inner.lock().await;
        let mut listings: Vec<TradeListing> = inner
            .listings
            .values()
            .filter(|l| l.status == ListingStatus::Active && game.is_none_or(|g| l.game == g))
            .cloned()
            .collect();
        listings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(listings)
    }

    async fn listings_by_owner(&self, owner: &UserId) -> Result<Vec<TradeListing>, MarketError> {
        let inner = self.inner.lock().await;
        let mut listings: Vec<TradeListing> = inner
            .listings
            .values()
            .filter(|l| &l.owner == owner)
            .cloned()
            .collect();
        listings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(listings)
    }

    async fn update_listing(
        &self,
        owner: &UserId,
        id: ListingId,
        patch: ListingPatch,
    ) -> Result<Option<TradeListing>, MarketError> {
        let mut inner = self.inner.lock().await;
        let Some(listing) = inner.listings.get_mut(&id) else {
            return Ok(None);
        };
        if &listing.owner != owner {
            return Ok(None);
        }
        if let Some(status) = patch.status {
            listing.status = status;
        }
        if let Some(offering) = patch.offering {
            listing.offering = offering;
        }
        if let Some(requesting) = patch.requesting {
            listing.requesting = requesting;
        }
        if let Some(notes) = patch.notes {
            listing.notes = notes;
        }
        listing.updated_at = Utc::now();
        Ok(Some(listing.clone()))
    }

    async fn delete_listing(&self, owner: &UserId, id: ListingId) -> Result<bool, MarketError> {
        let mut inner = self.inner.lock().await;
        let owned = inner
            .listings
            .get(&id)
            .is_some_and(|l| &l.owner == owner);
        if !owned {
            return Ok(false);
        }
        inner.listings.remove(&id);
        inner.cascade_interactions(&[id]);
        Ok(true)
    }

    async fn delete_listings_before(&self, cutoff: DateTime<Utc>) -> Result<u64, MarketError> {
        let mut inner = self.inner.lock().await;
        let expired: Vec<ListingId> = inner
            .listings
            .values()
            .filter(|l| l.created_at < cutoff)
            .map(|l| l.id)
            .collect();
        for id in &expired {
            inner.listings.remove(id);
        }
        inner.cascade_interactions(&expired);
        Ok(expired.len() as u64)
    }

    async fn insert_interaction(
        &self,
        interaction: TradeInteraction,
    ) -> Result<TradeInteraction, MarketError> {
        let mut inner = self.inner.lock().await;
        inner
            .interactions
            .insert(interaction.id, interaction.clone());
        Ok(interaction)
    }

    async fn get_interaction(
        &self,
        id: InteractionId,
    ) -> Result<Option<TradeInteraction>, MarketError> {
        let inner = self.inner.lock().await;
        Ok(inner.interactions.get(&id).cloned())
    }

    async fn interactions_for_listing(
        &self,
        listing: ListingId,
    ) -> Result<Vec<TradeInteraction>, MarketError> {
        let inner = self.inner.lock().await;
        let mut interactions: Vec<TradeInteraction> = inner
            .interactions
            .values()
            .filter(|i| i.listing_id == listing)
            .cloned()
            .collect();
        interactions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(interactions)
    }

    async fn set_interaction_status(
        &self,
        id: InteractionId,
        status: InteractionStatus,
    ) -> Result<Option<TradeInteraction>, MarketError> {
        let mut inner = self.inner.lock().await;
        let Some(interaction) = inner.interactions.get_mut(&id) else {
            return Ok(None);
        };
        interaction.status = status;
        interaction.updated_at = Utc::now();
        Ok(Some(interaction.clone()))
    }

    async fn get_or_create_conversation(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Conversation, MarketError> {
        let (first, second) = canonical_pair(a.clone(), b.clone());
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner
            .conversations
            .values()
            .find(|c| c.participant_a == first && c.participant_b == second)
        {
            return Ok(existing.clone());
        }
        let conversation = Conversation::new(first, second);
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, MarketError> {
        let inner = self.inner.lock().await;
        Ok(inner.conversations.get(&id).cloned())
    }

    async fn conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<(Conversation, u64)>, MarketError> {
        let inner = self.inner.lock().await;
        let mut result: Vec<(Conversation, u64)> = inner
            .conversations
            .values()
            .filter(|c| c.has_participant(user))
            .map(|c| {
                let unread = inner
                    .messages
                    .values()
                    .filter(|m| m.conversation_id == c.id && &m.sender != user && !m.read)
                    .count() as u64;
                (c.clone(), unread)
            })
            .collect();
        // Pinned first, then newest activity; conversations that never
        // had a message sort last.
        result.sort_by(|(a, _), (b, _)| {
            b.pinned
                .cmp(&a.pinned)
                .then(b.last_message_at.cmp(&a.last_message_at))
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(result)
    }

    async fn set_conversation_pinned(
        &self,
        id: ConversationId,
        pinned: bool,
    ) -> Result<Option<Conversation>, MarketError> {
        let mut inner = self.inner.lock().await;
        let Some(conversation) = inner.conversations.get_mut(&id) else {
            return Ok(None);
        };
        conversation.pinned = pinned;
        Ok(Some(conversation.clone()))
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, MarketError> {
        let mut inner = self.inner.lock().await;
        if inner.conversations.remove(&id).is_none() {
            return Ok(false);
        }
        inner.messages.retain(|_, m| m.conversation_id != id);
        Ok(true)
    }

    async fn insert_message(
        &self,
        conversation: ConversationId,
        sender: &UserId,
        content: String,
        reply_to: Option<MessageId>,
    ) -> Result<Message, MarketError> {
        let mut inner = self.inner.lock().await;
        if !inner.conversations.contains_key(&conversation) {
            return Err(MarketError::NotFound("conversation"));
        }
        if let Some(reply) = reply_to {
            let in_thread = inner
                .messages
                .get(&reply)
                .is_some_and(|m| m.conversation_id == conversation);
            if !in_thread {
                return Err(MarketError::Validation(
                    "reply target not found in this conversation".to_string(),
                ));
            }
        }
        let message = Message::new(conversation, sender.clone(), content, reply_to);
        if let Some(conv) = inner.conversations.get_mut(&conversation) {
            if conv.last_message_at.is_none_or(|t| t < message.created_at) {
                conv.last_message_at = Some(message.created_at);
            }
        }
        inner.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn messages_before(
        &self,
        conversation: ConversationId,
        limit: u32,
        cursor: Option<MessageCursor>,
    ) -> Result<Vec<Message>, MarketError> {
        let inner = self.inner.lock().await;
        let mut messages: Vec<Message> = inner
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation)
            .filter(|m| match cursor {
                None => true,
                Some(MessageCursor {
                    before,
                    before_id: None,
                }) => m.created_at < before,
                Some(MessageCursor {
                    before,
                    before_id: Some(id),
                }) => (m.created_at, m.id) < (before, id),
            })
            .cloned()
            .collect();
        messages.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, MarketError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.get(&id).cloned())
    }

    async fn edit_message(
        &self,
        id: MessageId,
        content: String,
    ) -> Result<Option<Message>, MarketError> {
        let mut inner = self.inner.lock().await;
        let Some(message) = inner.messages.get_mut(&id) else {
            return Ok(None);
        };
        if message.is_deleted() {
            return Ok(None);
        }
        message.content = content;
        message.edited_at = Some(Utc::now());
        Ok(Some(message.clone()))
    }

    async fn tombstone_message(&self, id: MessageId) -> Result<Option<Message>, MarketError> {
        let mut inner = self.inner.lock().await;
        let Some(message) = inner.messages.get_mut(&id) else {
            return Ok(None);
        };
        message.content = TOMBSTONE.to_string();
        if message.deleted_at.is_none() {
            message.deleted_at = Some(Utc::now());
        }
        Ok(Some(message.clone()))
    }

    async fn set_reactions(
        &self,
        id: MessageId,
        reactions: Reactions,
    ) -> Result<Option<Message>, MarketError> {
        let mut inner = self.inner.lock().await;
        let Some(message) = inner.messages.get_mut(&id) else {
            return Ok(None);
        };
        message.reactions = reactions;
        Ok(Some(message.clone()))
    }

    async fn mark_read(
        &self,
        conversation: ConversationId,
        reader: &UserId,
    ) -> Result<u64, MarketError> {
        let mut inner = self.inner.lock().await;
        let mut marked = 0;
        for message in inner.messages.values_mut() {
            if message.conversation_id == conversation && &message.sender != reader && !message.read
            {
                message.read = true;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn put_session(&self, session: Session) -> Result<(), MarketError> {
        let mut inner = self.inner.lock().await;
        inner.sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, MarketError> {
        let inner = self.inner.lock().await;
        Ok(inner.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<bool, MarketError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.sessions.remove(token).is_some())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, MarketError> {
        let mut inner = self.inner.lock().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - inner.sessions.len()) as u64)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::Game;

    fn user(key: &str) -> UserId {
        UserId::new(key)
    }

    fn listing_for(owner: &str) -> TradeListing {
        TradeListing::new(
            user(owner),
            Game::Mm2,
            vec![ItemId::new()],
            vec![ItemId::new()],
            None,
        )
    }

    #[tokio::test]
    async fn quota_blocks_the_fourth_active_listing() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            let inserted = store.insert_listing(listing_for("u1"), 3).await;
            assert!(inserted.is_ok());
        }

        let fourth = store.insert_listing(listing_for("u1"), 3).await;
        let Err(MarketError::QuotaExceeded { limit }) = fourth else {
            panic!("expected quota error");
        };
        assert_eq!(limit, 3);

        let rows = store.listings_by_owner(&user("u1")).await;
        assert_eq!(rows.map(|r| r.len()).ok(), Some(3));
    }

    #[tokio::test]
    async fn quota_only_counts_active_listings() {
        let store = MemoryStore::new();
        let mut completed = listing_for("u1");
        completed.status = ListingStatus::Completed;
        let _ = store.insert_listing(completed, 3).await;
        for _ in 0..3 {
            assert!(store.insert_listing(listing_for("u1"), 3).await.is_ok());
        }
    }

    #[tokio::test]
    async fn quota_is_per_owner() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            let _ = store.insert_listing(listing_for("u1"), 3).await;
        }
        assert!(store.insert_listing(listing_for("u2"), 3).await.is_ok());
    }

    #[tokio::test]
    async fn update_by_non_owner_looks_like_not_found() {
        let store = MemoryStore::new();
        let listing = listing_for("u1");
        let id = listing.id;
        let _ = store.insert_listing(listing, 3).await;

        let patch = ListingPatch {
            status: Some(ListingStatus::Completed),
            ..ListingPatch::default()
        };
        let not_owner = store.update_listing(&user("u2"), id, patch.clone()).await;
        assert_eq!(not_owner.map(|r| r.is_none()).ok(), Some(true));

        let missing = store
            .update_listing(&user("u2"), ListingId::new(), patch)
            .await;
        assert_eq!(missing.map(|r| r.is_none()).ok(), Some(true));
    }

    #[tokio::test]
    async fn sweep_deletes_backdated_listings_and_their_interactions() {
        let store = MemoryStore::new();
        let mut stale = listing_for("u1");
        stale.created_at = Utc::now() - Duration::days(8);
        let stale_id = stale.id;
        let _ = store.insert_listing(stale, 3).await;
        let _ = store
            .insert_interaction(TradeInteraction::new(user("u2"), stale_id, None))
            .await;

        let fresh = listing_for("u1");
        let _ = store.insert_listing(fresh, 3).await;

        let swept = store
            .delete_listings_before(Utc::now() - Duration::days(7))
            .await;
        assert_eq!(swept.ok(), Some(1));

        let mine = store.listings_by_owner(&user("u1")).await.unwrap_or_default();
        assert_eq!(mine.len(), 1);
        assert!(mine.iter().all(|l| l.id != stale_id));

        let orphans = store
            .interactions_for_listing(stale_id)
            .await
            .unwrap_or_default();
        assert!(orphans.is_empty());
    }

    #[tokio::test]
    async fn get_or_create_conversation_is_idempotent_and_order_insensitive() {
        let store = MemoryStore::new();
        let first = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await;
        let second = store
            .get_or_create_conversation(&user("bob"), &user("alice"))
            .await;
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("conversation creation failed");
        };
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn insert_message_advances_last_message_at() {
        let store = MemoryStore::new();
        let Ok(conv) = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await
        else {
            panic!("conversation creation failed");
        };
        assert!(conv.last_message_at.is_none());

        let Ok(message) = store
            .insert_message(conv.id, &user("alice"), "hey".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        let Ok(Some(after)) = store.get_conversation(conv.id).await else {
            panic!("conversation vanished");
        };
        assert!(after.last_message_at.is_some_and(|t| t >= message.created_at));
    }

    #[tokio::test]
    async fn reply_must_target_the_same_conversation() {
        let store = MemoryStore::new();
        let Ok(conv_ab) = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await
        else {
            panic!("conversation creation failed");
        };
        let Ok(conv_ac) = store
            .get_or_create_conversation(&user("alice"), &user("carol"))
            .await
        else {
            panic!("conversation creation failed");
        };
        let Ok(original) = store
            .insert_message(conv_ab.id, &user("alice"), "hi".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        let cross = store
            .insert_message(
                conv_ac.id,
                &user("alice"),
                "wrong thread".to_string(),
                Some(original.id),
            )
            .await;
        assert!(matches!(cross, Err(MarketError::Validation(_))));

        let same = store
            .insert_message(
                conv_ab.id,
                &user("bob"),
                "right thread".to_string(),
                Some(original.id),
            )
            .await;
        assert!(same.is_ok());
    }

    #[tokio::test]
    async fn pagination_splits_without_overlap_or_gap() {
        let store = MemoryStore::new();
        let Ok(conv) = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await
        else {
            panic!("conversation creation failed");
        };
        let mut sent = Vec::new();
        for i in 0..10 {
            let Ok(m) = store
                .insert_message(conv.id, &user("alice"), format!("m{i}"), None)
                .await
            else {
                panic!("send failed");
            };
            sent.push(m.id);
        }

        let Ok(newest) = store.messages_before(conv.id, 5, None).await else {
            panic!("fetch failed");
        };
        assert_eq!(newest.len(), 5);
        let Some(oldest_of_page) = newest.last() else {
            panic!("empty page");
        };

        let Ok(older) = store
            .messages_before(conv.id, 5, Some(oldest_of_page.cursor()))
            .await
        else {
            panic!("fetch failed");
        };
        assert_eq!(older.len(), 5);

        let mut assembled: Vec<MessageId> = older
            .iter()
            .rev()
            .chain(newest.iter().rev())
            .map(|m| m.id)
            .collect();
        assert_eq!(assembled.len(), 10);
        assembled.dedup();
        assert_eq!(assembled, sent);
    }

    #[tokio::test]
    async fn cursor_tie_break_handles_identical_timestamps() {
        let store = MemoryStore::new();
        let Ok(conv) = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await
        else {
            panic!("conversation creation failed");
        };
        // Force three messages onto the exact same timestamp.
        let stamp = Utc::now();
        let mut ids = Vec::new();
        for i in 0..3 {
            let Ok(m) = store
                .insert_message(conv.id, &user("alice"), format!("t{i}"), None)
                .await
            else {
                panic!("send failed");
            };
            ids.push(m.id);
        }
        {
            let mut inner = store.inner.lock().await;
            for id in &ids {
                if let Some(m) = inner.messages.get_mut(id) {
                    m.created_at = stamp;
                }
            }
        }

        let Ok(page_one) = store.messages_before(conv.id, 2, None).await else {
            panic!("fetch failed");
        };
        let Some(boundary) = page_one.last() else {
            panic!("empty page");
        };
        let Ok(page_two) = store
            .messages_before(conv.id, 2, Some(boundary.cursor()))
            .await
        else {
            panic!("fetch failed");
        };

        let mut seen: Vec<MessageId> =
            page_one.iter().chain(page_two.iter()).map(|m| m.id).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3, "no message skipped or duplicated");
    }

    #[tokio::test]
    async fn tombstoned_message_stays_in_the_thread() {
        let store = MemoryStore::new();
        let Ok(conv) = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await
        else {
            panic!("conversation creation failed");
        };
        let Ok(message) = store
            .insert_message(conv.id, &user("alice"), "regret this".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        let Ok(Some(deleted)) = store.tombstone_message(message.id).await else {
            panic!("tombstone failed");
        };
        assert_eq!(deleted.content, TOMBSTONE);
        assert!(deleted.is_deleted());

        let Ok(page) = store.messages_before(conv.id, 10, None).await else {
            panic!("fetch failed");
        };
        assert!(page.iter().any(|m| m.id == message.id));

        // Deleting again keeps the original deletion timestamp.
        let Ok(Some(again)) = store.tombstone_message(message.id).await else {
            panic!("tombstone failed");
        };
        assert_eq!(again.deleted_at, deleted.deleted_at);

        // Editing a tombstoned message is refused.
        let edit = store.edit_message(message.id, "undo".to_string()).await;
        assert_eq!(edit.map(|r| r.is_none()).ok(), Some(true));
    }

    #[tokio::test]
    async fn mark_read_is_idempotent_and_scoped_to_the_reader() {
        let store = MemoryStore::new();
        let Ok(conv) = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await
        else {
            panic!("conversation creation failed");
        };
        for i in 0..4 {
            let _ = store
                .insert_message(conv.id, &user("alice"), format!("m{i}"), None)
                .await;
        }
        let _ = store
            .insert_message(conv.id, &user("bob"), "mine".to_string(), None)
            .await;

        assert_eq!(store.mark_read(conv.id, &user("bob")).await.ok(), Some(4));
        assert_eq!(store.mark_read(conv.id, &user("bob")).await.ok(), Some(0));

        let Ok(summaries) = store.conversations_for_user(&user("bob")).await else {
            panic!("list failed");
        };
        assert_eq!(summaries.first().map(|(_, unread)| *unread), Some(0));

        // Alice still has bob's message unread.
        let Ok(summaries) = store.conversations_for_user(&user("alice")).await else {
            panic!("list failed");
        };
        assert_eq!(summaries.first().map(|(_, unread)| *unread), Some(1));
    }

    #[tokio::test]
    async fn delete_conversation_removes_its_messages() {
        let store = MemoryStore::new();
        let Ok(conv) = store
            .get_or_create_conversation(&user("alice"), &user("bob"))
            .await
        else {
            panic!("conversation creation failed");
        };
        let Ok(message) = store
            .insert_message(conv.id, &user("alice"), "bye".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        assert_eq!(store.delete_conversation(conv.id).await.ok(), Some(true));
        assert_eq!(
            store.get_message(message.id).await.map(|m| m.is_none()).ok(),
            Some(true)
        );
        assert_eq!(store.delete_conversation(conv.id).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let _ = store
            .put_session(Session {
                token: "live".to_string(),
                user_id: user("u1"),
                access_token: "at".to_string(),
                refresh_token: "rt".to_string(),
                expires_at: now + Duration::hours(1),
                created_at: now,
            })
            .await;
        let _ = store
            .put_session(Session {
                token: "stale".to_string(),
                user_id: user("u2"),
                access_token: "at".to_string(),
                refresh_token: "rt".to_string(),
                expires_at: now - Duration::hours(1),
                created_at: now - Duration::hours(2),
            })
            .await;

        assert_eq!(store.delete_expired_sessions(now).await.ok(), Some(1));
        assert_eq!(
            store.get_session("live").await.map(|s| s.is_some()).ok(),
            Some(true)
        );
        assert_eq!(
            store.get_session("stale").await.map(|s| s.is_none()).ok(),
            Some(true)
        );
    }
}
