//! Persistence layer: the [`Store`] trait and its two implementations.
//!
//! Services depend on `Arc<dyn Store>`. [`postgres::PgStore`] is the
//! production implementation; [`memory::MemoryStore`] backs tests and
//! database-free local development.
//!
//! Two invariants are enforced here rather than in the services, because
//! they need the store's serialization point:
//!
//! - the active-listing quota check-and-insert is serialized per owner
//!   (a per-owner advisory lock in PostgreSQL, the single mutex in the
//!   memory store), so concurrent creates cannot overshoot the limit;
//! - the message-insert / conversation-timestamp bump and the
//!   conversation-delete / message-delete pairs are atomic.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::domain::{
    Conversation, ConversationId, Game, InteractionId, InteractionStatus, Item, ItemId, ListingId,
    ListingPatch, Message, MessageCursor, MessageId, Reactions, Session, TradeInteraction,
    TradeListing, UserId,
};
use crate::error::MarketError;

/// Durable storage for the marketplace core.
///
/// Ownership-scoped mutations (`update_listing`, `delete_listing`) take
/// the acting owner and treat "not owned" exactly like "not found", so
/// callers cannot probe for existence.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    // ── Catalog ─────────────────────────────────────────────────────

    /// Inserts or replaces a catalog item.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn upsert_item(&self, item: Item) -> Result<Item, MarketError>;

    /// Fetches one catalog item.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, MarketError>;

    /// Deletes a catalog item, returning whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn delete_item(&self, id: ItemId) -> Result<bool, MarketError>;

    /// Lists catalog items, optionally filtered by game, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn items_by_game(&self, game: Option<Game>) -> Result<Vec<Item>, MarketError>;

    /// Resolves a batch of item references. Missing ids are simply
    /// absent from the result; order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn resolve_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, MarketError>;

    // ── Trade listings ──────────────────────────────────────────────

    /// Inserts a listing, enforcing the per-owner active-listing quota
    /// atomically with the insert.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::QuotaExceeded`] when the owner already has
    /// `max_active` active listings, or [`MarketError::Persistence`] on
    /// store failure.
    async fn insert_listing(
        &self,
        listing: TradeListing,
        max_active: u32,
    ) -> Result<TradeListing, MarketError>;

    /// Fetches one listing by id, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn get_listing(&self, id: ListingId) -> Result<Option<TradeListing>, MarketError>;

    /// Lists active listings, optionally filtered by game, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn active_listings(&self, game: Option<Game>) -> Result<Vec<TradeListing>, MarketError>;

    /// Lists all of one owner's listings (any status), newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn listings_by_owner(&self, owner: &UserId) -> Result<Vec<TradeListing>, MarketError>;

    /// Applies a partial update to a listing owned by `owner`. Returns
    /// `None` when the listing does not exist or is not owned by them.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn update_listing(
        &self,
        owner: &UserId,
        id: ListingId,
        patch: ListingPatch,
    ) -> Result<Option<TradeListing>, MarketError>;

    /// Deletes a listing owned by `owner`, cascading to its
    /// interactions. Returns `false` when not found or not owned.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn delete_listing(&self, owner: &UserId, id: ListingId) -> Result<bool, MarketError>;

    /// Deletes every listing created before `cutoff`, regardless of
    /// status, cascading to interactions. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn delete_listings_before(&self, cutoff: DateTime<Utc>) -> Result<u64, MarketError>;

    // ── Trade interactions ──────────────────────────────────────────

    /// Inserts a new interaction.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn insert_interaction(
        &self,
        interaction: TradeInteraction,
    ) -> Result<TradeInteraction, MarketError>;

    /// Fetches one interaction by id.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn get_interaction(
        &self,
        id: InteractionId,
    ) -> Result<Option<TradeInteraction>, MarketError>;

    /// Lists all interactions against a listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn interactions_for_listing(
        &self,
        listing: ListingId,
    ) -> Result<Vec<TradeInteraction>, MarketError>;

    /// Sets an interaction's status, bumping its update timestamp.
    /// Returns `None` when the interaction does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn set_interaction_status(
        &self,
        id: InteractionId,
        status: InteractionStatus,
    ) -> Result<Option<TradeInteraction>, MarketError>;

    // ── Conversations ───────────────────────────────────────────────

    /// Returns the conversation for the unordered pair, creating it on
    /// first use. Idempotent: both argument orders return the same row.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn get_or_create_conversation(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Conversation, MarketError>;

    /// Fetches one conversation by id.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, MarketError>;

    /// Lists every conversation containing `user`, with the count of
    /// unread messages not sent by them. Ordered pinned-first, then by
    /// `last_message_at` descending with never-messaged conversations
    /// last.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<(Conversation, u64)>, MarketError>;

    /// Sets the pinned flag. Returns `None` when the conversation does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn set_conversation_pinned(
        &self,
        id: ConversationId,
        pinned: bool,
    ) -> Result<Option<Conversation>, MarketError>;

    /// Deletes a conversation and all of its messages in one atomic
    /// operation. Returns `false` when the conversation does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, MarketError>;

    // ── Messages ────────────────────────────────────────────────────

    /// Inserts a message and advances the conversation's
    /// `last_message_at` in the same atomic operation. A message never
    /// exists without its conversation's timestamp covering it.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the conversation does not
    /// exist, [`MarketError::Validation`] when `reply_to` does not
    /// reference a message in the same conversation, or
    /// [`MarketError::Persistence`] on store failure.
    async fn insert_message(
        &self,
        conversation: ConversationId,
        sender: &UserId,
        content: String,
        reply_to: Option<MessageId>,
    ) -> Result<Message, MarketError>;

    /// Returns up to `limit` messages strictly older than the cursor
    /// (or the newest `limit` when no cursor is given), ordered newest
    /// first. Callers re-order ascending for display.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn messages_before(
        &self,
        conversation: ConversationId,
        limit: u32,
        cursor: Option<MessageCursor>,
    ) -> Result<Vec<Message>, MarketError>;

    /// Fetches one message by id.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, MarketError>;

    /// Replaces a message's content and stamps `edited_at`. Returns
    /// `None` when the message does not exist or is already deleted.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn edit_message(
        &self,
        id: MessageId,
        content: String,
    ) -> Result<Option<Message>, MarketError>;

    /// Soft-deletes a message: overwrites content with the tombstone and
    /// stamps `deleted_at`. Idempotent; the row is retained so replies
    /// stay valid. Returns `None` when the message does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn tombstone_message(&self, id: MessageId) -> Result<Option<Message>, MarketError>;

    /// Replaces a message's reaction map wholesale (last writer wins).
    /// Returns `None` when the message does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn set_reactions(
        &self,
        id: MessageId,
        reactions: Reactions,
    ) -> Result<Option<Message>, MarketError>;

    /// Marks every message in the conversation not sent by `reader` as
    /// read. Idempotent. Returns the number of rows newly marked.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn mark_read(
        &self,
        conversation: ConversationId,
        reader: &UserId,
    ) -> Result<u64, MarketError>;

    // ── Sessions ────────────────────────────────────────────────────

    /// Inserts or refreshes a session.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn put_session(&self, session: Session) -> Result<(), MarketError>;

    /// Fetches a session by token, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn get_session(&self, token: &str) -> Result<Option<Session>, MarketError>;

    /// Deletes a session, returning whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn delete_session(&self, token: &str) -> Result<bool, MarketError>;

    /// Deletes every session expiring at or before `now`. Returns the
    /// number deleted.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, MarketError>;
}
