//! PostgreSQL implementation of the persistence layer.
//!
//! Multi-statement mutations run inside explicit transactions. The
//! listing quota check-and-insert additionally takes a per-owner
//! advisory lock so two concurrent creates from the same user cannot
//! both pass the count check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::Store;
use super::models::{
    ConversationRow, ConversationUnreadRow, InteractionRow, ItemRow, ListingRow, MessageRow,
    SessionRow,
};
use crate::config::MarketConfig;
use crate::domain::{
    Conversation, ConversationId, Game, InteractionId, InteractionStatus, Item, ItemId, ListingId,
    ListingPatch, ListingStatus, Message, MessageCursor, MessageId, Reactions, Session, TOMBSTONE,
    TradeInteraction, TradeListing, UserId, canonical_pair,
};
use crate::error::MarketError;

const ITEM_COLS: &str = "id, game, name, section, value, image_url, details, created_at, updated_at";
const LISTING_COLS: &str =
    "id, owner_id, game, offering, requesting, notes, status, created_at, updated_at";
const INTERACTION_COLS: &str =
    "id, listing_id, initiator_id, message, status, created_at, updated_at";
const CONVERSATION_COLS: &str =
    "id, participant_a, participant_b, pinned, last_message_at, created_at";
const MESSAGE_COLS: &str = "id, conversation_id, sender_id, content, reply_to, is_read, reactions, deleted_at, edited_at, created_at";
const SESSION_COLS: &str =
    "token, user_id, access_token, refresh_token, expires_at, created_at";

fn db_err(e: sqlx::Error) -> MarketError {
    MarketError::Persistence(e.to_string())
}

fn uuid_vec(ids: &[ItemId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.as_uuid()).collect()
}

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to PostgreSQL using the given configuration and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] if the pool cannot be
    /// established or a migration fails.
    pub async fn connect(config: &MarketConfig) -> Result<Self, MarketError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await
            .map_err(db_err)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| MarketError::Persistence(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_item(&self, item: Item) -> Result<Item, MarketError> {
        let details = serde_json::to_value(&item.details)
            .map_err(|e| MarketError::Internal(format!("serialize item details: {e}")))?;
        sqlx::query(
            "INSERT INTO items (id, game, name, section, value, image_url, details, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
               game = EXCLUDED.game, name = EXCLUDED.name, section = EXCLUDED.section, \
               value = EXCLUDED.value, image_url = EXCLUDED.image_url, \
               details = EXCLUDED.details, updated_at = EXCLUDED.updated_at",
        )
        .bind(item.id.as_uuid())
        .bind(item.game.as_str())
        .bind(&item.name)
        .bind(&item.section)
        .bind(item.value)
        .bind(&item.image_url)
        .bind(details)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, MarketError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLS} FROM items WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Item::try_from).transpose()
    }

    async fn delete_item(&self, id: ItemId) -> Result<bool, MarketError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn items_by_game(&self, game: Option<Game>) -> Result<Vec<Item>, MarketError> {
        let rows = if let Some(game) = game {
            sqlx::query_as::<_, ItemRow>(&format!(
                "SELECT {ITEM_COLS} FROM items WHERE game = $1 ORDER BY name ASC"
            ))
            .bind(game.as_str())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, ItemRow>(&format!(
                "SELECT {ITEM_COLS} FROM items ORDER BY name ASC"
            ))
            .fetch_all(&self.pool)
            .await
        }
        .map_err(db_err)?;
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn resolve_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, MarketError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLS} FROM items WHERE id = ANY($1)"
        ))
        .bind(uuid_vec(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn insert_listing(
        &self,
        listing: TradeListing,
        max_active: u32,
    ) -> Result<TradeListing, MarketError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Serialize the count-and-insert per owner; without this, two
        // concurrent creates can both observe count = max - 1.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
            .bind(listing.owner.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM trade_listings WHERE owner_id = $1 AND status = 'active'",
        )
        .bind(listing.owner.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        if listing.status == ListingStatus::Active && active >= i64::from(max_active) {
            return Err(MarketError::QuotaExceeded { limit: max_active });
        }

        sqlx::query(
            "INSERT INTO trade_listings (id, owner_id, game, offering, requesting, notes, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(listing.id.as_uuid())
        .bind(listing.owner.as_str())
        .bind(listing.game.as_str())
        .bind(uuid_vec(&listing.offering))
        .bind(uuid_vec(&listing.requesting))
        .bind(&listing.notes)
        .bind(listing.status.as_str())
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(listing)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Option<TradeListing>, MarketError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLS} FROM trade_listings WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(TradeListing::try_from).transpose()
    }

    async fn active_listings(&self, game: Option<Game>) -> Result<Vec<TradeListing>, MarketError> {
        let rows = if let Some(game) = game {
            sqlx::query_as::<_, ListingRow>(&format!(
                "SELECT {LISTING_COLS} FROM trade_listings \
                 WHERE status = 'active' AND game = $1 ORDER BY created_at DESC, id DESC"
            ))
            .bind(game.as_str())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, ListingRow>(&format!(
                "SELECT {LISTING_COLS} FROM trade_listings \
                 WHERE status = 'active' ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(&self.pool)
            .await
        }
        .map_err(db_err)?;
        rows.into_iter().map(TradeListing::try_from).collect()
    }

    async fn listings_by_owner(&self, owner: &UserId) -> Result<Vec<TradeListing>, MarketError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLS} FROM trade_listings \
             WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TradeListing::try_from).collect()
    }

    async fn update_listing(
        &self,
        owner: &UserId,
        id: ListingId,
        patch: ListingPatch,
    ) -> Result<Option<TradeListing>, MarketError> {
        let set_notes = patch.notes.is_some();
        let notes = patch.notes.flatten();
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "UPDATE trade_listings SET \
               status = COALESCE($3, status), \
               offering = COALESCE($4, offering), \
               requesting = COALESCE($5, requesting), \
               notes = CASE WHEN $6 THEN $7 ELSE notes END, \
               updated_at = $8 \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {LISTING_COLS}"
        ))
        .bind(id.as_uuid())
        .bind(owner.as_str())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.offering.as_deref().map(uuid_vec))
        .bind(patch.requesting.as_deref().map(uuid_vec))
        .bind(set_notes)
        .bind(notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(TradeListing::try_from).transpose()
    }

    async fn delete_listing(&self, owner: &UserId, id: ListingId) -> Result<bool, MarketError> {
        // Interactions go with the listing via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM trade_listings WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_listings_before(&self, cutoff: DateTime<Utc>) -> Result<u64, MarketError> {
        let result = sqlx::query("DELETE FROM trade_listings WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn insert_interaction(
        &self,
        interaction: TradeInteraction,
    ) -> Result<TradeInteraction, MarketError> {
        sqlx::query(
            "INSERT INTO trade_interactions (id, listing_id, initiator_id, message, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(interaction.id.as_uuid())
        .bind(interaction.listing_id.as_uuid())
        .bind(interaction.initiator.as_str())
        .bind(&interaction.message)
        .bind(interaction.status.as_str())
        .bind(interaction.created_at)
        .bind(interaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(interaction)
    }

    async fn get_interaction(
        &self,
        id: InteractionId,
    ) -> Result<Option<TradeInteraction>, MarketError> {
        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            "SELECT {INTERACTION_COLS} FROM trade_interactions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(TradeInteraction::try_from).transpose()
    }

    async fn interactions_for_listing(
        &self,
        listing: ListingId,
    ) -> Result<Vec<TradeInteraction>, MarketError> {
        let rows = sqlx::query_as::<_, InteractionRow>(&format!(
            "SELECT {INTERACTION_COLS} FROM trade_interactions \
             WHERE listing_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(listing.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TradeInteraction::try_from).collect()
    }

    async fn set_interaction_status(
        &self,
        id: InteractionId,
        status: InteractionStatus,
    ) -> Result<Option<TradeInteraction>, MarketError> {
        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            "UPDATE trade_interactions SET status = $2, updated_at = $3 \
             WHERE id = $1 RETURNING {INTERACTION_COLS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(TradeInteraction::try_from).transpose()
    }

    async fn get_or_create_conversation(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Conversation, MarketError> {
        let (first, second) = canonical_pair(a.clone(), b.clone());

        let existing = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLS} FROM conversations \
             WHERE participant_a = $1 AND participant_b = $2"
        ))
        .bind(first.as_str())
        .bind(second.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        if let Some(row) = existing {
            return Ok(row.into());
        }

        let conversation = Conversation::new(first.clone(), second.clone());
        let inserted = sqlx::query(
            "INSERT INTO conversations (id, participant_a, participant_b, pinned, last_message_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (participant_a, participant_b) DO NOTHING",
        )
        .bind(conversation.id.as_uuid())
        .bind(conversation.participant_a.as_str())
        .bind(conversation.participant_b.as_str())
        .bind(conversation.pinned)
        .bind(conversation.last_message_at)
        .bind(conversation.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if inserted.rows_affected() > 0 {
            return Ok(conversation);
        }

        // Lost the race to a concurrent create; the unique pair index
        // guarantees the winner's row is the one to return.
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLS} FROM conversations \
             WHERE participant_a = $1 AND participant_b = $2"
        ))
        .bind(first.as_str())
        .bind(second.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, MarketError> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLS} FROM conversations WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Conversation::from))
    }

    async fn conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<(Conversation, u64)>, MarketError> {
        let rows = sqlx::query_as::<_, ConversationUnreadRow>(
            "SELECT c.id, c.participant_a, c.participant_b, c.pinned, c.last_message_at, c.created_at, \
               (SELECT COUNT(*) FROM messages m \
                  WHERE m.conversation_id = c.id AND m.sender_id <> $1 AND NOT m.is_read) AS unread \
             FROM conversations c \
             WHERE c.participant_a = $1 OR c.participant_b = $1 \
             ORDER BY c.pinned DESC, c.last_message_at DESC NULLS LAST, c.created_at DESC",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let unread = u64::try_from(row.unread).unwrap_or(0);
                (Conversation::from(row.conversation), unread)
            })
            .collect())
    }

    async fn set_conversation_pinned(
        &self,
        id: ConversationId,
        pinned: bool,
    ) -> Result<Option<Conversation>, MarketError> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "UPDATE conversations SET pinned = $2 WHERE id = $1 RETURNING {CONVERSATION_COLS}"
        ))
        .bind(id.as_uuid())
        .bind(pinned)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Conversation::from))
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, MarketError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_message(
        &self,
        conversation: ConversationId,
        sender: &UserId,
        content: String,
        reply_to: Option<MessageId>,
    ) -> Result<Message, MarketError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Lock the conversation row: serializes the timestamp bump and
        // pins the thread against concurrent deletion.
        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM conversations WHERE id = $1 FOR UPDATE")
                .bind(conversation.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
        if exists.is_none() {
            return Err(MarketError::NotFound("conversation"));
        }

        if let Some(reply) = reply_to {
            let thread: Option<Uuid> =
                sqlx::query_scalar("SELECT conversation_id FROM messages WHERE id = $1")
                    .bind(reply.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_err)?;
            if thread != Some(conversation.as_uuid()) {
                return Err(MarketError::Validation(
                    "reply target not found in this conversation".to_string(),
                ));
            }
        }

        let message = Message::new(conversation, sender.clone(), content, reply_to);
        let reactions = serde_json::to_value(&message.reactions)
            .map_err(|e| MarketError::Internal(format!("serialize reactions: {e}")))?;

        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, content, reply_to, is_read, reactions, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(message.id.as_uuid())
        .bind(message.conversation_id.as_uuid())
        .bind(message.sender.as_str())
        .bind(&message.content)
        .bind(message.reply_to.map(|id| id.as_uuid()))
        .bind(message.read)
        .bind(reactions)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "UPDATE conversations SET last_message_at = $2 \
             WHERE id = $1 AND (last_message_at IS NULL OR last_message_at < $2)",
        )
        .bind(conversation.as_uuid())
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(message)
    }

    async fn messages_before(
        &self,
        conversation: ConversationId,
        limit: u32,
        cursor: Option<MessageCursor>,
    ) -> Result<Vec<Message>, MarketError> {
        let limit = i64::from(limit);
        let rows = match cursor {
            None => {
                sqlx::query_as::<_, MessageRow>(&format!(
                    "SELECT {MESSAGE_COLS} FROM messages WHERE conversation_id = $1 \
                     ORDER BY created_at DESC, id DESC LIMIT $2"
                ))
                .bind(conversation.as_uuid())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            Some(MessageCursor {
                before,
                before_id: None,
            }) => {
                sqlx::query_as::<_, MessageRow>(&format!(
                    "SELECT {MESSAGE_COLS} FROM messages \
                     WHERE conversation_id = $1 AND created_at < $2 \
                     ORDER BY created_at DESC, id DESC LIMIT $3"
                ))
                .bind(conversation.as_uuid())
                .bind(before)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            Some(MessageCursor {
                before,
                before_id: Some(id),
            }) => {
                sqlx::query_as::<_, MessageRow>(&format!(
                    "SELECT {MESSAGE_COLS} FROM messages \
                     WHERE conversation_id = $1 AND (created_at, id) < ($2, $3) \
                     ORDER BY created_at DESC, id DESC LIMIT $4"
                ))
                .bind(conversation.as_uuid())
                .bind(before)
                .bind(id.as_uuid())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;
        rows.into_iter().map(Message::try_from).collect()
    }

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, MarketError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLS} FROM messages WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Message::try_from).transpose()
    }

    async fn edit_message(
        &self,
        id: MessageId,
        content: String,
    ) -> Result<Option<Message>, MarketError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "UPDATE messages SET content = $2, edited_at = $3 \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {MESSAGE_COLS}"
        ))
        .bind(id.as_uuid())
        .bind(content)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Message::try_from).transpose()
    }

    async fn tombstone_message(&self, id: MessageId) -> Result<Option<Message>, MarketError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "UPDATE messages SET content = $2, deleted_at = COALESCE(deleted_at, $3) \
             WHERE id = $1 RETURNING {MESSAGE_COLS}"
        ))
        .bind(id.as_uuid())
        .bind(TOMBSTONE)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Message::try_from).transpose()
    }

    async fn set_reactions(
        &self,
        id: MessageId,
        reactions: Reactions,
    ) -> Result<Option<Message>, MarketError> {
        let value = serde_json::to_value(&reactions)
            .map_err(|e| MarketError::Internal(format!("serialize reactions: {e}")))?;
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "UPDATE messages SET reactions = $2 WHERE id = $1 RETURNING {MESSAGE_COLS}"
        ))
        .bind(id.as_uuid())
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Message::try_from).transpose()
    }

    async fn mark_read(
        &self,
        conversation: ConversationId,
        reader: &UserId,
    ) -> Result<u64, MarketError> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE \
             WHERE conversation_id = $1 AND sender_id <> $2 AND NOT is_read",
        )
        .bind(conversation.as_uuid())
        .bind(reader.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn put_session(&self, session: Session) -> Result<(), MarketError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, access_token, refresh_token, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (token) DO UPDATE SET \
               access_token = EXCLUDED.access_token, \
               refresh_token = EXCLUDED.refresh_token, \
               expires_at = EXCLUDED.expires_at",
        )
        .bind(&session.token)
        .bind(session.user_id.as_str())
        .bind(&session.access_token)
        .bind(&session.refresh_token)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, MarketError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLS} FROM sessions WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Session::from))
    }

    async fn delete_session(&self, token: &str) -> Result<bool, MarketError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, MarketError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}
