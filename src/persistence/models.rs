//! Row models bridging PostgreSQL and the domain types.
//!
//! Rows carry plain SQL-friendly types (`Uuid`, `String`, JSONB values)
//! and convert into domain types on the way out. A row that fails to
//! convert is corrupt stored data, reported as a persistence error —
//! never as a client-side validation error.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    Conversation, ConversationId, Game, InteractionId, InteractionStatus, Item, ItemDetails,
    ItemId, ListingId, ListingStatus, Message, MessageId, Reactions, Session, TradeInteraction,
    TradeListing, UserId,
};
use crate::error::MarketError;

/// Maps a row-conversion failure onto a persistence error.
fn corrupt(entity: &str, err: impl std::fmt::Display) -> MarketError {
    MarketError::Persistence(format!("corrupt {entity} row: {err}"))
}

/// A row from the `items` table.
#[derive(Debug, FromRow)]
pub struct ItemRow {
    /// Item id.
    pub id: Uuid,
    /// Game discriminator string.
    pub game: String,
    /// Display name.
    pub name: String,
    /// Section/category.
    pub section: Option<String>,
    /// Base trading value.
    pub value: i64,
    /// Image reference.
    pub image_url: Option<String>,
    /// Game-specific JSONB payload.
    pub details: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = MarketError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let game = Game::from_str(&row.game).map_err(|e| corrupt("item", e))?;
        let details: ItemDetails =
            serde_json::from_value(row.details).map_err(|e| corrupt("item", e))?;
        Ok(Self {
            id: ItemId::from_uuid(row.id),
            game,
            name: row.name,
            section: row.section,
            value: row.value,
            image_url: row.image_url,
            details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `trade_listings` table.
#[derive(Debug, FromRow)]
pub struct ListingRow {
    /// Listing id.
    pub id: Uuid,
    /// Owner identity key.
    pub owner_id: String,
    /// Game discriminator string.
    pub game: String,
    /// Offered item ids.
    pub offering: Vec<Uuid>,
    /// Requested item ids.
    pub requesting: Vec<Uuid>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Status discriminator string.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for TradeListing {
    type Error = MarketError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let game = Game::from_str(&row.game).map_err(|e| corrupt("listing", e))?;
        let status = ListingStatus::from_str(&row.status).map_err(|e| corrupt("listing", e))?;
        Ok(Self {
            id: ListingId::from_uuid(row.id),
            owner: UserId::new(row.owner_id),
            game,
            offering: row.offering.into_iter().map(ItemId::from_uuid).collect(),
            requesting: row.requesting.into_iter().map(ItemId::from_uuid).collect(),
            notes: row.notes,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `trade_interactions` table.
#[derive(Debug, FromRow)]
pub struct InteractionRow {
    /// Interaction id.
    pub id: Uuid,
    /// Target listing id.
    pub listing_id: Uuid,
    /// Initiator identity key.
    pub initiator_id: String,
    /// Optional free-text pitch.
    pub message: Option<String>,
    /// Status discriminator string.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status-change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for TradeInteraction {
    type Error = MarketError;

    fn try_from(row: InteractionRow) -> Result<Self, Self::Error> {
        let status =
            InteractionStatus::from_str(&row.status).map_err(|e| corrupt("interaction", e))?;
        Ok(Self {
            id: InteractionId::from_uuid(row.id),
            listing_id: ListingId::from_uuid(row.listing_id),
            initiator: UserId::new(row.initiator_id),
            message: row.message,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `conversations` table.
#[derive(Debug, FromRow)]
pub struct ConversationRow {
    /// Conversation id.
    pub id: Uuid,
    /// First participant in canonical order.
    pub participant_a: String,
    /// Second participant in canonical order.
    pub participant_b: String,
    /// Pinned flag.
    pub pinned: bool,
    /// Denormalized newest-message timestamp.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: ConversationId::from_uuid(row.id),
            participant_a: UserId::new(row.participant_a),
            participant_b: UserId::new(row.participant_b),
            pinned: row.pinned,
            last_message_at: row.last_message_at,
            created_at: row.created_at,
        }
    }
}

/// A `conversations` row joined with the requesting user's unread count.
#[derive(Debug, FromRow)]
pub struct ConversationUnreadRow {
    /// The conversation row, flattened.
    #[sqlx(flatten)]
    pub conversation: ConversationRow,
    /// Unread message count for the requesting user.
    pub unread: i64,
}

/// A row from the `messages` table.
#[derive(Debug, FromRow)]
pub struct MessageRow {
    /// Message id.
    pub id: Uuid,
    /// Owning conversation id.
    pub conversation_id: Uuid,
    /// Sender identity key.
    pub sender_id: String,
    /// Message text or tombstone.
    pub content: String,
    /// Reply target within the same conversation.
    pub reply_to: Option<Uuid>,
    /// Read flag.
    pub is_read: bool,
    /// Reaction map as JSONB.
    pub reactions: serde_json::Value,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Last-edit timestamp.
    pub edited_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = MarketError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let reactions: Reactions =
            serde_json::from_value(row.reactions).map_err(|e| corrupt("message", e))?;
        Ok(Self {
            id: MessageId::from_uuid(row.id),
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            sender: UserId::new(row.sender_id),
            content: row.content,
            reply_to: row.reply_to.map(MessageId::from_uuid),
            read: row.is_read,
            reactions,
            deleted_at: row.deleted_at,
            edited_at: row.edited_at,
            created_at: row.created_at,
        })
    }
}

/// A row from the `sessions` table.
#[derive(Debug, FromRow)]
pub struct SessionRow {
    /// Opaque session token.
    pub token: String,
    /// Authenticated user identity key.
    pub user_id: String,
    /// OAuth access token.
    pub access_token: String,
    /// OAuth refresh token.
    pub refresh_token: String,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            token: row.token,
            user_id: UserId::new(row.user_id),
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}
