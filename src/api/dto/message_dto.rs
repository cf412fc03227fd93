//! Conversation and message DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::ProfileDto;
use crate::domain::{Conversation, Message, Reactions};

/// Request body for `POST /conversations/{user_id}/messages`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Message text.
    pub content: String,
    /// Message id this one replies to; must be in the same
    /// conversation.
    #[serde(default)]
    pub reply_to: Option<Uuid>,
}

/// Request body for `PATCH /messages/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditMessageRequest {
    /// Replacement text.
    pub content: String,
}

/// Request body for `PUT /messages/{id}/reactions`. Replaces the whole
/// map; last writer wins.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetReactionsRequest {
    /// Emoji → reacting user keys.
    #[schema(value_type = Object)]
    pub reactions: Reactions,
}

/// Request body for `POST /conversations/{id}/pin`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PinRequest {
    /// Desired pinned state.
    pub pinned: bool,
}

/// Query parameters for `GET /conversations/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesQuery {
    /// Page size; clamped to the configured maximum.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Return messages strictly older than this timestamp.
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
    /// Tie-break id for messages sharing the boundary timestamp.
    #[serde(default)]
    pub before_id: Option<Uuid>,
}

/// One message in a thread.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDto {
    /// Message identifier.
    pub id: Uuid,
    /// Owning conversation identifier.
    pub conversation_id: Uuid,
    /// Sender identity key.
    pub sender_id: String,
    /// Message text, or the tombstone once deleted.
    pub content: String,
    /// Reply target within the same conversation.
    pub reply_to: Option<Uuid>,
    /// Whether the recipient has read the message.
    pub read: bool,
    /// Emoji → reacting user keys.
    #[schema(value_type = Object)]
    pub reactions: Reactions,
    /// Whether the message was soft-deleted.
    pub deleted: bool,
    /// Last-edit timestamp.
    pub edited_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.as_uuid(),
            conversation_id: message.conversation_id.as_uuid(),
            sender_id: message.sender.to_string(),
            content: message.content,
            reply_to: message.reply_to.map(|id| id.as_uuid()),
            read: message.read,
            reactions: message.reactions,
            deleted: message.deleted_at.is_some(),
            edited_at: message.edited_at,
            created_at: message.created_at,
        }
    }
}

/// A conversation row as embedded in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationDto {
    /// Conversation identifier.
    pub id: Uuid,
    /// Both participant identity keys, in canonical order.
    pub participants: [String; 2],
    /// Pinned flag.
    pub pinned: bool,
    /// Timestamp of the newest message.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationDto {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id.as_uuid(),
            participants: [
                conversation.participant_a.to_string(),
                conversation.participant_b.to_string(),
            ],
            pinned: conversation.pinned,
            last_message_at: conversation.last_message_at,
            created_at: conversation.created_at,
        }
    }
}

/// Response body for `POST /conversations/{user_id}/messages`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SendMessageResponse {
    /// The (possibly just-created) conversation.
    pub conversation: ConversationDto,
    /// The stored message.
    pub message: MessageDto,
}

/// One inbox entry for `GET /conversations`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationSummaryDto {
    /// Conversation identifier.
    pub id: Uuid,
    /// The other participant's public profile.
    pub other: ProfileDto,
    /// Pinned flag.
    pub pinned: bool,
    /// Timestamp of the newest message.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Messages not sent by the requesting user and not yet read.
    pub unread: u64,
}

/// Response body for `POST /conversations/{id}/read`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    /// Number of messages newly marked as read.
    pub marked: u64,
}
