//! Two-party conversations and their ordered message threads.
//!
//! A conversation is unique per unordered pair of users. Uniqueness is
//! enforced by storing the participants in canonical (lexicographic)
//! order and putting a unique index on the ordered pair; see
//! [`canonical_pair`].
//!
//! Messages are totally ordered by `(created_at, id)` within their
//! conversation. The id tie-break keeps pagination stable when two
//! near-simultaneous messages land on the same timestamp.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationId, MessageId, UserId};

/// Content a deleted message's row is rewritten to. The row itself is
/// retained so replies that reference it stay valid.
pub const TOMBSTONE: &str = "[message deleted]";

/// Reaction map on a message: emoji → set of users who reacted with it.
///
/// Replaced wholesale on update (last-writer-wins). Concurrent reactors
/// racing the replacement may lose updates; that is the documented
/// contract, not a merge to be added later.
pub type Reactions = BTreeMap<String, BTreeSet<UserId>>;

/// Orders two participants canonically (lexicographically ascending).
///
/// `canonical_pair(a, b)` and `canonical_pair(b, a)` return the same
/// tuple, which is what makes get-or-create idempotent for the unordered
/// pair.
#[must_use]
pub fn canonical_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// A unique pairing of two users holding one message thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// First participant in canonical order.
    pub participant_a: UserId,
    /// Second participant in canonical order.
    pub participant_b: UserId,
    /// Whether the conversation is pinned to the top of the list.
    pub pinned: bool,
    /// Timestamp of the newest message, denormalized for ordering.
    /// `None` until the first message arrives.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates a new conversation between two users, canonicalizing the
    /// participant order.
    #[must_use]
    pub fn new(a: UserId, b: UserId) -> Self {
        let (participant_a, participant_b) = canonical_pair(a, b);
        Self {
            id: ConversationId::new(),
            participant_a,
            participant_b,
            pinned: false,
            last_message_at: None,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if `user` is one of the two participants.
    #[must_use]
    pub fn has_participant(&self, user: &UserId) -> bool {
        &self.participant_a == user || &self.participant_b == user
    }

    /// Returns the participant that is not `user`, or `None` if `user`
    /// is not in this conversation.
    #[must_use]
    pub fn other_participant(&self, user: &UserId) -> Option<&UserId> {
        if &self.participant_a == user {
            Some(&self.participant_b)
        } else if &self.participant_b == user {
            Some(&self.participant_a)
        } else {
            None
        }
    }
}

/// One message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier; tie-break for pagination cursors.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// User who sent the message.
    pub sender: UserId,
    /// Message text, or [`TOMBSTONE`] once deleted.
    pub content: String,
    /// Message this one replies to. Always within the same conversation.
    pub reply_to: Option<MessageId>,
    /// Whether the recipient has read the message.
    pub read: bool,
    /// Reaction map, replaced wholesale on update.
    pub reactions: Reactions,
    /// Set when the message was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set when the content was last edited.
    pub edited_at: Option<DateTime<Utc>>,
    /// Creation timestamp; primary sort key within the conversation.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new unread message with fresh timestamps and no
    /// reactions.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        sender: UserId,
        content: String,
        reply_to: Option<MessageId>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            sender,
            content,
            reply_to,
            read: false,
            reactions: Reactions::new(),
            deleted_at: None,
            edited_at: None,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` once the message has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the pagination cursor pointing just before this message.
    #[must_use]
    pub const fn cursor(&self) -> MessageCursor {
        MessageCursor {
            before: self.created_at,
            before_id: Some(self.id),
        }
    }
}

/// Composite pagination cursor for message threads.
///
/// With `before_id` set, the page contains messages strictly older than
/// `(before, before_id)` under the `(created_at, id)` ordering; without
/// it, strictly older than the timestamp alone. Offset pagination is
/// deliberately absent: cursors do not drift under concurrent inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCursor {
    /// Exclusive upper bound on `created_at`.
    pub before: DateTime<Utc>,
    /// Id tie-break for messages sharing the boundary timestamp.
    pub before_id: Option<MessageId>,
}

/// A conversation as shown in a user's inbox list.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    /// The conversation row.
    pub conversation: Conversation,
    /// The participant that is not the requesting user.
    pub other: UserId,
    /// Messages not sent by the requesting user and not yet read.
    pub unread: u64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_insensitive() {
        let a = UserId::new("aaa");
        let b = UserId::new("bbb");
        assert_eq!(
            canonical_pair(a.clone(), b.clone()),
            canonical_pair(b, a.clone())
        );
    }

    #[test]
    fn new_conversation_canonicalizes_participants() {
        let conv = Conversation::new(UserId::new("zzz"), UserId::new("aaa"));
        assert_eq!(conv.participant_a, UserId::new("aaa"));
        assert_eq!(conv.participant_b, UserId::new("zzz"));
        assert!(conv.last_message_at.is_none());
    }

    #[test]
    fn other_participant_resolves_both_sides() {
        let a = UserId::new("aaa");
        let b = UserId::new("bbb");
        let conv = Conversation::new(a.clone(), b.clone());
        assert_eq!(conv.other_participant(&a), Some(&b));
        assert_eq!(conv.other_participant(&b), Some(&a));
        assert_eq!(conv.other_participant(&UserId::new("ccc")), None);
    }

    #[test]
    fn reactions_serialize_as_emoji_keyed_map() {
        let mut reactions = Reactions::new();
        reactions.insert(
            "👍".to_string(),
            BTreeSet::from([UserId::new("u1"), UserId::new("u2")]),
        );
        let json = serde_json::to_value(&reactions).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let Some(users) = json.get("👍").and_then(|v| v.as_array()) else {
            panic!("missing emoji key");
        };
        assert_eq!(users.len(), 2);
    }
}
