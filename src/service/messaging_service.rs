//! Messaging rules: conversations, threads, read-state, reactions.

use std::sync::Arc;

use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Message, MessageCursor, MessageId,
    Reactions, UserId,
};
use crate::error::MarketError;
use crate::persistence::Store;

/// Upper bound on message content, in characters.
pub const MAX_CONTENT_LEN: usize = 2000;

/// Hard ceiling on one page of messages.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Maximum distinct emoji on one message's reaction map.
pub const MAX_REACTION_KEYS: usize = 16;

/// Business rules for direct messaging between traders.
///
/// Every operation that names a conversation requires the actor to be a
/// participant; outsiders see not-found, the same as a missing id.
#[derive(Debug)]
pub struct MessagingService {
    store: Arc<dyn Store>,
    page_limit: u32,
}

impl MessagingService {
    /// Creates the service with the configured default page size.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, page_limit: u32) -> Self {
        Self {
            store,
            page_limit: page_limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Sends a message from `sender` to `recipient`, creating their
    /// conversation on first contact. The insert and the conversation
    /// timestamp bump are one atomic store operation.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] for self-messaging, empty or
    /// oversized content, or a reply target outside the conversation;
    /// [`MarketError::Persistence`] on store failure.
    pub async fn send_to_user(
        &self,
        sender: &UserId,
        recipient: &UserId,
        content: String,
        reply_to: Option<MessageId>,
    ) -> Result<(Conversation, Message), MarketError> {
        if sender == recipient {
            return Err(MarketError::Validation(
                "cannot start a conversation with yourself".to_string(),
            ));
        }
        let content = validate_content(content)?;

        let conversation = self
            .store
            .get_or_create_conversation(sender, recipient)
            .await?;
        let message = self
            .store
            .insert_message(conversation.id, sender, content, reply_to)
            .await?;
        tracing::debug!(
            conversation_id = %conversation.id,
            message_id = %message.id,
            "message sent"
        );
        Ok((conversation, message))
    }

    /// Lists `actor`'s inbox: every conversation they are in, with the
    /// other participant and their unread count, pinned first and newest
    /// activity next.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn conversations(
        &self,
        actor: &UserId,
    ) -> Result<Vec<ConversationSummary>, MarketError> {
        let rows = self.store.conversations_for_user(actor).await?;
        Ok(rows
            .into_iter()
            .map(|(conversation, unread)| {
                let other = conversation
                    .other_participant(actor)
                    .cloned()
                    .unwrap_or_else(|| actor.clone());
                ConversationSummary {
                    conversation,
                    other,
                    unread,
                }
            })
            .collect())
    }

    /// Returns one page of a thread in ascending order.
    ///
    /// Without a cursor: the newest `limit` messages. With one: the
    /// `limit` messages strictly older than it. The store queries
    /// descending; this re-orders ascending for display.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the conversation does not
    /// exist or `actor` is not a participant, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn fetch_messages(
        &self,
        actor: &UserId,
        conversation: ConversationId,
        limit: Option<u32>,
        cursor: Option<MessageCursor>,
    ) -> Result<Vec<Message>, MarketError> {
        self.participant_conversation(actor, conversation).await?;
        let limit = limit.unwrap_or(self.page_limit).clamp(1, MAX_PAGE_LIMIT);
        let mut messages = self.store.messages_before(conversation, limit, cursor).await?;
        messages.reverse();
        Ok(messages)
    }

    /// Replaces the content of a message `actor` sent, stamping
    /// `edited_at`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the message does not exist
    /// or `actor` is not its sender, [`MarketError::Validation`] for a
    /// deleted message or invalid content, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn edit_message(
        &self,
        actor: &UserId,
        id: MessageId,
        content: String,
    ) -> Result<Message, MarketError> {
        let message = self.sender_message(actor, id).await?;
        if message.is_deleted() {
            return Err(MarketError::Validation(
                "cannot edit a deleted message".to_string(),
            ));
        }
        let content = validate_content(content)?;
        self.store
            .edit_message(id, content)
            .await?
            .ok_or(MarketError::NotFound("message"))
    }

    /// Soft-deletes a message `actor` sent: the row stays, its content
    /// becomes the tombstone. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the message does not exist
    /// or `actor` is not its sender, or [`MarketError::Persistence`] on
    /// store failure.
    pub async fn delete_message(
        &self,
        actor: &UserId,
        id: MessageId,
    ) -> Result<Message, MarketError> {
        self.sender_message(actor, id).await?;
        self.store
            .tombstone_message(id)
            .await?
            .ok_or(MarketError::NotFound("message"))
    }

    /// Replaces a message's reaction map wholesale. Last writer wins;
    /// racing reactors may lose updates, which is the documented
    /// contract.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the message does not exist
    /// or `actor` is not in its conversation,
    /// [`MarketError::Validation`] for an oversized map, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn set_reactions(
        &self,
        actor: &UserId,
        id: MessageId,
        reactions: Reactions,
    ) -> Result<Message, MarketError> {
        let message = self
            .store
            .get_message(id)
            .await?
            .ok_or(MarketError::NotFound("message"))?;
        self.participant_conversation(actor, message.conversation_id)
            .await?;
        if reactions.len() > MAX_REACTION_KEYS {
            return Err(MarketError::Validation(format!(
                "at most {MAX_REACTION_KEYS} distinct reactions per message"
            )));
        }
        self.store
            .set_reactions(id, reactions)
            .await?
            .ok_or(MarketError::NotFound("message"))
    }

    /// Marks everything the other side sent in a conversation as read.
    /// Idempotent; returns the number of newly marked messages.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the conversation does not
    /// exist or `actor` is not a participant, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn mark_read(
        &self,
        actor: &UserId,
        conversation: ConversationId,
    ) -> Result<u64, MarketError> {
        self.participant_conversation(actor, conversation).await?;
        self.store.mark_read(conversation, actor).await
    }

    /// Pins or unpins a conversation in `actor`'s inbox.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] when the conversation does not
    /// exist or `actor` is not a participant, or
    /// [`MarketError::Persistence`] on store failure.
    pub async fn set_pinned(
        &self,
        actor: &UserId,
        conversation: ConversationId,
        pinned: bool,
    ) -> Result<Conversation, MarketError> {
        self.participant_conversation(actor, conversation).await?;
        self.store
            .set_conversation_pinned(conversation, pinned)
            .await?
            .ok_or(MarketError::NotFound("conversation"))
    }

    /// Deletes a conversation and its messages atomically. Returns
    /// `false` when the conversation does not exist or `actor` is not a
    /// participant.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Persistence`] on store failure.
    pub async fn delete_conversation(
        &self,
        actor: &UserId,
        conversation: ConversationId,
    ) -> Result<bool, MarketError> {
        let Some(existing) = self.store.get_conversation(conversation).await? else {
            return Ok(false);
        };
        if !existing.has_participant(actor) {
            return Ok(false);
        }
        let deleted = self.store.delete_conversation(conversation).await?;
        if deleted {
            tracing::info!(conversation_id = %conversation, "conversation deleted");
        }
        Ok(deleted)
    }

    /// Fetches a conversation and requires `actor` to be a participant.
    async fn participant_conversation(
        &self,
        actor: &UserId,
        id: ConversationId,
    ) -> Result<Conversation, MarketError> {
        let conversation = self
            .store
            .get_conversation(id)
            .await?
            .ok_or(MarketError::NotFound("conversation"))?;
        if !conversation.has_participant(actor) {
            return Err(MarketError::NotFound("conversation"));
        }
        Ok(conversation)
    }

    /// Fetches a message and requires `actor` to be its sender.
    async fn sender_message(
        &self,
        actor: &UserId,
        id: MessageId,
    ) -> Result<Message, MarketError> {
        let message = self
            .store
            .get_message(id)
            .await?
            .ok_or(MarketError::NotFound("message"))?;
        if &message.sender != actor {
            return Err(MarketError::NotFound("message"));
        }
        Ok(message)
    }
}

fn validate_content(content: String) -> Result<String, MarketError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(MarketError::Validation(
            "message content must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_CONTENT_LEN {
        return Err(MarketError::Validation(format!(
            "message content may hold at most {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::domain::TOMBSTONE;
    use crate::persistence::MemoryStore;

    fn service() -> MessagingService {
        MessagingService::new(Arc::new(MemoryStore::new()), 50)
    }

    fn user(key: &str) -> UserId {
        UserId::new(key)
    }

    #[tokio::test]
    async fn sending_creates_one_conversation_per_pair() {
        let svc = service();
        let Ok((conv_one, _)) = svc
            .send_to_user(&user("alice"), &user("bob"), "hi".to_string(), None)
            .await
        else {
            panic!("send failed");
        };
        let Ok((conv_two, _)) = svc
            .send_to_user(&user("bob"), &user("alice"), "hey".to_string(), None)
            .await
        else {
            panic!("send failed");
        };
        assert_eq!(conv_one.id, conv_two.id);
    }

    #[tokio::test]
    async fn self_messaging_is_rejected() {
        let svc = service();
        let result = svc
            .send_to_user(&user("alice"), &user("alice"), "echo".to_string(), None)
            .await;
        assert!(matches!(result, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn inbox_shows_unread_and_fresh_last_message_time() {
        let svc = service();
        let Ok((_, message)) = svc
            .send_to_user(&user("alice"), &user("bob"), "ping".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        let Ok(inbox) = svc.conversations(&user("alice")).await else {
            panic!("inbox failed");
        };
        let Some(summary) = inbox.first() else {
            panic!("empty inbox");
        };
        assert_eq!(summary.other, user("bob"));
        assert_eq!(summary.unread, 0, "own messages are not unread");
        assert!(
            summary
                .conversation
                .last_message_at
                .is_some_and(|t| t >= message.created_at)
        );

        let Ok(inbox) = svc.conversations(&user("bob")).await else {
            panic!("inbox failed");
        };
        assert_eq!(inbox.first().map(|s| s.unread), Some(1));
    }

    #[tokio::test]
    async fn ten_messages_paginate_into_two_clean_pages() {
        let svc = service();
        let alice = user("alice");
        let bob = user("bob");
        let mut sent = Vec::new();
        for i in 0..10 {
            let Ok((_, m)) = svc
                .send_to_user(&alice, &bob, format!("m{i}"), None)
                .await
            else {
                panic!("send failed");
            };
            sent.push(m.id);
        }
        let Ok(inbox) = svc.conversations(&alice).await else {
            panic!("inbox failed");
        };
        let Some(summary) = inbox.first() else {
            panic!("empty inbox");
        };
        let conv = summary.conversation.id;

        let Ok(first_page) = svc.fetch_messages(&alice, conv, Some(5), None).await else {
            panic!("fetch failed");
        };
        assert_eq!(first_page.len(), 5);
        let Some(oldest) = first_page.first() else {
            panic!("empty page");
        };

        let Ok(second_page) = svc
            .fetch_messages(&alice, conv, Some(5), Some(oldest.cursor()))
            .await
        else {
            panic!("fetch failed");
        };
        assert_eq!(second_page.len(), 5);

        let assembled: Vec<MessageId> = second_page
            .iter()
            .chain(first_page.iter())
            .map(|m| m.id)
            .collect();
        assert_eq!(assembled, sent, "no overlap, no gap, ascending order");
    }

    #[tokio::test]
    async fn outsiders_cannot_read_a_thread() {
        let svc = service();
        let Ok((conversation, _)) = svc
            .send_to_user(&user("alice"), &user("bob"), "secret".to_string(), None)
            .await
        else {
            panic!("send failed");
        };
        let result = svc
            .fetch_messages(&user("mallory"), conversation.id, None, None)
            .await;
        assert!(matches!(result, Err(MarketError::NotFound(_))));
    }

    #[tokio::test]
    async fn deleted_message_shows_as_tombstone_not_a_gap() {
        let svc = service();
        let alice = user("alice");
        let Ok((conversation, message)) = svc
            .send_to_user(&alice, &user("bob"), "oops".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        let Ok(deleted) = svc.delete_message(&alice, message.id).await else {
            panic!("delete failed");
        };
        assert_eq!(deleted.content, TOMBSTONE);

        let Ok(page) = svc.fetch_messages(&alice, conversation.id, None, None).await else {
            panic!("fetch failed");
        };
        assert!(
            page.iter()
                .any(|m| m.id == message.id && m.content == TOMBSTONE)
        );
    }

    #[tokio::test]
    async fn only_the_sender_may_edit_or_delete() {
        let svc = service();
        let Ok((_, message)) = svc
            .send_to_user(&user("alice"), &user("bob"), "mine".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        let edit = svc
            .edit_message(&user("bob"), message.id, "hijacked".to_string())
            .await;
        assert!(matches!(edit, Err(MarketError::NotFound(_))));

        let delete = svc.delete_message(&user("bob"), message.id).await;
        assert!(matches!(delete, Err(MarketError::NotFound(_))));

        let Ok(edited) = svc
            .edit_message(&user("alice"), message.id, "mine, edited".to_string())
            .await
        else {
            panic!("edit failed");
        };
        assert_eq!(edited.content, "mine, edited");
        assert!(edited.edited_at.is_some());
    }

    #[tokio::test]
    async fn editing_a_deleted_message_is_refused() {
        let svc = service();
        let alice = user("alice");
        let Ok((_, message)) = svc
            .send_to_user(&alice, &user("bob"), "oops".to_string(), None)
            .await
        else {
            panic!("send failed");
        };
        let Ok(_) = svc.delete_message(&alice, message.id).await else {
            panic!("delete failed");
        };

        let result = svc
            .edit_message(&alice, message.id, "resurrect".to_string())
            .await;
        assert!(matches!(result, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn mark_read_is_idempotent_and_never_negative() {
        let svc = service();
        let alice = user("alice");
        let bob = user("bob");
        for i in 0..3 {
            let _ = svc.send_to_user(&alice, &bob, format!("m{i}"), None).await;
        }
        let Ok(inbox) = svc.conversations(&bob).await else {
            panic!("inbox failed");
        };
        let Some(summary) = inbox.first() else {
            panic!("empty inbox");
        };
        let conv = summary.conversation.id;

        assert_eq!(svc.mark_read(&bob, conv).await.ok(), Some(3));
        assert_eq!(svc.mark_read(&bob, conv).await.ok(), Some(0));

        let Ok(inbox) = svc.conversations(&bob).await else {
            panic!("inbox failed");
        };
        assert_eq!(inbox.first().map(|s| s.unread), Some(0));
    }

    #[tokio::test]
    async fn reactions_replace_wholesale() {
        let svc = service();
        let alice = user("alice");
        let bob = user("bob");
        let Ok((_, message)) = svc
            .send_to_user(&alice, &bob, "react to this".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        let mut first = Reactions::new();
        first.insert("👍".to_string(), BTreeSet::from([bob.clone()]));
        let Ok(_) = svc.set_reactions(&bob, message.id, first).await else {
            panic!("reaction failed");
        };

        // A full replacement drops the earlier emoji: last writer wins.
        let mut second = Reactions::new();
        second.insert("🔥".to_string(), BTreeSet::from([alice.clone()]));
        let Ok(updated) = svc.set_reactions(&alice, message.id, second).await else {
            panic!("reaction failed");
        };
        assert!(updated.reactions.contains_key("🔥"));
        assert!(!updated.reactions.contains_key("👍"));
    }

    #[tokio::test]
    async fn delete_conversation_is_participant_scoped() {
        let svc = service();
        let Ok((conversation, _)) = svc
            .send_to_user(&user("alice"), &user("bob"), "bye".to_string(), None)
            .await
        else {
            panic!("send failed");
        };

        assert_eq!(
            svc.delete_conversation(&user("mallory"), conversation.id)
                .await
                .ok(),
            Some(false)
        );
        assert_eq!(
            svc.delete_conversation(&user("alice"), conversation.id)
                .await
                .ok(),
            Some(true)
        );
        assert_eq!(
            svc.conversations(&user("alice")).await.map(|v| v.len()).ok(),
            Some(0)
        );
    }
}
