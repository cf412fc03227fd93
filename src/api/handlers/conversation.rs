//! Conversation and message handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    ConversationSummaryDto, DeletedResponse, EditMessageRequest, MarkReadResponse, MessageDto,
    MessagesQuery, PinRequest, SendMessageRequest, SendMessageResponse, SetReactionsRequest,
};
use crate::app_state::AppState;
use crate::domain::{ConversationId, MessageCursor, MessageId, UserId};
use crate::error::{ErrorResponse, MarketError};
use crate::identity::Identity;

/// `GET /conversations` — The authenticated user's inbox.
///
/// # Errors
///
/// Returns [`MarketError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    tag = "Messaging",
    summary = "List conversations",
    description = "Returns every conversation the user is in, with the other participant's profile and an unread count, pinned first and newest activity next.",
    responses(
        (status = 200, description = "Inbox entries", body = Vec<ConversationSummaryDto>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    Identity(actor): Identity,
) -> Result<impl IntoResponse, MarketError> {
    let summaries = state.messaging.conversations(&actor).await?;
    let mut dtos = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let other = state.profiles.resolve(&summary.other).await;
        dtos.push(ConversationSummaryDto {
            id: summary.conversation.id.as_uuid(),
            other: other.into(),
            pinned: summary.conversation.pinned,
            last_message_at: summary.conversation.last_message_at,
            unread: summary.unread,
        });
    }
    Ok(Json(dtos))
}

/// `POST /users/{user_id}/messages` — Message another trader.
///
/// # Errors
///
/// Returns [`MarketError`] for self-messaging, invalid content, or a
/// bad reply target.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/messages",
    tag = "Messaging",
    summary = "Send a message",
    description = "Sends a message to the named user, creating the conversation on first contact. The insert and the conversation timestamp bump are atomic.",
    params(
        ("user_id" = String, Path, description = "Recipient identity key"),
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = SendMessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(user_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let recipient = UserId::new(user_id);
    let reply_to = req.reply_to.map(MessageId::from_uuid);
    let (conversation, message) = state
        .messaging
        .send_to_user(&actor, &recipient, req.content, reply_to)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            conversation: conversation.into(),
            message: message.into(),
        }),
    ))
}

/// `GET /conversations/{id}/messages` — One page of a thread.
///
/// # Errors
///
/// Returns [`MarketError`] when the conversation is missing, the actor
/// is not a participant, or the cursor is malformed.
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    tag = "Messaging",
    summary = "Fetch messages",
    description = "Returns up to `limit` messages ascending. Pass `before` (and `before_id` for tie-breaks) from the oldest message of the previous page to load older history.",
    params(
        ("id" = uuid::Uuid, Path, description = "Conversation UUID"),
        ("limit" = Option<u32>, Query, description = "Page size (max 100)"),
        ("before" = Option<String>, Query, description = "Return messages strictly older than this RFC 3339 timestamp"),
        ("before_id" = Option<uuid::Uuid>, Query, description = "Tie-break message id for the boundary timestamp"),
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = Vec<MessageDto>),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    )
)]
pub async fn fetch_messages(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<MessagesQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let cursor = match (query.before, query.before_id) {
        (Some(before), before_id) => Some(MessageCursor {
            before,
            before_id: before_id.map(MessageId::from_uuid),
        }),
        (None, Some(_)) => {
            return Err(MarketError::Validation(
                "before_id requires before".to_string(),
            ));
        }
        (None, None) => None,
    };
    let messages = state
        .messaging
        .fetch_messages(&actor, ConversationId::from_uuid(id), query.limit, cursor)
        .await?;
    let dtos: Vec<MessageDto> = messages.into_iter().map(Into::into).collect();
    Ok(Json(dtos))
}

/// `POST /conversations/{id}/read` — Mark the other side's messages
/// read.
///
/// # Errors
///
/// Returns [`MarketError`] when the conversation is missing or the
/// actor is not a participant.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/read",
    tag = "Messaging",
    summary = "Mark a conversation read",
    description = "Marks every message not sent by the authenticated user as read. Idempotent.",
    params(
        ("id" = uuid::Uuid, Path, description = "Conversation UUID"),
    ),
    responses(
        (status = 200, description = "Number of messages newly marked", body = MarkReadResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let marked = state
        .messaging
        .mark_read(&actor, ConversationId::from_uuid(id))
        .await?;
    Ok(Json(MarkReadResponse { marked }))
}

/// `POST /conversations/{id}/pin` — Pin or unpin a conversation.
///
/// # Errors
///
/// Returns [`MarketError`] when the conversation is missing or the
/// actor is not a participant.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/pin",
    tag = "Messaging",
    summary = "Pin a conversation",
    description = "Sets the pinned flag; pinned conversations sort to the top of the inbox.",
    params(
        ("id" = uuid::Uuid, Path, description = "Conversation UUID"),
    ),
    request_body = PinRequest,
    responses(
        (status = 204, description = "Pinned state updated"),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    )
)]
pub async fn pin_conversation(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PinRequest>,
) -> Result<impl IntoResponse, MarketError> {
    state
        .messaging
        .set_pinned(&actor, ConversationId::from_uuid(id), req.pinned)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /conversations/{id}` — Delete a conversation and its thread.
///
/// # Errors
///
/// Returns [`MarketError`] on store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/conversations/{id}",
    tag = "Messaging",
    summary = "Delete a conversation",
    description = "Deletes the conversation and every message in it atomically. Reports deleted=false for a missing or foreign conversation.",
    params(
        ("id" = uuid::Uuid, Path, description = "Conversation UUID"),
    ),
    responses(
        (status = 200, description = "Deletion outcome", body = DeletedResponse),
    )
)]
pub async fn delete_conversation(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let deleted = state
        .messaging
        .delete_conversation(&actor, ConversationId::from_uuid(id))
        .await?;
    Ok(Json(DeletedResponse { deleted }))
}

/// `PATCH /messages/{id}` — Edit a sent message.
///
/// # Errors
///
/// Returns [`MarketError`] when the message is missing, not the
/// actor's, or already deleted.
#[utoipa::path(
    patch,
    path = "/api/v1/messages/{id}",
    tag = "Messaging",
    summary = "Edit a message",
    description = "Replaces the content of a message the authenticated user sent and stamps the edit time. Deleted messages cannot be edited.",
    params(
        ("id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    request_body = EditMessageRequest,
    responses(
        (status = 200, description = "Edited message", body = MessageDto),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn edit_message(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<EditMessageRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let message = state
        .messaging
        .edit_message(&actor, MessageId::from_uuid(id), req.content)
        .await?;
    Ok(Json(MessageDto::from(message)))
}

/// `DELETE /messages/{id}` — Soft-delete a sent message.
///
/// # Errors
///
/// Returns [`MarketError`] when the message is missing or not the
/// actor's.
#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    tag = "Messaging",
    summary = "Delete a message",
    description = "Soft-deletes: the row stays in the thread with tombstone content so replies keep their target.",
    params(
        ("id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    responses(
        (status = 200, description = "Tombstoned message", body = MessageDto),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let message = state
        .messaging
        .delete_message(&actor, MessageId::from_uuid(id))
        .await?;
    Ok(Json(MessageDto::from(message)))
}

/// `PUT /messages/{id}/reactions` — Replace a message's reactions.
///
/// # Errors
///
/// Returns [`MarketError`] when the message is missing, the actor is
/// not in its conversation, or the map is oversized.
#[utoipa::path(
    put,
    path = "/api/v1/messages/{id}/reactions",
    tag = "Messaging",
    summary = "Set message reactions",
    description = "Replaces the reaction map wholesale. Last writer wins; concurrent reactors may lose updates.",
    params(
        ("id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    request_body = SetReactionsRequest,
    responses(
        (status = 200, description = "Message with new reactions", body = MessageDto),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn set_reactions(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SetReactionsRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let message = state
        .messaging
        .set_reactions(&actor, MessageId::from_uuid(id), req.reactions)
        .await?;
    Ok(Json(MessageDto::from(message)))
}

/// Messaging routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(list_conversations))
        .route("/users/{user_id}/messages", post(send_message))
        .route("/conversations/{id}/messages", get(fetch_messages))
        .route("/conversations/{id}/read", post(mark_read))
        .route("/conversations/{id}/pin", post(pin_conversation))
        .route("/conversations/{id}", delete(delete_conversation))
        .route(
            "/messages/{id}",
            axum::routing::patch(edit_message).delete(delete_message),
        )
        .route("/messages/{id}/reactions", put(set_reactions))
}
