//! OpenAPI document aggregation.

use utoipa::OpenApi;

/// OpenAPI specification covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "tradepost",
        description = "REST API backend for a cross-game virtual item trading marketplace."
    ),
    paths(
        crate::api::handlers::system::health_handler,
        crate::api::handlers::system::games_handler,
        crate::api::handlers::session::logout,
        crate::api::handlers::catalog::list_items,
        crate::api::handlers::catalog::get_item,
        crate::api::handlers::catalog::upsert_item,
        crate::api::handlers::catalog::delete_item,
        crate::api::handlers::listing::create_listing,
        crate::api::handlers::listing::list_active,
        crate::api::handlers::listing::my_listings,
        crate::api::handlers::listing::update_listing,
        crate::api::handlers::listing::delete_listing,
        crate::api::handlers::interaction::create_interaction,
        crate::api::handlers::interaction::list_interactions,
        crate::api::handlers::interaction::update_interaction,
        crate::api::handlers::conversation::list_conversations,
        crate::api::handlers::conversation::send_message,
        crate::api::handlers::conversation::fetch_messages,
        crate::api::handlers::conversation::mark_read,
        crate::api::handlers::conversation::pin_conversation,
        crate::api::handlers::conversation::delete_conversation,
        crate::api::handlers::conversation::edit_message,
        crate::api::handlers::conversation::delete_message,
        crate::api::handlers::conversation::set_reactions,
    ),
    components(schemas(
        crate::api::dto::ProfileDto,
        crate::api::dto::DeletedResponse,
        crate::api::dto::ItemDto,
        crate::api::dto::ItemSummaryDto,
        crate::api::dto::UpsertItemRequest,
        crate::api::dto::CreateListingRequest,
        crate::api::dto::UpdateListingRequest,
        crate::api::dto::ListingDto,
        crate::api::dto::CreateInteractionRequest,
        crate::api::dto::UpdateInteractionRequest,
        crate::api::dto::InteractionDto,
        crate::api::dto::SendMessageRequest,
        crate::api::dto::SendMessageResponse,
        crate::api::dto::EditMessageRequest,
        crate::api::dto::SetReactionsRequest,
        crate::api::dto::PinRequest,
        crate::api::dto::MessageDto,
        crate::api::dto::ConversationDto,
        crate::api::dto::ConversationSummaryDto,
        crate::api::dto::MarkReadResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "System", description = "Health and configuration"),
        (name = "Catalog", description = "Item reference data"),
        (name = "Listings", description = "The public trade board"),
        (name = "Interactions", description = "Proposals against listings"),
        (name = "Messaging", description = "Direct messages between traders"),
    )
)]
pub struct ApiDoc;
