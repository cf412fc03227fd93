//! Trade interaction handlers: propose, list, decide.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateInteractionRequest, InteractionDto, UpdateInteractionRequest,
};
use crate::app_state::AppState;
use crate::domain::{InteractionId, InteractionStatus, ListingId, TradeInteraction};
use crate::error::{ErrorResponse, MarketError};
use crate::identity::Identity;

/// `POST /listings/{id}/interactions` — Propose against a listing.
///
/// # Errors
///
/// Returns [`MarketError`] when the listing is missing or the message
/// fails moderation.
#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/interactions",
    tag = "Interactions",
    summary = "Create a trade interaction",
    description = "Records a pending proposal from the authenticated user against a listing. The optional message is moderated. No quota applies.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    request_body = CreateInteractionRequest,
    responses(
        (status = 201, description = "Interaction created", body = InteractionDto),
        (status = 404, description = "Listing not found", body = ErrorResponse),
        (status = 422, description = "Message rejected by moderation", body = ErrorResponse),
    )
)]
pub async fn create_interaction(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(listing_id): Path<uuid::Uuid>,
    Json(req): Json<CreateInteractionRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let interaction = state
        .interactions
        .create(&actor, ListingId::from_uuid(listing_id), req.message)
        .await?;
    let dto = interaction_dto(&state, interaction).await;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// `GET /listings/{id}/interactions` — List proposals on a listing.
///
/// # Errors
///
/// Returns [`MarketError`] when the listing is missing or on store
/// failure.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}/interactions",
    tag = "Interactions",
    summary = "List interactions on a listing",
    description = "Returns all proposals against a listing, newest first, each with its initiator's profile.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    responses(
        (status = 200, description = "Interactions with initiator profiles", body = Vec<InteractionDto>),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn list_interactions(
    State(state): State<AppState>,
    Path(listing_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let interactions = state
        .interactions
        .list(ListingId::from_uuid(listing_id))
        .await?;
    let mut dtos = Vec::with_capacity(interactions.len());
    for interaction in interactions {
        dtos.push(interaction_dto(&state, interaction).await);
    }
    Ok(Json(dtos))
}

/// `PATCH /interactions/{id}` — Move a proposal through its lifecycle.
///
/// # Errors
///
/// Returns [`MarketError`] for illegal transitions, or not-found when
/// the interaction is missing or the actor is neither party.
#[utoipa::path(
    patch,
    path = "/api/v1/interactions/{id}",
    tag = "Interactions",
    summary = "Update interaction status",
    description = "The listing owner accepts or declines a pending proposal; either party marks an accepted one completed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Interaction UUID"),
    ),
    request_body = UpdateInteractionRequest,
    responses(
        (status = 200, description = "Updated interaction", body = InteractionDto),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 404, description = "Interaction not found", body = ErrorResponse),
    )
)]
pub async fn update_interaction(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateInteractionRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let next: InteractionStatus = req.status.parse()?;
    let interaction = state
        .interactions
        .update_status(&actor, InteractionId::from_uuid(id), next)
        .await?;
    let dto = interaction_dto(&state, interaction).await;
    Ok(Json(dto))
}

/// Interaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/listings/{id}/interactions",
            post(create_interaction).get(list_interactions),
        )
        .route("/interactions/{id}", patch(update_interaction))
}

async fn interaction_dto(state: &AppState, interaction: TradeInteraction) -> InteractionDto {
    let initiator = state.profiles.resolve(&interaction.initiator).await;
    InteractionDto {
        id: interaction.id.as_uuid(),
        listing_id: interaction.listing_id.as_uuid(),
        initiator: initiator.into(),
        message: interaction.message,
        status: interaction.status.as_str().to_string(),
        created_at: interaction.created_at,
        updated_at: interaction.updated_at,
    }
}
