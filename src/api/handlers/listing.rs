//! Trade listing handlers: create, board, mine, update, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateListingRequest, DeletedResponse, GameQuery, ListingDto, UpdateListingRequest,
};
use crate::app_state::AppState;
use crate::domain::{Game, ItemId, ListingId, ListingPatch, TradeListing};
use crate::error::{ErrorResponse, MarketError};
use crate::identity::Identity;

/// `POST /listings` — Create a new trade listing.
///
/// # Errors
///
/// Returns [`MarketError`] on invalid fields, moderation rejection, or
/// the active-listing quota.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    tag = "Listings",
    summary = "Create a trade listing",
    description = "Creates an active listing for the authenticated user. Notes are moderated; at most three listings per user may be active at once.",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ListingDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Notes rejected by moderation", body = ErrorResponse),
        (status = 429, description = "Active-listing quota reached", body = ErrorResponse),
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let game: Game = req.game.parse()?;
    let offering = req.offering.into_iter().map(ItemId::from_uuid).collect();
    let requesting = req.requesting.into_iter().map(ItemId::from_uuid).collect();

    let listing = state
        .listings
        .create(&actor, game, offering, requesting, req.notes)
        .await?;
    let dto = listing_dto(&state, listing).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// `GET /listings` — The public trade board.
///
/// # Errors
///
/// Returns [`MarketError`] on an unsupported game filter or store
/// failure.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "Listings",
    summary = "List active listings",
    description = "Returns active listings newest-first, optionally filtered by game. Expired listings are swept before the read.",
    params(
        ("game" = Option<String>, Query, description = "Game filter (mm2, adopt_me, sab, gag)"),
    ),
    responses(
        (status = 200, description = "Active listings with creator profiles", body = Vec<ListingDto>),
        (status = 400, description = "Unsupported game", body = ErrorResponse),
    )
)]
pub async fn list_active(
    State(state): State<AppState>,
    Query(query): Query<GameQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let game = query.game.as_deref().map(str::parse).transpose()?;
    let listings = state.listings.list_active(game).await?;
    let dtos = listing_dtos(&state, listings).await?;
    Ok(Json(dtos))
}

/// `GET /listings/mine` — The authenticated user's listings.
///
/// # Errors
///
/// Returns [`MarketError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/listings/mine",
    tag = "Listings",
    summary = "List my listings",
    description = "Returns all of the authenticated user's listings, any status, newest first.",
    responses(
        (status = 200, description = "The user's listings", body = Vec<ListingDto>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    )
)]
pub async fn my_listings(
    State(state): State<AppState>,
    Identity(actor): Identity,
) -> Result<impl IntoResponse, MarketError> {
    let listings = state.listings.user_listings(&actor).await?;
    let dtos = listing_dtos(&state, listings).await?;
    Ok(Json(dtos))
}

/// `PATCH /listings/{id}` — Partially update an owned listing.
///
/// # Errors
///
/// Returns [`MarketError`] on invalid fields, moderation rejection, or
/// when the listing is missing or not owned (reported identically).
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    summary = "Update a listing",
    description = "Applies a partial update. Only the owner may update; a listing owned by someone else reads as not found.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Updated listing", body = ListingDto),
        (status = 404, description = "Listing not found", body = ErrorResponse),
        (status = 422, description = "Notes rejected by moderation", body = ErrorResponse),
    )
)]
pub async fn update_listing(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let patch = ListingPatch {
        status: req.status.as_deref().map(str::parse).transpose()?,
        offering: req
            .offering
            .map(|ids| ids.into_iter().map(ItemId::from_uuid).collect()),
        requesting: req
            .requesting
            .map(|ids| ids.into_iter().map(ItemId::from_uuid).collect()),
        notes: req.notes.map(Some),
    };
    let listing = state
        .listings
        .update(&actor, ListingId::from_uuid(id), patch)
        .await?;
    let dto = listing_dto(&state, listing).await?;
    Ok(Json(dto))
}

/// `DELETE /listings/{id}` — Delete an owned listing.
///
/// # Errors
///
/// Returns [`MarketError`] on store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    summary = "Delete a listing",
    description = "Deletes an owned listing and its interactions. Reports deleted=false for a missing or foreign listing.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    responses(
        (status = 200, description = "Deletion outcome", body = DeletedResponse),
    )
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let deleted = state
        .listings
        .delete(&actor, ListingId::from_uuid(id))
        .await?;
    Ok(Json(DeletedResponse { deleted }))
}

/// Listing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings", post(create_listing).get(list_active))
        .route("/listings/mine", get(my_listings))
        .route(
            "/listings/{id}",
            axum::routing::patch(update_listing).delete(delete_listing),
        )
}

/// Resolves one listing into its response shape: creator profile plus
/// item summaries, with placeholders for anything unresolvable.
pub(crate) async fn listing_dto(
    state: &AppState,
    listing: TradeListing,
) -> Result<ListingDto, MarketError> {
    let owner = state.profiles.resolve(&listing.owner).await;
    let offering = state
        .catalog
        .summaries_for(listing.game, &listing.offering)
        .await?;
    let requesting = state
        .catalog
        .summaries_for(listing.game, &listing.requesting)
        .await?;
    Ok(ListingDto {
        id: listing.id.as_uuid(),
        owner: owner.into(),
        game: listing.game.as_str().to_string(),
        offering: offering.into_iter().map(Into::into).collect(),
        requesting: requesting.into_iter().map(Into::into).collect(),
        notes: listing.notes,
        status: listing.status.as_str().to_string(),
        created_at: listing.created_at,
        updated_at: listing.updated_at,
    })
}

async fn listing_dtos(
    state: &AppState,
    listings: Vec<TradeListing>,
) -> Result<Vec<ListingDto>, MarketError> {
    let mut dtos = Vec::with_capacity(listings.len());
    for listing in listings {
        dtos.push(listing_dto(state, listing).await?);
    }
    Ok(dtos)
}
