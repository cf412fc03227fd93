//! Catalog handlers: public reads and admin writes.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{DeletedResponse, GameQuery, ItemDto, UpsertItemRequest};
use crate::app_state::AppState;
use crate::domain::{Game, ItemId};
use crate::error::{ErrorResponse, MarketError};
use crate::identity::AdminGate;
use crate::service::catalog_service::ItemUpsert;

/// `GET /items` — List catalog items.
///
/// # Errors
///
/// Returns [`MarketError`] on an unsupported game filter or store
/// failure.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "Catalog",
    summary = "List catalog items",
    description = "Returns catalog items ordered by name, optionally filtered by game.",
    params(
        ("game" = Option<String>, Query, description = "Game filter (mm2, adopt_me, sab, gag)"),
    ),
    responses(
        (status = 200, description = "Catalog items", body = Vec<ItemDto>),
        (status = 400, description = "Unsupported game", body = ErrorResponse),
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<GameQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let game = query.game.as_deref().map(str::parse).transpose()?;
    let items = state.catalog.list(game).await?;
    let dtos = items
        .into_iter()
        .map(ItemDto::from_item)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(dtos))
}

/// `GET /items/{id}` — Fetch one catalog item.
///
/// # Errors
///
/// Returns [`MarketError::NotFound`] when the id does not resolve.
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    tag = "Catalog",
    summary = "Get a catalog item",
    description = "Returns one item with its game-specific payload.",
    params(
        ("id" = uuid::Uuid, Path, description = "Item UUID"),
    ),
    responses(
        (status = 200, description = "Catalog item", body = ItemDto),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let item = state.catalog.get(ItemId::from_uuid(id)).await?;
    Ok(Json(ItemDto::from_item(item)?))
}

/// `PUT /admin/items/{id}` — Create or replace a catalog item.
///
/// # Errors
///
/// Returns [`MarketError`] on invalid fields or a missing/wrong admin
/// token.
#[utoipa::path(
    put,
    path = "/api/v1/admin/items/{id}",
    tag = "Catalog",
    summary = "Upsert a catalog item (admin)",
    description = "Creates or replaces the item under the given id. Requires the x-admin-token header. Used by the admin panel and the companion bot.",
    params(
        ("id" = uuid::Uuid, Path, description = "Item UUID"),
    ),
    request_body = UpsertItemRequest,
    responses(
        (status = 200, description = "Stored item", body = ItemDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Bad admin token", body = ErrorResponse),
    )
)]
pub async fn upsert_item(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpsertItemRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let game: Game = req.game.parse()?;
    let details = req
        .details
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| MarketError::Validation(format!("invalid details payload: {e}")))?;
    let item = state
        .catalog
        .upsert(
            ItemId::from_uuid(id),
            ItemUpsert {
                game,
                name: req.name,
                section: req.section,
                value: req.value,
                image_url: req.image_url,
                details,
            },
        )
        .await?;
    Ok(Json(ItemDto::from_item(item)?))
}

/// `DELETE /admin/items/{id}` — Delete a catalog item.
///
/// # Errors
///
/// Returns [`MarketError`] on a missing/wrong admin token or store
/// failure.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/items/{id}",
    tag = "Catalog",
    summary = "Delete a catalog item (admin)",
    description = "Deletes the item. Listings that reference it keep the reference and display a placeholder.",
    params(
        ("id" = uuid::Uuid, Path, description = "Item UUID"),
    ),
    responses(
        (status = 200, description = "Deletion outcome", body = DeletedResponse),
        (status = 401, description = "Bad admin token", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let deleted = state.catalog.remove(ItemId::from_uuid(id)).await?;
    Ok(Json(DeletedResponse { deleted }))
}

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items))
        .route("/items/{id}", get(get_item))
        .route(
            "/admin/items/{id}",
            put(upsert_item).delete(delete_item),
        )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use super::*;
    use crate::moderation::{ModerationFilter, ModerationGate};
    use crate::persistence::MemoryStore;
    use crate::service::{CatalogService, InteractionService, ListingService, MessagingService};

    fn state(admin_token: Option<&str>) -> AppState {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let moderation = Arc::new(ModerationGate::new(ModerationFilter::new()));
        AppState {
            listings: Arc::new(ListingService::new(
                Arc::clone(&store) as Arc<dyn crate::persistence::Store>,
                Arc::clone(&moderation),
                3,
                7,
            )),
            interactions: Arc::new(InteractionService::new(
                Arc::clone(&store) as Arc<dyn crate::persistence::Store>,
                moderation,
            )),
            messaging: Arc::new(MessagingService::new(
                Arc::clone(&store) as Arc<dyn crate::persistence::Store>,
                50,
            )),
            catalog: Arc::new(CatalogService::new(
                Arc::clone(&store) as Arc<dyn crate::persistence::Store>,
            )),
            sessions: Arc::new(crate::identity::StoreSessions::new(store)),
            profiles: Arc::new(crate::identity::StaticProfiles::new()),
            admin_token: admin_token.map(str::to_string),
        }
    }

    fn upsert_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(format!("/admin/items/{}", uuid::Uuid::new_v4()))
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("x-admin-token", token);
        }
        builder
            .body(Body::from(
                r#"{"game":"mm2","name":"Seer","value":4}"#.to_string(),
            ))
            .ok()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn admin_route_rejects_a_wrong_token() {
        let app = routes().with_state(state(Some("secret")));
        let Ok(response) = app.oneshot(upsert_request(Some("wrong"))).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_route_accepts_the_configured_token() {
        let app = routes().with_state(state(Some("secret")));
        let Ok(response) = app.oneshot(upsert_request(Some("secret"))).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_read_as_not_found_when_disabled() {
        let app = routes().with_state(state(None));
        let Ok(response) = app.oneshot(upsert_request(Some("anything"))).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
