//! Session endpoints: logout.
//!
//! Login is the OAuth flow's job, outside this service; the core only
//! tears sessions down.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::DeletedResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};
use crate::identity::extract::session_token;

/// `POST /auth/logout` — Delete the presented session.
///
/// # Errors
///
/// Returns [`MarketError::Unauthenticated`] when no token is presented.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "System",
    summary = "Log out",
    description = "Deletes the session behind the presented token. Reports deleted=false when the token no longer resolves.",
    responses(
        (status = 200, description = "Logout outcome", body = DeletedResponse),
        (status = 401, description = "No token presented", body = ErrorResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError> {
    let token = session_token(&headers).ok_or(MarketError::Unauthenticated)?;
    let deleted = state.sessions.logout(&token).await?;
    Ok((StatusCode::OK, Json(DeletedResponse { deleted })))
}

/// Auth routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}
