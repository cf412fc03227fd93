//! Axum extractors for actor identity and admin access.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};

use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::MarketError;

/// Header carrying the session token when `Authorization: Bearer` is
/// not used.
pub const SESSION_HEADER: &str = "x-session-token";

/// Header carrying the admin shared secret.
pub const ADMIN_HEADER: &str = "x-admin-token";

/// The authenticated actor, resolved from the presented session token.
///
/// Rejects with [`MarketError::Unauthenticated`] when no token is
/// presented or the token does not resolve to a live session.
#[derive(Debug, Clone)]
pub struct Identity(pub UserId);

impl FromRequestParts<AppState> for Identity {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(MarketError::Unauthenticated)?;
        let user = state
            .sessions
            .resolve(&token)
            .await?
            .ok_or(MarketError::Unauthenticated)?;
        Ok(Self(user))
    }
}

/// Gate for the admin catalog routes.
///
/// When no admin token is configured the routes read as not-found; a
/// wrong token rejects as unauthenticated.
#[derive(Debug, Clone, Copy)]
pub struct AdminGate;

impl FromRequestParts<AppState> for AdminGate {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = &state.admin_token else {
            return Err(MarketError::NotFound("resource"));
        };
        let presented = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);
        if presented != Some(expected.as_str()) {
            return Err(MarketError::Unauthenticated);
        }
        Ok(Self)
    }
}

/// Extracts the session token from `Authorization: Bearer <token>` or
/// the `x-session-token` header.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    if let Some(token) = bearer {
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
