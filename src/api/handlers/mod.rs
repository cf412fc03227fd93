//! REST endpoint handlers organized by resource.

pub mod catalog;
pub mod conversation;
pub mod interaction;
pub mod listing;
pub mod session;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(listing::routes())
        .merge(interaction::routes())
        .merge(conversation::routes())
        .merge(catalog::routes())
}
