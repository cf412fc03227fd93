//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::identity::{ProfileProvider, SessionProvider};
use crate::service::{CatalogService, InteractionService, ListingService, MessagingService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Trade board rules.
    pub listings: Arc<ListingService>,
    /// Proposal rules.
    pub interactions: Arc<InteractionService>,
    /// Direct messaging rules.
    pub messaging: Arc<MessagingService>,
    /// Catalog reads and admin writes.
    pub catalog: Arc<CatalogService>,
    /// Resolves session tokens to user identity.
    pub sessions: Arc<dyn SessionProvider>,
    /// Resolves user identity to public profiles.
    pub profiles: Arc<dyn ProfileProvider>,
    /// Shared secret gating the admin catalog routes; `None` disables
    /// them.
    pub admin_token: Option<String>,
}
