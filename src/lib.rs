//! # tradepost
//!
//! REST API backend for a cross-game virtual item trading marketplace
//! (Murder Mystery 2, Adopt Me, Steal a Brainrot, Grow a Garden).
//!
//! Users post trade listings (items offered against items requested),
//! propose trades against each other's listings, and negotiate over
//! direct messages. A moderated free-text path, a per-user active
//! listing quota, and an expiry sweep keep the board usable.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers + DTOs (api/)
//!     ├── Identity extractors (identity/)
//!     │
//!     ├── ListingService / InteractionService (service/)
//!     ├── MessagingService / CatalogService
//!     ├── ModerationGate (moderation/)
//!     │
//!     └── Store: PostgreSQL or in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod moderation;
pub mod persistence;
pub mod service;
