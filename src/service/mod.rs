//! Service layer: business rules over the store.
//!
//! Each service owns one resource's rules and holds an `Arc<dyn Store>`
//! plus whatever collaborators it needs. Handlers never talk to the
//! store directly.

pub mod catalog_service;
pub mod interaction_service;
pub mod listing_service;
pub mod messaging_service;

pub use catalog_service::CatalogService;
pub use interaction_service::InteractionService;
pub use listing_service::ListingService;
pub use messaging_service::MessagingService;
