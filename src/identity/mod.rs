//! Identity layer: session resolution and profile projection.
//!
//! Both concerns are external collaborators from the trading core's
//! point of view: sessions are created by the OAuth login flow, profile
//! data comes from the identity provider. This module consumes them —
//! it resolves a request to a stable actor identity and embeds public
//! profiles into responses, substituting a placeholder when a profile
//! cannot be found.

pub mod extract;
pub mod profiles;
pub mod sessions;

pub use extract::{AdminGate, Identity};
pub use profiles::{ProfileProvider, StaticProfiles};
pub use sessions::{SessionProvider, StoreSessions};
