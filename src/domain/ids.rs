//! Type-safe entity identifiers.
//!
//! Every persisted entity gets a newtype wrapper around [`uuid::Uuid`]
//! (v4) so identifiers of different entities cannot be confused. User
//! identity is the one exception: it is an opaque string key handed to
//! us by the external identity provider (a Discord snowflake), wrapped
//! in [`UserId`].

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a catalog item.
    ItemId
}

uuid_id! {
    /// Unique identifier for a trade listing.
    ListingId
}

uuid_id! {
    /// Unique identifier for a trade interaction.
    InteractionId
}

uuid_id! {
    /// Unique identifier for a two-party conversation.
    ConversationId
}

uuid_id! {
    /// Unique identifier for a message within a conversation.
    MessageId
}

/// Opaque, stable user identity key.
///
/// Assigned by the external identity provider; the core never parses or
/// generates these, it only compares and stores them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps an identity key handed to us by the session resolver.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for UserId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ListingId::new(), ListingId::new());
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let id = ConversationId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serde_round_trip() {
        let id = ItemId::new();
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let deserialized: ItemId = serde_json::from_str(&json).ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(id, deserialized);
    }

    #[test]
    fn from_uuid_round_trip() {
        let uuid = uuid::Uuid::new_v4();
        let id = InteractionId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn user_id_is_transparent_over_the_raw_key() {
        let id = UserId::new("190282183819");
        assert_eq!(id.as_str(), "190282183819");
        assert_eq!(format!("{id}"), "190282183819");
    }

    #[test]
    fn user_ids_order_lexicographically() {
        // Conversation pair canonicalization relies on this ordering.
        let a = UserId::new("111");
        let b = UserId::new("222");
        assert!(a < b);
    }
}
