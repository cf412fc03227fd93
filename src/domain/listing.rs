//! Trade listings: a user's standing offer in one game.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Game, ItemId, ListingId, UserId};
use crate::error::MarketError;

/// Maximum number of item references on each side of a listing.
pub const MAX_ITEMS_PER_SIDE: usize = 9;

/// Lifecycle status of a trade listing.
///
/// Expiry is not a status: expired listings are deleted by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Open and visible on the trade board. Counts toward the owner's
    /// quota.
    Active,
    /// Owner marked the trade as done.
    Completed,
    /// Owner withdrew the listing without trading.
    Cancelled,
}

impl ListingStatus {
    /// Returns the wire string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(MarketError::Validation(format!(
                "unknown listing status: {other}"
            ))),
        }
    }
}

/// One user's standing trade offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeListing {
    /// Unique listing identifier.
    pub id: ListingId,
    /// Owning user. Only the owner may mutate or delete the listing.
    pub owner: UserId,
    /// Game the listed items belong to.
    pub game: Game,
    /// Items the owner is giving, in display order. Never empty.
    pub offering: Vec<ItemId>,
    /// Items the owner wants in return, in display order. Never empty.
    pub requesting: Vec<ItemId>,
    /// Optional free-text notes. Moderated before persist.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: ListingStatus,
    /// Creation timestamp; the expiry sweep keys off this.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TradeListing {
    /// Creates a new active listing with fresh timestamps.
    #[must_use]
    pub fn new(
        owner: UserId,
        game: Game,
        offering: Vec<ItemId>,
        requesting: Vec<ItemId>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ListingId::new(),
            owner,
            game,
            offering,
            requesting,
            notes,
            status: ListingStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update to a listing. Unset fields are left unchanged.
///
/// `notes` distinguishes "leave alone" (`None`) from "replace with"
/// (`Some(Some(text))`) and "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    /// New status, if changing.
    pub status: Option<ListingStatus>,
    /// New offering side, if changing.
    pub offering: Option<Vec<ItemId>>,
    /// New requesting side, if changing.
    pub requesting: Option<Vec<ItemId>>,
    /// New notes value, if changing.
    pub notes: Option<Option<String>>,
}

impl ListingPatch {
    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.offering.is_none()
            && self.requesting.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_listing_starts_active() {
        let listing = TradeListing::new(
            UserId::new("u1"),
            Game::Mm2,
            vec![ItemId::new()],
            vec![ItemId::new()],
            None,
        );
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.created_at, listing.updated_at);
    }

    #[test]
    fn status_round_trips_through_wire_string() {
        for status in [
            ListingStatus::Active,
            ListingStatus::Completed,
            ListingStatus::Cancelled,
        ] {
            assert_eq!(ListingStatus::from_str(status.as_str()).ok(), Some(status));
        }
    }

    #[test]
    fn empty_patch_reports_empty() {
        assert!(ListingPatch::default().is_empty());
        let patch = ListingPatch {
            status: Some(ListingStatus::Completed),
            ..ListingPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
