//! Trade interactions: proposals made against an existing listing.
//!
//! An interaction has its own lifecycle, independent of the listing it
//! targets. Deleting the listing removes its interactions with it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{InteractionId, ListingId, UserId};
use crate::error::MarketError;

/// Lifecycle status of a trade interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    /// Submitted, awaiting the listing owner's decision.
    Pending,
    /// Accepted by the listing owner; the trade is being arranged.
    Accepted,
    /// Declined by the listing owner. Terminal.
    Declined,
    /// The trade happened. Terminal.
    Completed,
}

impl InteractionStatus {
    /// Returns the wire string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` if moving from `self` to `next` is a legal
    /// transition.
    ///
    /// The machine is `pending → accepted | declined` and
    /// `accepted → completed`; `declined` and `completed` are terminal.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Declined)
                | (Self::Accepted, Self::Completed)
        )
    }
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "completed" => Ok(Self::Completed),
            other => Err(MarketError::Validation(format!(
                "unknown interaction status: {other}"
            ))),
        }
    }
}

/// A proposal submitted by one user against another user's listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInteraction {
    /// Unique interaction identifier.
    pub id: InteractionId,
    /// Listing this proposal targets.
    pub listing_id: ListingId,
    /// User who submitted the proposal.
    pub initiator: UserId,
    /// Optional free-text pitch. Moderated before persist.
    pub message: Option<String>,
    /// Lifecycle status.
    pub status: InteractionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status-change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TradeInteraction {
    /// Creates a new pending interaction with fresh timestamps.
    #[must_use]
    pub fn new(initiator: UserId, listing_id: ListingId, message: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: InteractionId::new(),
            listing_id,
            initiator,
            message,
            status: InteractionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_interaction_starts_pending() {
        let interaction = TradeInteraction::new(UserId::new("u2"), ListingId::new(), None);
        assert_eq!(interaction.status, InteractionStatus::Pending);
    }

    #[test]
    fn transition_matrix() {
        use InteractionStatus::{Accepted, Completed, Declined, Pending};

        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Declined));
        assert!(Accepted.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Accepted.can_transition_to(Declined));
        assert!(!Declined.can_transition_to(Accepted));
        assert!(!Completed.can_transition_to(Pending));
    }
}
