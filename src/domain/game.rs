//! Supported game identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// The games whose items can be traded on the platform.
///
/// Wire representation is the snake_case string (`"mm2"`, `"adopt_me"`,
/// `"sab"`, `"gag"`); anything else is rejected as
/// [`MarketError::UnsupportedGame`] rather than defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    /// Murder Mystery 2.
    Mm2,
    /// Adopt Me.
    AdoptMe,
    /// Steal a Brainrot.
    Sab,
    /// Grow a Garden.
    Gag,
}

impl Game {
    /// All supported games, in display order.
    pub const ALL: [Self; 4] = [Self::Mm2, Self::AdoptMe, Self::Sab, Self::Gag];

    /// Returns the wire string for this game.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mm2 => "mm2",
            Self::AdoptMe => "adopt_me",
            Self::Sab => "sab",
            Self::Gag => "gag",
        }
    }

    /// Returns the human-readable title for this game.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Mm2 => "Murder Mystery 2",
            Self::AdoptMe => "Adopt Me",
            Self::Sab => "Steal a Brainrot",
            Self::Gag => "Grow a Garden",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm2" => Ok(Self::Mm2),
            "adopt_me" => Ok(Self::AdoptMe),
            "sab" => Ok(Self::Sab),
            "gag" => Ok(Self::Gag),
            other => Err(MarketError::UnsupportedGame(other.to_string())),
        }
    }
}
