//! Catalog items: read-mostly reference data per game.
//!
//! The catalog is owned by the admin surface and the companion bot; the
//! trading core only reads it, joining item references into listing and
//! calculator responses at display time.
//!
//! Every game attaches different value modifiers to its items (Adopt Me
//! has neon/mega tiers and fly/ride bonuses, Grow a Garden has a family
//! of named mutation variants, and so on). Rather than one record shape
//! with nullable columns for every game's fields, the game-specific
//! payload is a tagged union keyed by [`Game`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Game, ItemId};

/// A catalog entry for one tradeable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique item identifier.
    pub id: ItemId,
    /// Game this item belongs to.
    pub game: Game,
    /// Display name.
    pub name: String,
    /// Section/category within the game (e.g. `"Godly"`, `"Pets"`).
    pub section: Option<String>,
    /// Base trading value in the game's value scale.
    pub value: i64,
    /// Image reference for display.
    pub image_url: Option<String>,
    /// Game-specific payload.
    pub details: ItemDetails,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Game-specific item attributes, tagged by game.
///
/// Serialized as JSONB with a `"game"` discriminator so each variant only
/// carries the fields its game actually uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum ItemDetails {
    /// Murder Mystery 2 descriptors.
    Mm2 {
        /// Rarity tier (e.g. `"Godly"`, `"Ancient"`).
        rarity: Option<String>,
        /// Demand descriptor (e.g. `"high"`, `"low"`).
        demand: Option<String>,
    },
    /// Adopt Me pet value modifiers.
    AdoptMe {
        /// Value of the neon version, when one exists.
        neon_value: Option<i64>,
        /// Value of the mega-neon version, when one exists.
        mega_value: Option<i64>,
        /// Added value for the fly attribute.
        fly_bonus: Option<i64>,
        /// Added value for the ride attribute.
        ride_bonus: Option<i64>,
    },
    /// Steal a Brainrot descriptors.
    Sab {
        /// Rarity tier.
        rarity: Option<String>,
        /// Demand descriptor.
        demand: Option<String>,
        /// In-game income rate, used by the value calculator.
        income_per_second: Option<i64>,
    },
    /// Grow a Garden mutation variants.
    Gag {
        /// Named variant values (e.g. `"gold"`, `"rainbow"`), keyed by
        /// variant name. The game defines up to 13 of these.
        variant_values: BTreeMap<String, i64>,
    },
}

impl ItemDetails {
    /// Returns an empty payload appropriate for the given game.
    #[must_use]
    pub fn empty_for(game: Game) -> Self {
        match game {
            Game::Mm2 => Self::Mm2 {
                rarity: None,
                demand: None,
            },
            Game::AdoptMe => Self::AdoptMe {
                neon_value: None,
                mega_value: None,
                fly_bonus: None,
                ride_bonus: None,
            },
            Game::Sab => Self::Sab {
                rarity: None,
                demand: None,
                income_per_second: None,
            },
            Game::Gag => Self::Gag {
                variant_values: BTreeMap::new(),
            },
        }
    }

    /// Returns the game this payload belongs to.
    #[must_use]
    pub const fn game(&self) -> Game {
        match self {
            Self::Mm2 { .. } => Game::Mm2,
            Self::AdoptMe { .. } => Game::AdoptMe,
            Self::Sab { .. } => Game::Sab,
            Self::Gag { .. } => Game::Gag,
        }
    }
}

/// Cross-game projection of an item for embedding into listing responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Item identifier.
    pub id: ItemId,
    /// Owning game.
    pub game: Game,
    /// Display name.
    pub name: String,
    /// Base trading value.
    pub value: i64,
    /// Image reference.
    pub image_url: Option<String>,
}

impl ItemSummary {
    /// Placeholder shown when a referenced item no longer resolves in
    /// the catalog. The response succeeds with this stand-in instead of
    /// failing.
    #[must_use]
    pub fn unknown(id: ItemId, game: Game) -> Self {
        Self {
            id,
            game,
            name: "Unknown Item".to_string(),
            value: 0,
            image_url: None,
        }
    }
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            game: item.game,
            name: item.name.clone(),
            value: item.value,
            image_url: item.image_url.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn details_tag_matches_game() {
        for game in Game::ALL {
            assert_eq!(ItemDetails::empty_for(game).game(), game);
        }
    }

    #[test]
    fn details_serialize_with_game_tag() {
        let details = ItemDetails::Mm2 {
            rarity: Some("Godly".to_string()),
            demand: None,
        };
        let json = serde_json::to_value(&details).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert_eq!(json.get("game").and_then(|v| v.as_str()), Some("mm2"));
        assert_eq!(json.get("rarity").and_then(|v| v.as_str()), Some("Godly"));
    }

    #[test]
    fn gag_variants_round_trip() {
        let mut variant_values = BTreeMap::new();
        variant_values.insert("gold".to_string(), 120);
        variant_values.insert("rainbow".to_string(), 600);
        let details = ItemDetails::Gag { variant_values };

        let json = serde_json::to_value(&details).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let back: ItemDetails = serde_json::from_value(json).ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(back, details);
    }

    #[test]
    fn unknown_summary_uses_placeholder_name() {
        let summary = ItemSummary::unknown(ItemId::new(), Game::Mm2);
        assert_eq!(summary.name, "Unknown Item");
        assert_eq!(summary.value, 0);
    }
}
