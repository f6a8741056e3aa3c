//! Character traits awarded by the Director from cumulative behavior
//! counters, and the counters themselves.

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, GameId, TraitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorPattern {
    Aggressive,
    Diplomatic,
    Stealthy,
    Generous,
    Mercantile,
    Curious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub pattern: BehaviorPattern,
    pub tier: i32,
}

/// A menu entry a trait proposal is validated against; each effect has a
/// fixed point cost that must fit the tier's budget (2/4/6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitEffect {
    pub effect_type: String,
    pub magnitude: i32,
    pub cost: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTrait {
    pub id: TraitId,
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub name: String,
    pub description: String,
    pub pattern: BehaviorPattern,
    pub tier: i32,
    pub effects: Vec<TraitEffect>,
}

/// Tier thresholds a behavior counter must cross before a proposal fires, and
/// the point budget each tier's effects must fit within.
pub fn tier_for_count(count: i32) -> Option<(i32, i32)> {
    match count {
        n if n >= 30 => Some((3, 6)),
        n if n >= 15 => Some((2, 4)),
        n if n >= 5 => Some((1, 2)),
        _ => None,
    }
}
