//! Crafting, spellcasting, and combination-discovery progression ledgers.

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, GameId, RecipeId, SpellId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSkill {
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub skill_name: String,
    pub level: i32,
    pub xp: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownRecipe {
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub recipe_id: RecipeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownSpell {
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub spell_id: SpellId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedSpell {
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub spell_id: SpellId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSpell {
    pub id: SpellId,
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub name: String,
    pub level: i32,
    pub description: String,
    pub damage_dice: Option<String>,
    pub damage_type: Option<String>,
}

/// An elemental pairing the player has discovered produces a combination
/// effect (`rules::elements::combination_affinity`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredCombination {
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub element_a: String,
    pub element_b: String,
}
