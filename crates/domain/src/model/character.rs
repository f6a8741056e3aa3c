//! The player avatar. `Character` carries every field the rule kit's pure
//! functions read: ability scores, HP, proficiencies, spell slots, survival
//! needs, wounds, and the per-class resource counters. Invariants enforced by
//! constructors and mutators here; the engine is responsible for clamping
//! after every mutation it applies during turn resolution.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, GameId, ItemId, LocationId, SpellId};
use crate::model::progression::CustomSpell;
use crate::rules::ability_scores::Ability;
use crate::rules::conditions::Condition;
use crate::rules::skills::Skill;
use crate::rules::survival::Needs;
use crate::rules::wounds::Wound;

/// Multiclass level distribution, e.g. `{"fighter": 3, "wizard": 2}`.
pub type CharacterClassLevels = HashMap<String, i32>;

/// Rage uses, ki points, sorcery points, lay-on-hands pool, bardic inspiration
/// uses, wild shape uses, pact slots — any class resource that is a bare
/// integer counter. Keyed by resource name (`"rage_uses"`, `"ki_points"`, ...).
pub type ClassResourceState = HashMap<String, i32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub game_id: GameId,
    pub name: String,
    pub ability_scores: HashMap<Ability, i32>,
    pub hp_current: i32,
    pub hp_max: i32,
    pub hp_temporary: i32,
    pub armor_class: i32,
    pub proficiency_bonus: i32,
    pub level: i32,
    pub xp: i32,
    pub class_levels: CharacterClassLevels,
    pub skill_proficiencies: HashSet<Skill>,
    pub saving_throw_proficiencies: HashSet<Ability>,
    pub equipped_weapon_id: Option<ItemId>,
    pub equipped_armor_id: Option<ItemId>,
    pub active_conditions: Vec<Condition>,
    pub hit_dice_remaining: i32,
    pub speed: i32,
    pub gold: i32,
    pub needs: Needs,
    pub spellcasting_ability: Option<Ability>,
    pub spell_slots_max: HashMap<i32, i32>,
    pub spell_slots_remaining: HashMap<i32, i32>,
    pub concentration_spell_id: Option<String>,
    pub wounds: Vec<Wound>,
    pub size: String,
    pub origin_id: Option<String>,
    pub class_resources: ClassResourceState,
    pub current_location_id: LocationId,
    pub known_spells: HashSet<SpellId>,
    pub prepared_spells: HashSet<SpellId>,
    pub custom_spells: Vec<CustomSpell>,
}

impl Character {
    /// `0 <= hp_current <= hp_max`. Called after every mutation that touches HP.
    pub fn clamp_hp(&mut self) {
        self.hp_current = self.hp_current.clamp(0, self.hp_max.max(0));
        self.hp_temporary = self.hp_temporary.max(0);
    }

    /// `spell_slots_remaining[l] <= spell_slots_max[l]` for every known level.
    pub fn clamp_spell_slots(&mut self) {
        for (level, remaining) in self.spell_slots_remaining.iter_mut() {
            let max = self.spell_slots_max.get(level).copied().unwrap_or(0);
            *remaining = (*remaining).clamp(0, max.max(0));
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp_current > 0
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        let score = self.ability_scores.get(&ability).copied().unwrap_or(10);
        crate::rules::ability_scores::modifier(score)
    }

    pub fn is_proficient_skill(&self, skill: Skill) -> bool {
        self.skill_proficiencies.contains(&skill)
    }

    pub fn is_proficient_save(&self, ability: Ability) -> bool {
        self.saving_throw_proficiencies.contains(&ability)
    }
}
