//! The shapes that flow through the turn pipeline: a classified `Action`, the
//! immutable `GameContext` a subsystem resolves against, and the
//! `ActionResult` it hands back for the pipeline to apply.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ActorId, CombatId, GameId, LocationId};
use crate::model::character::Character;
use crate::model::combat::CombatInstance;
use crate::model::companion::{Companion, Housing};
use crate::model::event::GameEvent;
use crate::model::inventory::{Entity, Inventory};
use crate::model::location::{Location, LocationConnection};
use crate::model::progression::{CustomSpell, DiscoveredCombination, KnownRecipe, KnownSpell, PreparedSpell, TradeSkill};
use crate::model::quest::Quest;
use crate::model::reputation::{Bounty, FactionReputation, NpcReputation};
use crate::model::shop::Shop;
use crate::model::traits::CharacterTrait;
use crate::rules::dice::DiceRollResult;

/// A structured command derived from the player's raw input by the
/// classifier. Unknown verbs become `action_type = "unrecognized"` or
/// `"custom"`; meta commands (inventory view, help, map) are still modeled as
/// an action so every input takes the same path through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub action_type: String,
    pub actor_id: ActorId,
    pub target_id: Option<String>,
    pub parameters: HashMap<String, Value>,
    pub raw_input: String,
    pub is_meta: bool,
}

impl Action {
    pub fn new(action_type: impl Into<String>, actor_id: impl Into<String>, raw_input: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            actor_id: actor_id.into(),
            target_id: None,
            parameters: HashMap::new(),
            raw_input: raw_input.into(),
            is_meta: false,
        }
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }
}

/// The immutable snapshot of current state a subsystem's `resolve` runs
/// against. Built fresh each turn from the data store; subsystems must not
/// re-read state mid-resolution — everything they need is here.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub game_id: GameId,
    pub turn_number: i64,
    pub world_time: i32,
    pub loop_count: i32,
    /// The game's active timeline. Every event this turn produces is
    /// stamped with it, so a later rewind's branch never mixes with events
    /// from the timeline it left behind.
    pub timeline_id: String,
    pub character: Character,
    pub current_location: Location,
    pub entities_here: Vec<Entity>,
    pub active_combat: Option<CombatInstance>,
    pub inventory: Inventory,
    pub recent_events: Vec<GameEvent>,
    pub active_quests: Vec<Quest>,
    pub companions: Vec<Companion>,
    /// Outgoing connections from `current_location`, for `ExplorationSystem`.
    pub connections: Vec<LocationConnection>,
    /// The shop run by an NPC present at this location, if any.
    pub shop: Option<Shop>,
    /// The character's owned home, if any (not location-scoped; a character
    /// has at most one `Housing` row regardless of where they stand).
    pub housing: Option<Housing>,
    pub trade_skills: Vec<TradeSkill>,
    pub known_recipes: Vec<KnownRecipe>,
    pub known_spells: Vec<KnownSpell>,
    pub prepared_spells: Vec<PreparedSpell>,
    pub custom_spells: Vec<CustomSpell>,
    pub discovered_combinations: Vec<DiscoveredCombination>,
    pub faction_reputations: Vec<FactionReputation>,
    pub npc_reputations: Vec<NpcReputation>,
    pub bounties: Vec<Bounty>,
    pub traits: Vec<CharacterTrait>,
}

impl GameContext {
    pub fn entity_at_location(&self, id: &str) -> Option<&Entity> {
        self.entities_here
            .iter()
            .find(|e| e.id.to_string() == id || e.name.eq_ignore_ascii_case(id))
    }

    pub fn combat_id(&self) -> Option<CombatId> {
        self.active_combat.as_ref().map(|c| c.id)
    }

    pub fn faction_reputation(&self, faction_id: &str) -> i32 {
        self.faction_reputations
            .iter()
            .find(|r| r.faction_id.to_string() == faction_id)
            .map(|r| r.value)
            .unwrap_or(0)
    }

    pub fn npc_reputation(&self, entity_id: &str) -> i32 {
        self.npc_reputations
            .iter()
            .find(|r| r.entity_id.to_string() == entity_id)
            .map(|r| r.value)
            .unwrap_or(0)
    }

    pub fn knows_recipe(&self, recipe_id: &str) -> bool {
        self.known_recipes.iter().any(|k| k.recipe_id.to_string() == recipe_id)
    }

    pub fn knows_spell(&self, spell_id: &str) -> bool {
        self.known_spells.iter().any(|k| k.spell_id.to_string() == spell_id)
    }

    pub fn has_prepared(&self, spell_id: &str) -> bool {
        self.prepared_spells.iter().any(|p| p.spell_id.to_string() == spell_id)
    }
}

/// A single field change to apply through the owning repository. `old_value`
/// is carried for audit/debugging; the pipeline dispatches on `target_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub target_type: String,
    pub target_id: String,
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl Mutation {
    pub fn new(
        target_type: impl Into<String>,
        target_id: impl Into<String>,
        field: impl Into<String>,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            target_type: target_type.into(),
            target_id: target_id.into(),
            field: field.into(),
            old_value,
            new_value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceRollRecord {
    pub purpose: String,
    pub expression: String,
    pub individual_rolls: Vec<i32>,
    pub total: i32,
}

impl DiceRollRecord {
    pub fn from_roll(purpose: impl Into<String>, roll: &DiceRollResult) -> Self {
        Self {
            purpose: purpose.into(),
            expression: roll.formula.display(),
            individual_rolls: roll.individual_rolls.clone(),
            total: roll.total,
        }
    }
}

/// What a subsystem's `resolve` (or the Director's creative-action path)
/// hands back to the pipeline for mutation/ledger application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub outcome_description: String,
    pub dice_rolls: Vec<DiceRollRecord>,
    pub state_mutations: Vec<Mutation>,
    pub events: Vec<GameEvent>,
    pub xp_gained: i32,
}

impl ActionResult {
    pub fn empty_failure(description: impl Into<String>) -> Self {
        Self {
            success: false,
            outcome_description: description.into(),
            dice_rolls: Vec::new(),
            state_mutations: Vec::new(),
            events: Vec::new(),
            xp_gained: 0,
        }
    }

    pub fn empty_success(description: impl Into<String>) -> Self {
        Self {
            success: true,
            outcome_description: description.into(),
            dice_rolls: Vec::new(),
            state_mutations: Vec::new(),
            events: Vec::new(),
            xp_gained: 0,
        }
    }
}
