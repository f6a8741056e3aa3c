//! The pluggable rule-system registry. Each `GameSystem` owns one
//! slice of the action space; the pipeline asks the registry which system
//! claims a classified `Action` and hands resolution to it. Systems never
//! touch the store directly — they read the `GameContext` they're given and
//! hand back an `ActionResult` of mutations/events for the pipeline to apply.

pub mod combat;
pub mod companion;
pub mod crafting;
pub mod exploration;
pub mod housing;
pub mod inventory;
pub mod rest;
pub mod shop;
pub mod social;
pub mod spellcasting;

use wrldcore_domain::model::action::{Action, ActionResult, GameContext};
use wrldcore_domain::random::RandomSource;

use crate::content::ContentCatalog;
use crate::error::EngineResult;

/// A single rule subsystem. Implementations are stateless; all state they
/// need lives in the `GameContext` passed to `resolve`.
pub trait GameSystem: Send + Sync {
    /// A short stable identifier used in logs and error messages.
    fn system_id(&self) -> &'static str;

    /// The `action_type` strings this system is willing to resolve.
    fn handled_action_types(&self) -> &'static [&'static str];

    /// Whether this system claims `action` given the current context. The
    /// default implementation just checks `action_type` membership; systems
    /// with state-dependent claims (e.g. combat only claiming movement when
    /// no combat is active) override this.
    fn can_handle(&self, action: &Action, _context: &GameContext) -> bool {
        self.handled_action_types().contains(&action.action_type.as_str())
    }

    /// Resolve the action against the given context, producing the mutations
    /// and events the pipeline should apply. Implementations must not mutate
    /// `context` or any other shared state directly.
    fn resolve(
        &self,
        action: &Action,
        context: &GameContext,
        catalog: &ContentCatalog,
        random: &dyn RandomSource,
    ) -> EngineResult<ActionResult>;

    /// Short natural-language hints surfaced by meta commands like "help".
    fn available_action_hints(&self, _context: &GameContext) -> Vec<String> {
        Vec::new()
    }
}

/// Holds every registered system in registration order and dispatches a
/// classified action to the first one that claims it.
#[derive(Default)]
pub struct SystemRegistry {
    systems: Vec<Box<dyn GameSystem>>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self { systems: Vec::new() }
    }

    /// The default registry wired up in the order the turn pipeline expects
    /// to try them: combat first (it can claim movement/attack while an
    /// encounter is active), then the rest in no particular priority since
    /// their `action_type` sets don't overlap.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(combat::CombatSystem));
        registry.register(Box::new(exploration::ExplorationSystem));
        registry.register(Box::new(inventory::InventorySystem));
        registry.register(Box::new(social::SocialSystem));
        registry.register(Box::new(spellcasting::SpellcastingSystem));
        registry.register(Box::new(rest::RestSystem));
        registry.register(Box::new(shop::ShopSystem));
        registry.register(Box::new(crafting::CraftingSystem));
        registry.register(Box::new(companion::CompanionSystem));
        registry.register(Box::new(housing::HousingSystem));
        registry
    }

    pub fn register(&mut self, system: Box<dyn GameSystem>) {
        self.systems.push(system);
    }

    pub fn find_handler(&self, action: &Action, context: &GameContext) -> Option<&dyn GameSystem> {
        self.systems
            .iter()
            .map(|s| s.as_ref())
            .find(|s| s.can_handle(action, context))
    }

    pub fn all_hints(&self, context: &GameContext) -> Vec<String> {
        self.systems.iter().flat_map(|s| s.available_action_hints(context)).collect()
    }
}

/// Shared fixtures for the individual system test modules: a bare character
/// and location, plus a `GameContext` built from them with every collection
/// empty. Tests override just the fields their scenario needs.
#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use wrldcore_domain::ids::{CharacterId, GameId, LocationId, RegionId};
    use wrldcore_domain::model::action::GameContext;
    use wrldcore_domain::model::character::Character;
    use wrldcore_domain::model::inventory::Inventory;
    use wrldcore_domain::model::location::Location;
    use wrldcore_domain::rules::ability_scores::Ability;
    use wrldcore_domain::rules::survival::Needs;

    pub(crate) fn bare_character(game_id: GameId, location: LocationId) -> Character {
        let mut ability_scores = HashMap::new();
        for ability in Ability::ALL {
            ability_scores.insert(ability, 14);
        }
        Character {
            id: CharacterId::new(),
            game_id,
            name: "Arden".to_string(),
            ability_scores,
            hp_current: 10,
            hp_max: 10,
            hp_temporary: 0,
            armor_class: 14,
            proficiency_bonus: 2,
            level: 3,
            xp: 0,
            class_levels: HashMap::from([("wizard".to_string(), 3)]),
            skill_proficiencies: Default::default(),
            saving_throw_proficiencies: Default::default(),
            equipped_weapon_id: None,
            equipped_armor_id: None,
            active_conditions: Vec::new(),
            hit_dice_remaining: 3,
            speed: 30,
            gold: 0,
            needs: Needs { hunger: 100, thirst: 100, warmth: 100, morale: 100 },
            spellcasting_ability: Some(Ability::Intelligence),
            spell_slots_max: HashMap::new(),
            spell_slots_remaining: HashMap::new(),
            concentration_spell_id: None,
            wounds: Vec::new(),
            size: "medium".to_string(),
            origin_id: None,
            class_resources: HashMap::new(),
            current_location_id: location,
            known_spells: Default::default(),
            prepared_spells: Default::default(),
            custom_spells: Vec::new(),
        }
    }

    pub(crate) fn bare_location(game_id: GameId, id: LocationId) -> Location {
        Location {
            id,
            game_id,
            name: "a bare room".to_string(),
            region_id: RegionId::new(),
            description: String::new(),
            location_type: "generic".to_string(),
            items: Vec::new(),
            visited: true,
            properties: HashMap::new(),
            generated: false,
        }
    }

    /// A context with every collection empty; the character sits in
    /// `location` with no combat, entities, quests, or companions around.
    pub(crate) fn bare_context(character: Character, location: Location) -> GameContext {
        GameContext {
            game_id: character.game_id,
            turn_number: 1,
            world_time: 0,
            loop_count: 0,
            timeline_id: "main".to_string(),
            inventory: Inventory::new(character.id.to_string()),
            current_location: location,
            character,
            entities_here: Vec::new(),
            active_combat: None,
            recent_events: Vec::new(),
            active_quests: Vec::new(),
            companions: Vec::new(),
            connections: Vec::new(),
            shop: None,
            housing: None,
            trade_skills: Vec::new(),
            known_recipes: Vec::new(),
            known_spells: Vec::new(),
            prepared_spells: Vec::new(),
            custom_spells: Vec::new(),
            discovered_combinations: Vec::new(),
            faction_reputations: Vec::new(),
            npc_reputations: Vec::new(),
            bounties: Vec::new(),
            traits: Vec::new(),
        }
    }
}
