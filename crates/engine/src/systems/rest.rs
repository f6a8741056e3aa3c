//! Short and long rests: need recovery, wound healing chances, and bounty
//! decay. A long rest also recovers spell slots up to the class max.

use serde_json::json;
use wrldcore_domain::model::action::{Action, ActionResult, GameContext, Mutation};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::survival::{rest_effects, RestType};
use wrldcore_domain::rules::wounds::{heal_wound, HealingMethod};

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct RestSystem;

const HANDLED: &[&str] = &["rest"];
const BOUNTY_DECAY_PER_LONG_REST: i32 = 5;

impl super::GameSystem for RestSystem {
    fn system_id(&self) -> &'static str {
        "rest"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn can_handle(&self, action: &Action, context: &GameContext) -> bool {
        self.handled_action_types().contains(&action.action_type.as_str()) && context.active_combat.is_none()
    }

    fn resolve(&self, action: &Action, context: &GameContext, _catalog: &ContentCatalog, random: &dyn RandomSource) -> EngineResult<ActionResult> {
        let rest_type = match action.param_str("kind") {
            Some("long") => RestType::Long,
            Some("short") | None => RestType::Short,
            Some(other) => return Err(EngineError::InvalidInput(format!("unknown rest duration: {other}"))),
        };

        let new_needs = rest_effects(context.character.needs, rest_type);
        let mut mutations = vec![Mutation::new(
            "character",
            context.character.id.to_string(),
            "needs",
            json!(context.character.needs),
            json!(new_needs),
        )];

        if matches!(rest_type, RestType::Long) {
            let new_hp = context.character.hp_max;
            if new_hp != context.character.hp_current {
                mutations.push(Mutation::new(
                    "character",
                    context.character.id.to_string(),
                    "hp_current",
                    json!(context.character.hp_current),
                    json!(new_hp),
                ));
            }

            if context.character.spell_slots_max != context.character.spell_slots_remaining {
                mutations.push(Mutation::new(
                    "character",
                    context.character.id.to_string(),
                    "spell_slots_remaining",
                    json!(context.character.spell_slots_remaining),
                    json!(context.character.spell_slots_max),
                ));
            }

            let healed_wounds: Vec<_> = context
                .character
                .wounds
                .iter()
                .filter(|_| heal_wound(HealingMethod::LongRest, random))
                .cloned()
                .collect();
            if !healed_wounds.is_empty() {
                let remaining: Vec<_> = context
                    .character
                    .wounds
                    .iter()
                    .filter(|w| !healed_wounds.contains(w))
                    .cloned()
                    .collect();
                mutations.push(Mutation::new(
                    "character",
                    context.character.id.to_string(),
                    "wounds",
                    json!(context.character.wounds),
                    json!(remaining),
                ));
            }

            for bounty in &context.bounties {
                let mut decayed = bounty.clone();
                decayed.decay(BOUNTY_DECAY_PER_LONG_REST);
                if decayed.amount != bounty.amount {
                    mutations.push(Mutation::new(
                        "bounty",
                        bounty.region.clone(),
                        "amount",
                        json!(bounty.amount),
                        json!(decayed.amount),
                    ));
                }
            }
        }

        let verb = match rest_type {
            RestType::Long => "takes a long rest",
            RestType::Short => "takes a short rest",
        };
        Ok(ActionResult {
            success: true,
            outcome_description: format!("{} {verb}.", context.character.name),
            dice_rolls: Vec::new(),
            state_mutations: mutations,
            events: vec![
                GameEvent::new(context.game_id, context.turn_number, EventType::Custom("rest".into()), format!("{} {verb}.", context.character.name))
                    .with_actor(context.character.id.to_string()),
            ],
            xp_gained: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;
    use crate::systems::test_support::{bare_character, bare_context, bare_location};
    use crate::systems::GameSystem;
    use wrldcore_domain::ids::GameId;

    fn rest_action(kind: Option<&str>) -> Action {
        let mut action = Action::new("rest", "actor", "rest");
        if let Some(kind) = kind {
            action.parameters.insert("kind".to_string(), json!(kind));
        }
        action
    }

    #[test]
    fn a_long_rest_restores_hp_and_spell_slots_to_their_max() {
        let game_id = GameId::new();
        let location_id = wrldcore_domain::ids::LocationId::new();
        let mut character = bare_character(game_id, location_id);
        character.hp_current = 1;
        character.spell_slots_max = std::collections::HashMap::from([(1, 4), (2, 2)]);
        character.spell_slots_remaining = std::collections::HashMap::from([(1, 0), (2, 1)]);
        let context = bare_context(character, bare_location(game_id, location_id));
        let catalog = ContentCatalog::default();

        let result = RestSystem.resolve(&rest_action(Some("long")), &context, &catalog, &FixedRandom::new(Vec::new(), vec![1.0])).unwrap();

        let hp_mutation = result.state_mutations.iter().find(|m| m.field == "hp_current").expect("hp mutation");
        assert_eq!(hp_mutation.new_value, json!(context.character.hp_max));
        let slots_mutation = result.state_mutations.iter().find(|m| m.field == "spell_slots_remaining").expect("slots mutation");
        assert_eq!(slots_mutation.new_value, json!(context.character.spell_slots_max));
    }

    #[test]
    fn a_short_rest_never_restores_spell_slots() {
        let game_id = GameId::new();
        let location_id = wrldcore_domain::ids::LocationId::new();
        let mut character = bare_character(game_id, location_id);
        character.spell_slots_max = std::collections::HashMap::from([(1, 4)]);
        character.spell_slots_remaining = std::collections::HashMap::from([(1, 1)]);
        let context = bare_context(character, bare_location(game_id, location_id));
        let catalog = ContentCatalog::default();

        let result = RestSystem.resolve(&rest_action(None), &context, &catalog, &FixedRandom::new(Vec::new(), Vec::new())).unwrap();
        assert!(!result.state_mutations.iter().any(|m| m.field == "spell_slots_remaining"));
        assert!(!result.state_mutations.iter().any(|m| m.field == "hp_current"));
    }
}
