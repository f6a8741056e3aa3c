//! Spell preparation and casting. Slot bookkeeping lives entirely on
//! `Character.spell_slots_remaining`; the pipeline persists the mutated map
//! through `repos::character` the same way it persists hit points.

use serde_json::json;
use wrldcore_domain::ids::SpellId;
use wrldcore_domain::model::action::{Action, ActionResult, DiceRollRecord, GameContext, Mutation};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::combat_math::damage_roll;
use wrldcore_domain::rules::spellcasting::{
    calculate_spell_attack_bonus, calculate_spell_dc, can_cast_spell, find_usable_slot, scale_cantrip_dice, CastError,
};

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct SpellcastingSystem;

const HANDLED: &[&str] = &["cast_spell", "prepare_spell"];

impl super::GameSystem for SpellcastingSystem {
    fn system_id(&self) -> &'static str {
        "spellcasting"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn resolve(
        &self,
        action: &Action,
        context: &GameContext,
        catalog: &ContentCatalog,
        random: &dyn RandomSource,
    ) -> EngineResult<ActionResult> {
        match action.action_type.as_str() {
            "cast_spell" => resolve_cast(action, context, catalog, random),
            "prepare_spell" => resolve_prepare(action, context, catalog),
            other => Err(EngineError::InvalidAction(format!("spellcasting system cannot handle {other}"))),
        }
    }
}

fn find_spell<'a>(action: &Action, catalog: &'a ContentCatalog) -> EngineResult<&'a wrldcore_domain::model::content_defs::SpellDef> {
    let name = action
        .param_str("spell")
        .ok_or_else(|| EngineError::InvalidInput(format!("{} requires a spell", action.action_type)))?;
    catalog
        .spells
        .values()
        .find(|s| s.id == name || s.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| EngineError::not_found("SpellDef", name))
}

fn resolve_cast(
    action: &Action,
    context: &GameContext,
    catalog: &ContentCatalog,
    random: &dyn RandomSource,
) -> EngineResult<ActionResult> {
    let spell = find_spell(action, catalog)?;
    if !context.knows_spell(&spell.id) {
        return Err(EngineError::InvalidAction(format!("you don't know {}", spell.name)));
    }

    let class_name = context
        .character
        .class_levels
        .keys()
        .next()
        .cloned()
        .unwrap_or_default();

    if !spell.is_cantrip {
        match can_cast_spell(spell.level, context.character.level, &context.character.spell_slots_remaining, &class_name) {
            Ok(()) => {}
            Err(CastError::SlotLevelUnavailable) => {
                return Err(EngineError::InvalidAction(format!("you have no slots of level {}", spell.level)));
            }
            Err(CastError::NoSlotsRemaining) => {
                return Err(EngineError::InsufficientResource(format!("no spell slots remaining to cast {}", spell.name)));
            }
        }
    }

    let ability = context
        .character
        .spellcasting_ability
        .ok_or_else(|| EngineError::InvalidAction("you have no spellcasting ability".into()))?;
    let score = context.character.ability_scores.get(&ability).copied().unwrap_or(10);
    let spell_dc = calculate_spell_dc(score, context.character.proficiency_bonus);
    let attack_bonus = calculate_spell_attack_bonus(score, context.character.proficiency_bonus);

    let mut mutations = Vec::new();
    let mut events = Vec::new();
    let mut dice_rolls = Vec::new();

    if !spell.is_cantrip {
        let used_slot = find_usable_slot(spell.level, &context.character.spell_slots_remaining).unwrap_or(spell.level);
        let mut slots_after = context.character.spell_slots_remaining.clone();
        if let Some(remaining) = slots_after.get_mut(&used_slot) {
            *remaining -= 1;
        }
        mutations.push(Mutation::new(
            "character",
            context.character.id.to_string(),
            "spell_slots_remaining",
            json!(context.character.spell_slots_remaining),
            json!(slots_after),
        ));
    }

    let outcome_description = if let Some(dice) = &spell.damage_dice {
        let dice_expr = scale_cantrip_dice(dice, context.character.level);
        let roll = damage_roll(&dice_expr, attack_bonus, false, random)
            .map_err(|e| EngineError::InvalidAction(format!("bad damage dice for {}: {e:?}", spell.name)))?;
        dice_rolls.push(DiceRollRecord::from_roll(format!("{} damage", spell.name), &roll));

        if let Some(target_id) = &action.target_id {
            if let Some(target) = context.entity_at_location(target_id) {
                let new_hp = (target.hp_current - roll.total).max(0);
                mutations.push(Mutation::new("entity", target.id.to_string(), "hp_current", json!(target.hp_current), json!(new_hp)));
                events.push(
                    GameEvent::new(
                        context.game_id,
                        context.turn_number,
                        EventType::Damage,
                        format!("{} hits {} with {} for {} damage.", context.character.name, target.name, spell.name, roll.total),
                    )
                    .with_actor(context.character.id.to_string())
                    .with_target(target.id.to_string()),
                );
                if new_hp == 0 {
                    mutations.push(Mutation::new("entity", target.id.to_string(), "is_alive", json!(true), json!(false)));
                    events.push(GameEvent::new(context.game_id, context.turn_number, EventType::Death, format!("{} dies.", target.name)).with_target(target.id.to_string()));
                }
            }
        }
        format!("{} casts {}, dealing {} damage.", context.character.name, spell.name, roll.total)
    } else {
        format!("{} casts {}.", context.character.name, spell.name)
    };

    if spell.is_concentration {
        mutations.push(Mutation::new(
            "character",
            context.character.id.to_string(),
            "concentration_spell_id",
            json!(context.character.concentration_spell_id),
            json!(spell.id),
        ));
    }

    events.insert(
        0,
        GameEvent::new(context.game_id, context.turn_number, EventType::SpellCast, outcome_description.clone())
            .with_actor(context.character.id.to_string()),
    );

    let _ = spell_dc;
    Ok(ActionResult {
        success: true,
        outcome_description,
        dice_rolls,
        state_mutations: mutations,
        events,
        xp_gained: 0,
    })
}

fn resolve_prepare(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let spell = find_spell(action, catalog)?;
    if !context.knows_spell(&spell.id) {
        return Err(EngineError::InvalidAction(format!("you don't know {}", spell.name)));
    }
    if context.has_prepared(&spell.id) {
        return Err(EngineError::InvalidAction(format!("{} is already prepared", spell.name)));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("{} prepares {}.", context.character.name, spell.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![Mutation::new(
            "prepared_spell",
            context.character.id.to_string(),
            "spell_id",
            json!(null),
            json!(SpellId::from_content_slug(&spell.id)),
        )],
        events: vec![
            GameEvent::new(context.game_id, context.turn_number, EventType::Custom("prepare_spell".into()), format!("{} prepares {}.", context.character.name, spell.name))
                .with_actor(context.character.id.to_string()),
        ],
        xp_gained: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::test_support::{bare_character, bare_context, bare_location};
    use crate::systems::GameSystem;
    use wrldcore_domain::ids::GameId;
    use wrldcore_domain::model::content_defs::SpellDef;
    use wrldcore_domain::model::progression::KnownSpell;
    use wrldcore_domain::random::RandomSource;

    struct NoopRandom;
    impl RandomSource for NoopRandom {
        fn gen_range(&self, min: i32, _max: i32) -> i32 {
            min
        }
        fn gen_probability(&self) -> f64 {
            0.0
        }
    }

    fn wizard_context(spell_slots_remaining: std::collections::HashMap<i32, i32>) -> wrldcore_domain::model::action::GameContext {
        let game_id = GameId::new();
        let location_id = wrldcore_domain::ids::LocationId::new();
        let mut character = bare_character(game_id, location_id);
        character.spell_slots_remaining = spell_slots_remaining;
        let mut context = bare_context(character, bare_location(game_id, location_id));
        context.known_spells.push(KnownSpell {
            game_id,
            character_id: context.character.id,
            spell_id: SpellId::from_content_slug("magic_missile"),
        });
        context
    }

    fn cast_action(context: &wrldcore_domain::model::action::GameContext, spell: &str) -> Action {
        let mut action = Action::new("cast_spell", context.character.id.to_string(), format!("cast {spell}"));
        action.parameters.insert("spell".to_string(), json!(spell));
        action
    }

    fn magic_missile() -> SpellDef {
        SpellDef {
            id: "magic_missile".to_string(),
            name: "Magic Missile".to_string(),
            level: 1,
            is_cantrip: false,
            is_concentration: false,
            damage_dice: None,
            damage_type: None,
            properties: std::collections::HashMap::new(),
        }
    }

    /// Testable property: a wizard with no level-1 slots left but a level-2
    /// slot open casts a level-1 spell from the level-2 slot, leaving
    /// `slots_remaining[2] == 1` and `slots_remaining[1]` untouched at 0.
    #[test]
    fn casting_a_low_level_spell_upcasts_into_the_next_open_slot() {
        let slots = std::collections::HashMap::from([(1, 0), (2, 2)]);
        let context = wizard_context(slots);
        let mut catalog = ContentCatalog::default();
        catalog.spells.insert("magic_missile".to_string(), magic_missile());

        let action = cast_action(&context, "magic_missile");
        let result = SpellcastingSystem.resolve(&action, &context, &catalog, &NoopRandom).unwrap();

        assert!(result.success);
        let mutation = result
            .state_mutations
            .iter()
            .find(|m| m.field == "spell_slots_remaining")
            .expect("slot mutation");
        let new_slots: std::collections::HashMap<i32, i32> = serde_json::from_value(mutation.new_value.clone()).unwrap();
        assert_eq!(new_slots[&1], 0);
        assert_eq!(new_slots[&2], 1);
    }

    #[test]
    fn casting_with_no_usable_slot_is_rejected() {
        let slots = std::collections::HashMap::from([(1, 0), (2, 0)]);
        let context = wizard_context(slots);
        let mut catalog = ContentCatalog::default();
        catalog.spells.insert("magic_missile".to_string(), magic_missile());

        let action = cast_action(&context, "magic_missile");
        let err = SpellcastingSystem.resolve(&action, &context, &catalog, &NoopRandom).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientResource(_)));
    }
}
