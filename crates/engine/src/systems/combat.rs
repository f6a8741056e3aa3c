//! Turn-based combat: initiative at encounter start, player attacks
//! and flee attempts on the player's turn, deterministic NPC turns resolved
//! inline by the pipeline immediately after.

use serde_json::json;
use wrldcore_domain::model::action::{Action, ActionResult, DiceRollRecord, GameContext, Mutation};
use wrldcore_domain::model::combat::{Combatant, CombatState};
use wrldcore_domain::model::event::EventType;
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::combat_math::{attack_roll, calculate_flee_dc, damage_roll, npc_choose_action, NpcAction};
use wrldcore_domain::rules::conditions::{can_take_actions, has_attack_advantage, has_attack_disadvantage};
use wrldcore_domain::rules::dice::roll_d20_resolved;
use wrldcore_domain::rules::skills::{skill_check, Skill};
use wrldcore_domain::rules::wounds::check_for_wound;

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct CombatSystem;

const HANDLED: &[&str] = &["attack", "flee"];

impl super::GameSystem for CombatSystem {
    fn system_id(&self) -> &'static str {
        "combat"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn can_handle(&self, action: &Action, context: &GameContext) -> bool {
        match action.action_type.as_str() {
            "attack" => true,
            "flee" => context.active_combat.as_ref().is_some_and(|c| c.is_active()),
            _ => false,
        }
    }

    fn resolve(
        &self,
        action: &Action,
        context: &GameContext,
        _catalog: &ContentCatalog,
        random: &dyn RandomSource,
    ) -> EngineResult<ActionResult> {
        match action.action_type.as_str() {
            "attack" => resolve_attack(action, context, random),
            "flee" => resolve_flee(context, random),
            other => Err(EngineError::InvalidAction(format!("combat system cannot handle {other}"))),
        }
    }
}

fn require_combat<'a>(context: &'a GameContext) -> EngineResult<&'a wrldcore_domain::model::combat::CombatInstance> {
    context
        .active_combat
        .as_ref()
        .filter(|c| c.is_active())
        .ok_or_else(|| EngineError::InvalidAction("no active encounter".into()))
}

fn actor_is_incapacitated(context: &GameContext) -> bool {
    !can_take_actions(&context.character.active_conditions)
}

fn resolve_attack(action: &Action, context: &GameContext, random: &dyn RandomSource) -> EngineResult<ActionResult> {
    let combat = require_combat(context)?;
    if !combat.is_actors_turn(&context.character.id.to_string()) {
        return Ok(ActionResult::empty_failure("It's not your turn."));
    }
    if actor_is_incapacitated(context) {
        return Ok(ActionResult::empty_failure("You are incapacitated and cannot take actions."));
    }

    let target_id = action
        .target_id
        .as_deref()
        .ok_or_else(|| EngineError::InvalidInput("attack requires a target".into()))?;
    let target = context
        .entity_at_location(target_id)
        .ok_or_else(|| EngineError::not_found("Entity", target_id))?;

    let advantage = has_attack_advantage(&context.character.active_conditions);
    let disadvantage = has_attack_disadvantage(&context.character.active_conditions);
    let str_mod = context.character.ability_modifier(wrldcore_domain::rules::ability_scores::Ability::Strength);
    let attack_bonus = str_mod + context.character.proficiency_bonus;

    let outcome = attack_roll(attack_bonus, target.armor_class, advantage, disadvantage, random);
    let mut dice_rolls = vec![DiceRollRecord::from_roll("attack", &outcome.roll)];
    let mut events = Vec::new();
    let mut mutations = Vec::new();

    let weapon_damage_dice = "1d8";
    if !outcome.hit {
        events.push(
            wrldcore_domain::model::event::GameEvent::new(
                context.game_id,
                context.turn_number,
                EventType::Attack,
                format!("{} misses {}.", context.character.name, target.name),
            )
            .with_actor(context.character.id.to_string())
            .with_target(target.id.to_string())
            .with_location(context.current_location.id),
        );
        return Ok(ActionResult {
            success: true,
            outcome_description: format!("Your attack misses {}.", target.name),
            dice_rolls,
            state_mutations: mutations,
            events,
            xp_gained: 0,
        });
    }

    let damage = damage_roll(weapon_damage_dice, str_mod, outcome.critical, random)
        .map_err(|e| EngineError::SchemaFailure(e.to_string()))?;
    dice_rolls.push(DiceRollRecord::from_roll("damage", &damage));

    let new_hp = (target.hp_current - damage.total).max(0);
    mutations.push(Mutation::new(
        "entity",
        target.id.to_string(),
        "hp_current",
        json!(target.hp_current),
        json!(new_hp),
    ));

    let died = new_hp == 0;
    if died {
        mutations.push(Mutation::new("entity", target.id.to_string(), "is_alive", json!(true), json!(false)));
    }

    events.push(
        wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Attack,
            format!("{} hits {}.", context.character.name, target.name),
        )
        .with_actor(context.character.id.to_string())
        .with_target(target.id.to_string())
        .with_location(context.current_location.id),
    );
    events.push(
        wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Damage,
            format!("{} takes {} damage.", target.name, damage.total),
        )
        .with_actor(context.character.id.to_string())
        .with_target(target.id.to_string())
        .with_location(context.current_location.id)
        .with_details(json!({ "damage": damage.total, "critical": outcome.critical })),
    );

    if let Some(wound) = check_for_wound(damage.total, target.hp_max, random) {
        events.push(
            wrldcore_domain::model::event::GameEvent::new(
                context.game_id,
                context.turn_number,
                EventType::Damage,
                wound.wound_type.description(),
            )
            .with_target(target.id.to_string()),
        );
    }

    // Monster XP scales with level; a fixed multiplier keeps the reward
    // deterministic from the target alone, matching the pipeline's
    // reproducible-from-inputs contract.
    let xp_gained = if died { (target.level * 10).max(10) } else { 0 };
    if died {
        events.push(
            wrldcore_domain::model::event::GameEvent::new(context.game_id, context.turn_number, EventType::Death, format!("{} slays {}.", context.character.name, target.name))
                .with_actor(context.character.id.to_string())
                .with_target(target.id.to_string())
                .with_location(context.current_location.id),
        );
    }

    Ok(ActionResult {
        success: true,
        outcome_description: if died {
            format!("You slay {}!", target.name)
        } else {
            format!("You hit {} for {} damage.", target.name, damage.total)
        },
        dice_rolls,
        state_mutations: mutations,
        events,
        xp_gained,
    })
}

fn resolve_flee(context: &GameContext, random: &dyn RandomSource) -> EngineResult<ActionResult> {
    let combat = require_combat(context)?;
    let enemy_count = combat.combatants.iter().filter(|c| !c.is_player_side && c.is_alive).count() as i32;
    let dc = calculate_flee_dc(enemy_count);

    let is_proficient = context.character.is_proficient_skill(Skill::Acrobatics);
    let dex_score = context
        .character
        .ability_scores
        .get(&wrldcore_domain::rules::ability_scores::Ability::Dexterity)
        .copied()
        .unwrap_or(10);
    let outcome = skill_check(dex_score, context.character.proficiency_bonus, is_proficient, dc, false, false, random);

    if outcome.success {
        Ok(ActionResult {
            success: true,
            outcome_description: "You break away from the fight.".into(),
            dice_rolls: vec![DiceRollRecord::from_roll("flee", &outcome.roll)],
            state_mutations: vec![Mutation::new(
                "combat",
                combat.id.to_string(),
                "state",
                json!(combat.state),
                json!(CombatState::Resolved),
            )],
            events: vec![wrldcore_domain::model::event::GameEvent::new(
                context.game_id,
                context.turn_number,
                EventType::CombatEnd,
                format!("{} flees the encounter.", context.character.name),
            )
            .with_actor(context.character.id.to_string())],
            xp_gained: 0,
        })
    } else {
        Ok(ActionResult {
            success: false,
            outcome_description: "You fail to escape.".into(),
            dice_rolls: vec![DiceRollRecord::from_roll("flee", &outcome.roll)],
            state_mutations: Vec::new(),
            events: Vec::new(),
            xp_gained: 0,
        })
    }
}

/// Build the initial combatant roster and turn order for a newly triggered
/// encounter. Called by the pipeline, not through `GameSystem::resolve`,
/// since starting combat isn't itself a player action.
pub fn start_combat(
    player_id: String,
    player_initiative_mod: i32,
    enemies: &[(String, i32)],
    random: &dyn RandomSource,
) -> (Vec<Combatant>, Vec<String>) {
    let player_roll = roll_d20_resolved(player_initiative_mod, false, false, random);
    let mut combatants = vec![Combatant {
        id: player_id.clone(),
        is_player_side: true,
        initiative: player_roll.total,
        is_alive: true,
    }];
    let mut order_input = vec![(player_id, player_roll.total)];

    for (id, init_mod) in enemies {
        let roll = roll_d20_resolved(*init_mod, false, false, random);
        combatants.push(Combatant {
            id: id.clone(),
            is_player_side: false,
            initiative: roll.total,
            is_alive: true,
        });
        order_input.push((id.clone(), roll.total));
    }

    let turn_order = wrldcore_domain::rules::combat_math::determine_turn_order(&order_input, random);
    (combatants, turn_order)
}

/// Run a single NPC's turn deterministically via `npc_choose_action`,
/// returning the mutations/events for the pipeline to apply. `npc` is the
/// acting entity; `targets` are the player-side HP pool it can choose among.
pub fn resolve_npc_turn(
    npc_id: &str,
    npc_name: &str,
    npc_hp_current: i32,
    npc_hp_max: i32,
    npc_attack_bonus: i32,
    npc_damage_dice: &str,
    targets: &[(String, i32, i32)],
    game_id: wrldcore_domain::ids::GameId,
    turn_number: i64,
    random: &dyn RandomSource,
) -> EngineResult<ActionResult> {
    let target_hp: Vec<(String, i32)> = targets.iter().map(|(id, hp, _)| (id.clone(), *hp)).collect();
    Ok(match npc_choose_action(npc_hp_current, npc_hp_max, &target_hp) {
        NpcAction::Flee => ActionResult {
            success: true,
            outcome_description: format!("{npc_name} flees."),
            dice_rolls: Vec::new(),
            state_mutations: Vec::new(),
            events: vec![wrldcore_domain::model::event::GameEvent::new(
                game_id,
                turn_number,
                EventType::CombatEnd,
                format!("{npc_name} flees the fight."),
            )
            .with_actor(npc_id.to_string())],
            xp_gained: 0,
        },
        NpcAction::Dodge => ActionResult::empty_success(format!("{npc_name} hesitates.")),
        NpcAction::Attack { target_id } => {
            let target_ac = targets.iter().find(|(id, _, _)| id == &target_id).map(|(_, _, ac)| *ac).unwrap_or(10);
            let outcome = attack_roll(npc_attack_bonus, target_ac, false, false, random);
            let mut dice_rolls = vec![DiceRollRecord::from_roll("npc_attack", &outcome.roll)];
            if !outcome.hit {
                return Ok(ActionResult {
                    success: true,
                    outcome_description: format!("{npc_name} misses."),
                    dice_rolls,
                    state_mutations: Vec::new(),
                    events: Vec::new(),
                    xp_gained: 0,
                });
            }
            let damage = damage_roll(npc_damage_dice, 0, outcome.critical, random)
                .map_err(|e| EngineError::SchemaFailure(e.to_string()))?;
            dice_rolls.push(DiceRollRecord::from_roll("npc_damage", &damage));
            let target_hp = targets.iter().find(|(id, _, _)| id == &target_id).map(|(_, hp, _)| *hp).unwrap_or(0);
            let new_hp = (target_hp - damage.total).max(0);
            ActionResult {
                success: true,
                outcome_description: format!("{npc_name} hits {target_id} for {} damage.", damage.total),
                dice_rolls,
                state_mutations: vec![Mutation::new("character", target_id.clone(), "hp_current", json!(target_hp), json!(new_hp))],
                events: vec![wrldcore_domain::model::event::GameEvent::new(game_id, turn_number, EventType::Attack, format!("{npc_name} hits {target_id}."))
                    .with_actor(npc_id.to_string())
                    .with_target(target_id)],
                xp_gained: 0,
            }
        }
    })
}
