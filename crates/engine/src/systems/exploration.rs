//! Movement, locked connections, and passive discovery. Connection
//! data for the current location is preloaded onto `GameContext.connections`
//! by the pipeline's context-load step; this system never queries the store.

use serde_json::json;
use wrldcore_domain::model::action::{Action, ActionResult, DiceRollRecord, GameContext, Mutation};
use wrldcore_domain::model::event::EventType;
use wrldcore_domain::model::location::Direction;
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::skills::skill_check;

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct ExplorationSystem;

const HANDLED: &[&str] = &["move", "look", "search"];

impl super::GameSystem for ExplorationSystem {
    fn system_id(&self) -> &'static str {
        "exploration"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn can_handle(&self, action: &Action, context: &GameContext) -> bool {
        if context.active_combat.as_ref().is_some_and(|c| c.is_active()) {
            return false;
        }
        HANDLED.contains(&action.action_type.as_str())
    }

    fn resolve(
        &self,
        action: &Action,
        context: &GameContext,
        _catalog: &ContentCatalog,
        random: &dyn RandomSource,
    ) -> EngineResult<ActionResult> {
        match action.action_type.as_str() {
            "move" => resolve_move(action, context, random),
            "look" => Ok(resolve_look(context)),
            "search" => resolve_search(context, random),
            other => Err(EngineError::InvalidAction(format!("exploration system cannot handle {other}"))),
        }
    }

    fn available_action_hints(&self, context: &GameContext) -> Vec<String> {
        context
            .connections
            .iter()
            .map(|c| format!("go {}", c.direction.as_str()))
            .collect()
    }
}

fn resolve_move(action: &Action, context: &GameContext, random: &dyn RandomSource) -> EngineResult<ActionResult> {
    let direction_str = action
        .param_str("direction")
        .ok_or_else(|| EngineError::InvalidInput("move requires a direction".into()))?;
    let direction = Direction::parse(direction_str)
        .ok_or_else(|| EngineError::InvalidInput(format!("unrecognized direction '{direction_str}'")))?;

    let connection = context
        .connections
        .iter()
        .find(|c| c.direction == direction)
        .ok_or_else(|| EngineError::InvalidAction(format!("no passage {direction_str} from here")))?;

    if connection.is_locked {
        let Some(unlock) = try_unlock(connection, context, random)? else {
            return Ok(ActionResult::empty_failure(format!(
                "The way {direction_str} is locked.",
            )));
        };
        return Ok(unlock);
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You head {direction_str}."),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new(
                "character",
                context.character.id.to_string(),
                "current_location_id",
                json!(context.current_location.id),
                json!(connection.target_location_id),
            ),
            Mutation::new(
                "location",
                connection.target_location_id.to_string(),
                "visited",
                json!(false),
                json!(true),
            ),
        ],
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Move,
            format!("{} moves {direction_str}.", context.character.name),
        )
        .with_actor(context.character.id.to_string())
        .with_location(connection.target_location_id)],
        xp_gained: 0,
    })
}

/// Key item first, then a skill check against the configured DC: an
/// available key always short-circuits the check.
fn try_unlock(
    connection: &wrldcore_domain::model::location::LocationConnection,
    context: &GameContext,
    random: &dyn RandomSource,
) -> EngineResult<Option<ActionResult>> {
    let Some(lock) = &connection.lock else {
        return Ok(None);
    };

    if let Some(key_item_id) = lock.key_item_id {
        if context.inventory.quantity_of(key_item_id) > 0 {
            return Ok(Some(unlock_result(connection, context, "You unlock the way with your key.")));
        }
    }

    if let Some((skill, dc)) = lock.skill {
        let ability = skill.governing_ability();
        let score = context.character.ability_scores.get(&ability).copied().unwrap_or(10);
        let is_proficient = context.character.is_proficient_skill(skill);
        let outcome = skill_check(score, context.character.proficiency_bonus, is_proficient, dc as i32, false, false, random);
        if outcome.success {
            let mut result = unlock_result(connection, context, "You pick the lock.");
            result.dice_rolls.push(DiceRollRecord::from_roll("unlock", &outcome.roll));
            return Ok(Some(result));
        }
        return Ok(Some(ActionResult {
            success: false,
            outcome_description: "You fail to force the lock.".into(),
            dice_rolls: vec![DiceRollRecord::from_roll("unlock", &outcome.roll)],
            state_mutations: Vec::new(),
            events: vec![wrldcore_domain::model::event::GameEvent::new(
                context.game_id,
                context.turn_number,
                EventType::ExplorationFail,
                format!("{} fails to force the lock.", context.character.name),
            )
            .with_actor(context.character.id.to_string())],
            xp_gained: 0,
        }));
    }

    Ok(None)
}

fn unlock_result(connection: &wrldcore_domain::model::location::LocationConnection, context: &GameContext, message: &str) -> ActionResult {
    ActionResult {
        success: true,
        outcome_description: message.to_string(),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new("connection", connection.id.to_string(), "is_locked", json!(true), json!(false)),
            Mutation::new(
                "character",
                context.character.id.to_string(),
                "current_location_id",
                json!(context.current_location.id),
                json!(connection.target_location_id),
            ),
        ],
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Discovery,
            message.to_string(),
        )
        .with_actor(context.character.id.to_string())],
        xp_gained: 0,
    }
}

fn resolve_look(context: &GameContext) -> ActionResult {
    let mut description = context.current_location.description.clone();
    if !context.entities_here.is_empty() {
        let names: Vec<&str> = context.entities_here.iter().map(|e| e.name.as_str()).collect();
        description.push_str(&format!(" You see: {}.", names.join(", ")));
    }
    ActionResult::empty_success(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;
    use crate::systems::test_support::{bare_character, bare_context, bare_location};
    use wrldcore_domain::ids::{ConnectionId, GameId, ItemId, LocationId};
    use wrldcore_domain::model::location::LockSpec;
    use wrldcore_domain::rules::skills::Skill;

    fn move_action(direction: &str) -> Action {
        let mut action = Action::new("move", "actor", format!("go {direction}"));
        action.parameters.insert("direction".to_string(), json!(direction));
        action
    }

    fn unlocked_connection(target: LocationId) -> wrldcore_domain::model::location::LocationConnection {
        wrldcore_domain::model::location::LocationConnection {
            id: ConnectionId::new(),
            game_id: GameId::new(),
            source_location_id: LocationId::new(),
            target_location_id: target,
            direction: Direction::North,
            description: String::new(),
            is_locked: false,
            lock: None,
        }
    }

    #[test]
    fn moving_through_an_open_connection_relocates_the_character() {
        let game_id = GameId::new();
        let here = LocationId::new();
        let there = LocationId::new();
        let character = bare_character(game_id, here);
        let mut context = bare_context(character, bare_location(game_id, here));
        context.connections = vec![unlocked_connection(there)];

        let result = resolve_move(&move_action("north"), &context, &FixedRandom::new(Vec::new(), Vec::new())).unwrap();

        assert!(result.success);
        let move_mutation = result.state_mutations.iter().find(|m| m.field == "current_location_id").unwrap();
        assert_eq!(move_mutation.new_value, json!(there));
        assert_eq!(result.events[0].event_type, EventType::Move);
    }

    #[test]
    fn a_carried_key_unlocks_the_way_without_a_skill_check() {
        let game_id = GameId::new();
        let here = LocationId::new();
        let there = LocationId::new();
        let key = ItemId::from_content_slug("iron_key");
        let character = bare_character(game_id, here);
        let mut context = bare_context(character, bare_location(game_id, here));
        context.inventory.items.push(wrldcore_domain::model::inventory::ItemStack { item_id: key, quantity: 1 });
        let mut conn = unlocked_connection(there);
        conn.is_locked = true;
        conn.lock = Some(LockSpec { key_item_id: Some(key), skill: None });
        context.connections = vec![conn];

        let result = resolve_move(&move_action("north"), &context, &FixedRandom::new(Vec::new(), Vec::new())).unwrap();
        assert!(result.success);
        assert!(result.state_mutations.iter().any(|m| m.field == "is_locked" && m.new_value == json!(false)));
    }

    #[test]
    fn a_failed_lockpick_check_leaves_the_connection_locked() {
        let game_id = GameId::new();
        let here = LocationId::new();
        let there = LocationId::new();
        let character = bare_character(game_id, here);
        let mut context = bare_context(character, bare_location(game_id, here));
        let mut conn = unlocked_connection(there);
        conn.is_locked = true;
        conn.lock = Some(LockSpec { key_item_id: None, skill: Some((Skill::SleightOfHand, 20)) });
        context.connections = vec![conn];

        // d20 roll of 1 plus a +2 dex modifier (14 score) is nowhere near DC 20.
        let result = resolve_move(&move_action("north"), &context, &FixedRandom::new(vec![1], Vec::new())).unwrap();
        assert!(!result.success);
        assert!(result.state_mutations.is_empty());
    }
}

fn resolve_search(context: &GameContext, random: &dyn RandomSource) -> EngineResult<ActionResult> {
    use wrldcore_domain::rules::skills::Skill;

    let ability = Skill::Perception.governing_ability();
    let score = context.character.ability_scores.get(&ability).copied().unwrap_or(10);
    let is_proficient = context.character.is_proficient_skill(Skill::Perception);
    let outcome = skill_check(score, context.character.proficiency_bonus, is_proficient, 13, false, false, random);

    if !outcome.success {
        return Ok(ActionResult {
            success: false,
            outcome_description: "You find nothing of note.".into(),
            dice_rolls: vec![DiceRollRecord::from_roll("search", &outcome.roll)],
            state_mutations: Vec::new(),
            events: Vec::new(),
            xp_gained: 0,
        });
    }

    Ok(ActionResult {
        success: true,
        outcome_description: "Your search turns something up.".into(),
        dice_rolls: vec![DiceRollRecord::from_roll("search", &outcome.roll)],
        state_mutations: Vec::new(),
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Discovery,
            format!("{} discovers something hidden.", context.character.name),
        )
        .with_actor(context.character.id.to_string())
        .with_location(context.current_location.id)],
        xp_gained: 0,
    })
}
