//! Recruiting and dismissing companions. Recruitment requires the target
//! NPC's affinity to clear `RECRUIT_THRESHOLD` and the party to have a free
//! slot under `MAX_ACTIVE_COMPANIONS`.

use serde_json::json;
use wrldcore_domain::ids::CompanionId;
use wrldcore_domain::model::action::{Action, ActionResult, GameContext, Mutation};
use wrldcore_domain::model::companion::MAX_ACTIVE_COMPANIONS;
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::affinity::can_recruit;

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct CompanionSystem;

const HANDLED: &[&str] = &["recruit_companion", "dismiss_companion"];

impl super::GameSystem for CompanionSystem {
    fn system_id(&self) -> &'static str {
        "companion"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn resolve(&self, action: &Action, context: &GameContext, _catalog: &ContentCatalog, _random: &dyn RandomSource) -> EngineResult<ActionResult> {
        match action.action_type.as_str() {
            "recruit_companion" => resolve_recruit(action, context),
            "dismiss_companion" => resolve_dismiss(action, context),
            other => Err(EngineError::InvalidAction(format!("companion system cannot handle {other}"))),
        }
    }
}

fn resolve_recruit(action: &Action, context: &GameContext) -> EngineResult<ActionResult> {
    let target_id = action
        .target_id
        .as_deref()
        .ok_or_else(|| EngineError::InvalidInput("recruit requires a target".into()))?;
    let npc = context.entity_at_location(target_id).ok_or_else(|| EngineError::not_found("Entity", target_id))?;

    let active_count = context.companions.iter().filter(|c| c.is_active).count();
    if active_count >= MAX_ACTIVE_COMPANIONS {
        return Err(EngineError::InvalidAction(format!(
            "your party is full ({MAX_ACTIVE_COMPANIONS} companions max)"
        )));
    }

    let affinity = context.npc_reputation(&npc.id.to_string());
    if !can_recruit(affinity) {
        return Err(EngineError::InvalidAction(format!("{} doesn't trust you enough yet", npc.name)));
    }
    if context.companions.iter().any(|c| c.entity_id == npc.id) {
        return Err(EngineError::InvalidAction(format!("{} has already joined you", npc.name)));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("{} joins your party.", npc.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![Mutation::new(
            "companion",
            CompanionId::new().to_string(),
            "recruit",
            json!(null),
            json!({ "entity_id": npc.id, "character_id": context.character.id, "affinity_at_recruitment": affinity }),
        )],
        events: vec![
            GameEvent::new(context.game_id, context.turn_number, EventType::Custom("recruit_companion".into()), format!("{} recruits {}.", context.character.name, npc.name))
                .with_actor(context.character.id.to_string())
                .with_target(npc.id.to_string()),
        ],
        xp_gained: 0,
    })
}

fn resolve_dismiss(action: &Action, context: &GameContext) -> EngineResult<ActionResult> {
    let target_id = action
        .target_id
        .as_deref()
        .ok_or_else(|| EngineError::InvalidInput("dismiss requires a target".into()))?;
    let npc = context.entity_at_location(target_id);
    let companion = context
        .companions
        .iter()
        .find(|c| c.is_active && npc.map(|n| n.id == c.entity_id).unwrap_or(false))
        .ok_or_else(|| EngineError::not_found("Companion", target_id))?;

    Ok(ActionResult {
        success: true,
        outcome_description: "You part ways with your companion.".to_string(),
        dice_rolls: Vec::new(),
        state_mutations: vec![Mutation::new("companion", companion.id.to_string(), "is_active", json!(true), json!(false))],
        events: vec![
            GameEvent::new(context.game_id, context.turn_number, EventType::Custom("dismiss_companion".into()), format!("{} dismisses a companion.", context.character.name))
                .with_actor(context.character.id.to_string()),
        ],
        xp_gained: 0,
    })
}
