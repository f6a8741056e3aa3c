//! Dialogue, persuasion/intimidation checks, and gift-giving. Affinity
//! (`rules::affinity`) tracks the individual NPC relationship; faction
//! reputation is a separate, broader ledger touched by the pipeline's
//! post-turn consequence handlers rather than here.

use serde_json::json;
use wrldcore_domain::model::action::{Action, ActionResult, DiceRollRecord, GameContext, Mutation};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::affinity::{affinity_from_action, affinity_from_gift, clamp_affinity, AffinityAction};
use wrldcore_domain::rules::skills::{skill_check, Skill};

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct SocialSystem;

const HANDLED: &[&str] = &["talk", "persuade", "intimidate", "give_item"];

impl super::GameSystem for SocialSystem {
    fn system_id(&self) -> &'static str {
        "social"
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
            "talk" => resolve_talk(action, context),
            "persuade" => resolve_skill_social(action, context, Skill::Persuasion, random),
            "intimidate" => resolve_skill_social(action, context, Skill::Intimidation, random),
            "give_item" => resolve_give(action, context, catalog),
            other => Err(EngineError::InvalidAction(format!("social system cannot handle {other}"))),
        }
    }
}

fn require_npc<'a>(action: &Action, context: &'a GameContext) -> EngineResult<&'a wrldcore_domain::model::inventory::Entity> {
    let target_id = action
        .target_id
        .as_deref()
        .ok_or_else(|| EngineError::InvalidInput(format!("{} requires a target", action.action_type)))?;
    context.entity_at_location(target_id).ok_or_else(|| EngineError::not_found("Entity", target_id))
}

fn resolve_talk(action: &Action, context: &GameContext) -> EngineResult<ActionResult> {
    let npc = require_npc(action, context)?;
    let affinity = context.npc_reputation(&npc.id.to_string());

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You speak with {}.", npc.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![Mutation::new(
            "npc_reputation",
            npc.id.to_string(),
            "value",
            json!(affinity),
            json!(clamp_affinity(affinity + affinity_from_action(AffinityAction::Conversation))),
        )],
        events: vec![GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Custom("dialogue".into()),
            format!("{} talks with {}.", context.character.name, npc.name),
        )
        .with_actor(context.character.id.to_string())
        .with_target(npc.id.to_string())],
        xp_gained: 0,
    })
}

fn resolve_skill_social(action: &Action, context: &GameContext, skill: Skill, random: &dyn RandomSource) -> EngineResult<ActionResult> {
    let npc = require_npc(action, context)?;
    let ability = skill.governing_ability();
    let score = context.character.ability_scores.get(&ability).copied().unwrap_or(10);
    let is_proficient = context.character.is_proficient_skill(skill);
    let dc = 10 + npc.level.max(0);
    let outcome = skill_check(score, context.character.proficiency_bonus, is_proficient, dc, false, false, random);
    let affinity = context.npc_reputation(&npc.id.to_string());

    let affinity_action = match (skill, outcome.success) {
        (Skill::Persuasion, true) => Some(AffinityAction::SuccessfulPersuasion),
        (Skill::Intimidation, false) => Some(AffinityAction::FailedIntimidation),
        _ => None,
    };
    let mut mutations = Vec::new();
    if let Some(delta_action) = affinity_action {
        mutations.push(Mutation::new(
            "npc_reputation",
            npc.id.to_string(),
            "value",
            json!(affinity),
            json!(clamp_affinity(affinity + affinity_from_action(delta_action))),
        ));
    }

    let verb = if skill == Skill::Persuasion { "persuade" } else { "intimidate" };
    Ok(ActionResult {
        success: outcome.success,
        outcome_description: if outcome.success {
            format!("You successfully {verb} {}.", npc.name)
        } else {
            format!("You fail to {verb} {}.", npc.name)
        },
        dice_rolls: vec![DiceRollRecord::from_roll(verb, &outcome.roll)],
        state_mutations: mutations,
        events: vec![GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Custom(verb.into()),
            format!("{} attempts to {verb} {}.", context.character.name, npc.name),
        )
        .with_actor(context.character.id.to_string())
        .with_target(npc.id.to_string())],
        xp_gained: 0,
    })
}

fn resolve_give(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let npc = require_npc(action, context)?;
    let item_key = action
        .param_str("item")
        .ok_or_else(|| EngineError::InvalidInput("give requires an item".into()))?;
    let item = catalog
        .items
        .values()
        .find(|i| i.id == item_key || i.name.eq_ignore_ascii_case(item_key))
        .ok_or_else(|| EngineError::not_found("ItemDef", item_key))?;
    let item_id = wrldcore_domain::ids::ItemId::from_content_slug(&item.id);
    if context.inventory.quantity_of(item_id) == 0 {
        return Err(EngineError::InsufficientResource(format!("you don't have {}", item.name)));
    }

    let preferred: Vec<String> = Vec::new();
    let disliked: Vec<String> = Vec::new();
    let delta = affinity_from_gift(&item.id, &preferred, &disliked);
    let affinity = context.npc_reputation(&npc.id.to_string());

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You give {} to {}.", item.name, npc.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new(
                "inventory",
                context.character.id.to_string(),
                "remove_item",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
            Mutation::new(
                "npc_reputation",
                npc.id.to_string(),
                "value",
                json!(affinity),
                json!(clamp_affinity(affinity + delta)),
            ),
        ],
        events: vec![GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Custom("gift".into()),
            format!("{} gives {} to {}.", context.character.name, item.name, npc.name),
        )
        .with_actor(context.character.id.to_string())
        .with_target(npc.id.to_string())],
        xp_gained: 0,
    })
}
