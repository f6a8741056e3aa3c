//! Turning recipe inputs into an output item. The DC check is a flat d20
//! against the recipe's stored difficulty, modified by the character's trade
//! skill level; `consumes_on_failure` decides whether failed attempts still
//! burn the ingredients.

use serde_json::json;
use wrldcore_domain::ids::ItemId;
use wrldcore_domain::model::action::{Action, ActionResult, DiceRollRecord, GameContext, Mutation};
use wrldcore_domain::model::content_defs::RecipeDef;
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::dice::roll_d20_resolved;

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct CraftingSystem;

const HANDLED: &[&str] = &["craft"];

impl super::GameSystem for CraftingSystem {
    fn system_id(&self) -> &'static str {
        "crafting"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn resolve(&self, action: &Action, context: &GameContext, catalog: &ContentCatalog, random: &dyn RandomSource) -> EngineResult<ActionResult> {
        let recipe_key = action
            .param_str("recipe")
            .ok_or_else(|| EngineError::InvalidInput("craft requires a recipe".into()))?;
        let recipe = catalog
            .recipes
            .values()
            .find(|r| r.id == recipe_key || r.name.eq_ignore_ascii_case(recipe_key))
            .ok_or_else(|| EngineError::not_found("RecipeDef", recipe_key))?;

        check_ingredients(recipe, context)?;

        let trade_skill_level = context
            .trade_skills
            .iter()
            .find(|ts| ts.skill_name.eq_ignore_ascii_case(&recipe.trade_skill))
            .map(|ts| ts.level)
            .unwrap_or(0);

        let roll = roll_d20_resolved(trade_skill_level, false, false, random);
        let success = roll.total >= recipe.dc;

        let mut mutations = Vec::new();
        if success || recipe.consumes_on_failure {
            for ingredient in &recipe.inputs {
                let ingredient_id = ItemId::from_content_slug(&ingredient.item_id);
                mutations.push(Mutation::new(
                    "inventory",
                    context.character.id.to_string(),
                    "remove_item",
                    json!(null),
                    json!({ "item_id": ingredient_id, "quantity": ingredient.quantity }),
                ));
            }
        }

        let outcome_description = if success {
            let output_id = ItemId::from_content_slug(&recipe.output_item_id);
            mutations.push(Mutation::new(
                "inventory",
                context.character.id.to_string(),
                "add_item",
                json!(null),
                json!({ "item_id": output_id, "quantity": recipe.output_quantity }),
            ));
            format!("{} crafts {}.", context.character.name, recipe.name)
        } else {
            format!("{} fails to craft {}.", context.character.name, recipe.name)
        };

        Ok(ActionResult {
            success,
            outcome_description: outcome_description.clone(),
            dice_rolls: vec![DiceRollRecord::from_roll(format!("craft {}", recipe.name), &roll)],
            state_mutations: mutations,
            events: vec![
                GameEvent::new(context.game_id, context.turn_number, EventType::Custom("craft".into()), outcome_description)
                    .with_actor(context.character.id.to_string()),
            ],
            xp_gained: if success { 5 } else { 0 },
        })
    }
}

fn check_ingredients(recipe: &RecipeDef, context: &GameContext) -> EngineResult<()> {
    for ingredient in &recipe.inputs {
        let item_id = ItemId::from_content_slug(&ingredient.item_id);
        if context.inventory.quantity_of(item_id) < ingredient.quantity {
            return Err(EngineError::InsufficientResource(format!(
                "need {}x {} to craft {}",
                ingredient.quantity, ingredient.item_id, recipe.name
            )));
        }
    }
    Ok(())
}
