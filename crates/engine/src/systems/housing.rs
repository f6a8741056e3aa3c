//! Purchasing the one home a character may own. Storage and upgrades are
//! handled by `InventorySystem`/future upgrade actions once the home exists;
//! this system only gates the initial purchase.

use serde_json::json;
use wrldcore_domain::ids::HousingId;
use wrldcore_domain::model::action::{Action, ActionResult, GameContext, Mutation};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::random::RandomSource;

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct HousingSystem;

const HANDLED: &[&str] = &["purchase_housing"];
const BASE_HOME_COST: i32 = 500;

impl super::GameSystem for HousingSystem {
    fn system_id(&self) -> &'static str {
        "housing"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn resolve(&self, _action: &Action, context: &GameContext, _catalog: &ContentCatalog, _random: &dyn RandomSource) -> EngineResult<ActionResult> {
        if context.housing.is_some() {
            return Err(EngineError::InvalidAction("you already own a home".into()));
        }
        if context.character.gold < BASE_HOME_COST {
            return Err(EngineError::InsufficientResource(format!(
                "a home costs {BASE_HOME_COST} gold, you have {}",
                context.character.gold
            )));
        }

        Ok(ActionResult {
            success: true,
            outcome_description: format!("{} purchases a home for {BASE_HOME_COST} gold.", context.character.name),
            dice_rolls: Vec::new(),
            state_mutations: vec![
                Mutation::new(
                    "character",
                    context.character.id.to_string(),
                    "gold",
                    json!(context.character.gold),
                    json!(context.character.gold - BASE_HOME_COST),
                ),
                Mutation::new(
                    "housing",
                    HousingId::new().to_string(),
                    "purchase",
                    json!(null),
                    json!({ "character_id": context.character.id, "name": format!("{}'s home", context.character.name) }),
                ),
            ],
            events: vec![
                GameEvent::new(context.game_id, context.turn_number, EventType::Custom("purchase_housing".into()), format!("{} purchases a home.", context.character.name))
                    .with_actor(context.character.id.to_string()),
            ],
            xp_gained: 0,
        })
    }
}
