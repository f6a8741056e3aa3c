//! Buying and selling at a location's shop. Prices combine the
//! shopkeeper's faction reputation multiplier, individual NPC affinity
//! discount, and the stock's supply/demand pressure.

use serde_json::json;
use wrldcore_domain::ids::ItemId;
use wrldcore_domain::model::action::{Action, ActionResult, GameContext, Mutation};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::affinity::shop_discount;
use wrldcore_domain::rules::economy::{calculate_buy_price, calculate_sell_price, supply_demand_modifier};
use wrldcore_domain::rules::reputation::effects;

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct ShopSystem;

const HANDLED: &[&str] = &["buy_item", "sell_item"];

impl super::GameSystem for ShopSystem {
    fn system_id(&self) -> &'static str {
        "shop"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn can_handle(&self, action: &Action, context: &GameContext) -> bool {
        self.handled_action_types().contains(&action.action_type.as_str()) && context.shop.is_some()
    }

    fn resolve(&self, action: &Action, context: &GameContext, catalog: &ContentCatalog, _random: &dyn RandomSource) -> EngineResult<ActionResult> {
        match action.action_type.as_str() {
            "buy_item" => resolve_buy(action, context, catalog),
            "sell_item" => resolve_sell(action, context, catalog),
            other => Err(EngineError::InvalidAction(format!("shop system cannot handle {other}"))),
        }
    }
}

fn shop_keeper_reputation_mult(context: &GameContext) -> f64 {
    let Some(shop) = &context.shop else {
        return 1.0;
    };
    let keeper = context.entities_here.iter().find(|e| e.id == shop.npc_id);
    let faction_rep = keeper
        .and_then(|k| k.faction_id)
        .map(|f| context.faction_reputation(&f.to_string()))
        .unwrap_or(0);
    effects(faction_rep).shop_price_mult
}

fn npc_discount(context: &GameContext) -> f64 {
    let Some(shop) = &context.shop else {
        return 0.0;
    };
    shop_discount(context.npc_reputation(&shop.npc_id.to_string()))
}

fn resolve_buy(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let shop = context.shop.as_ref().ok_or_else(|| EngineError::InvalidAction("there's no shop here".into()))?;
    let item_key = action
        .param_str("item")
        .ok_or_else(|| EngineError::InvalidInput("buy requires an item".into()))?;
    let item = catalog
        .items
        .values()
        .find(|i| i.id == item_key || i.name.eq_ignore_ascii_case(item_key))
        .ok_or_else(|| EngineError::not_found("ItemDef", item_key))?;
    let item_id = ItemId::from_content_slug(&item.id);
    let stock = shop.find_stock(item_id).ok_or_else(|| EngineError::not_found("ShopStock", item_key))?;
    if stock.quantity <= 0 {
        return Err(EngineError::InsufficientResource(format!("{} is out of stock", item.name)));
    }

    let rep_mult = shop_keeper_reputation_mult(context) * (1.0 - npc_discount(context)) * shop.price_modifier;
    let supply_mult = supply_demand_modifier(stock.quantity, stock.base_quantity);
    let base_price = stock.price_override.unwrap_or(item.base_price);
    let price = calculate_buy_price(base_price, rep_mult, supply_mult);

    if context.character.gold < price {
        return Err(EngineError::InsufficientResource(format!(
            "{} costs {} gold, you have {}",
            item.name, price, context.character.gold
        )));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You buy {} for {} gold.", item.name, price),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new("character", context.character.id.to_string(), "gold", json!(context.character.gold), json!(context.character.gold - price)),
            Mutation::new(
                "shop",
                shop.id.to_string(),
                "remove_stock",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
            Mutation::new(
                "inventory",
                context.character.id.to_string(),
                "add_item",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
        ],
        events: vec![
            GameEvent::new(context.game_id, context.turn_number, EventType::Custom("buy_item".into()), format!("{} buys {} for {} gold.", context.character.name, item.name, price))
                .with_actor(context.character.id.to_string()),
        ],
        xp_gained: 0,
    })
}

fn resolve_sell(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let shop = context.shop.as_ref().ok_or_else(|| EngineError::InvalidAction("there's no shop here".into()))?;
    let item_key = action
        .param_str("item")
        .ok_or_else(|| EngineError::InvalidInput("sell requires an item".into()))?;
    let item = catalog
        .items
        .values()
        .find(|i| i.id == item_key || i.name.eq_ignore_ascii_case(item_key))
        .ok_or_else(|| EngineError::not_found("ItemDef", item_key))?;
    let item_id = ItemId::from_content_slug(&item.id);
    if context.inventory.quantity_of(item_id) == 0 {
        return Err(EngineError::InsufficientResource(format!("you don't have {}", item.name)));
    }

    let price = calculate_sell_price((item.base_price as f64 * shop.price_modifier) as i32);
    if shop.gold_reserve < price {
        return Err(EngineError::InsufficientResource(format!("{} can't afford to buy that", shop.id)));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You sell {} for {} gold.", item.name, price),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new(
                "inventory",
                context.character.id.to_string(),
                "remove_item",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
            Mutation::new("character", context.character.id.to_string(), "gold", json!(context.character.gold), json!(context.character.gold + price)),
            Mutation::new(
                "shop",
                shop.id.to_string(),
                "add_stock",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
        ],
        events: vec![
            GameEvent::new(context.game_id, context.turn_number, EventType::Custom("sell_item".into()), format!("{} sells {} for {} gold.", context.character.name, item.name, price))
                .with_actor(context.character.id.to_string()),
        ],
        xp_gained: 0,
    })
}
