//! Carrying, equipping, and consuming items. Operates entirely on
//! `GameContext.inventory` and the equip slots on `Character`; the pipeline
//! persists both through `repos::inventory` and `repos::character`.

use serde_json::json;
use wrldcore_domain::ids::ItemId;
use wrldcore_domain::model::action::{Action, ActionResult, GameContext, Mutation};
use wrldcore_domain::model::content_defs::ItemDef;
use wrldcore_domain::model::event::EventType;
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::survival::apply_item_to_needs;

use crate::content::ContentCatalog;
use crate::error::{EngineError, EngineResult};

pub struct InventorySystem;

const HANDLED: &[&str] = &[
    "pickup_item",
    "drop_item",
    "equip_item",
    "unequip_item",
    "use_item",
    "store_item",
    "retrieve_item",
];

impl super::GameSystem for InventorySystem {
    fn system_id(&self) -> &'static str {
        "inventory"
    }

    fn handled_action_types(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn resolve(
        &self,
        action: &Action,
        context: &GameContext,
        catalog: &ContentCatalog,
        _random: &dyn RandomSource,
    ) -> EngineResult<ActionResult> {
        match action.action_type.as_str() {
            "pickup_item" => resolve_pickup(action, context, catalog),
            "drop_item" => resolve_drop(action, context, catalog),
            "equip_item" => resolve_equip(action, context, catalog),
            "unequip_item" => resolve_unequip(action, context, catalog),
            "use_item" => resolve_use(action, context, catalog),
            "store_item" => resolve_store(action, context, catalog),
            "retrieve_item" => resolve_retrieve(action, context, catalog),
            other => Err(EngineError::InvalidAction(format!("inventory system cannot handle {other}"))),
        }
    }
}

fn resolve_item_param<'a>(action: &'a Action, catalog: &'a ContentCatalog) -> EngineResult<(&'a str, &'a ItemDef)> {
    let key = "item";
    let name = action
        .param_str(key)
        .ok_or_else(|| EngineError::InvalidInput(format!("{} requires an item", action.action_type)))?;
    let item = catalog
        .items
        .values()
        .find(|i| i.id == name || i.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| EngineError::not_found("ItemDef", name))?;
    Ok((name, item))
}

fn resolve_pickup(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let (item_name, item) = resolve_item_param(action, catalog)?;
    let item_id = ItemId::from_content_slug(&item.id);
    if !context.current_location.items.contains(&item_id) {
        return Err(EngineError::not_found("Item", item_name));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You pick up {}.", item.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new("location", context.current_location.id.to_string(), "remove_item", json!(null), json!(item_id)),
            Mutation::new(
                "inventory",
                context.character.id.to_string(),
                "add_item",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
        ],
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::ItemPickup,
            format!("{} picks up {}.", context.character.name, item.name),
        )
        .with_actor(context.character.id.to_string())],
        xp_gained: 0,
    })
}

fn resolve_drop(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let (item_name, item) = resolve_item_param(action, catalog)?;
    let item_id = ItemId::from_content_slug(&item.id);
    if context.inventory.quantity_of(item_id) == 0 {
        return Err(EngineError::InsufficientResource(format!("you don't have {item_name}")));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You drop {}.", item.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new(
                "inventory",
                context.character.id.to_string(),
                "remove_item",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
            Mutation::new("location", context.current_location.id.to_string(), "add_item", json!(null), json!(item_id)),
        ],
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::ItemDrop,
            format!("{} drops {}.", context.character.name, item.name),
        )
        .with_actor(context.character.id.to_string())
        .with_location(context.current_location.id)],
        xp_gained: 0,
    })
}

fn resolve_equip(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let (_, item) = resolve_item_param(action, catalog)?;
    let slot_field = match item.item_type.as_str() {
        "weapon" => "equipped_weapon_id",
        "armor" => "equipped_armor_id",
        other => return Err(EngineError::InvalidAction(format!("{other} cannot be equipped"))),
    };

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You equip {}.", item.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![Mutation::new(
            "character",
            context.character.id.to_string(),
            slot_field,
            json!(null),
            json!(ItemId::from_content_slug(&item.id)),
        )],
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Equip,
            format!("{} equips {}.", context.character.name, item.name),
        )
        .with_actor(context.character.id.to_string())],
        xp_gained: 0,
    })
}

fn resolve_unequip(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let (_, item) = resolve_item_param(action, catalog)?;
    let slot_field = match item.item_type.as_str() {
        "weapon" => "equipped_weapon_id",
        "armor" => "equipped_armor_id",
        other => return Err(EngineError::InvalidAction(format!("{other} isn't equippable"))),
    };

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You unequip {}.", item.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![Mutation::new(
            "character",
            context.character.id.to_string(),
            slot_field,
            json!(ItemId::from_content_slug(&item.id)),
            json!(null),
        )],
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::Unequip,
            format!("{} unequips {}.", context.character.name, item.name),
        )
        .with_actor(context.character.id.to_string())],
        xp_gained: 0,
    })
}

fn resolve_use(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let (_, item) = resolve_item_param(action, catalog)?;
    if context.inventory.quantity_of(ItemId::from_content_slug(&item.id)) == 0 {
        return Err(EngineError::InsufficientResource(format!("you don't have {}", item.name)));
    }

    let mut mutations = vec![Mutation::new(
        "inventory",
        context.character.id.to_string(),
        "remove_item",
        json!(null),
        json!({ "item_id": ItemId::from_content_slug(&item.id), "quantity": 1 }),
    )];

    if let Some(needs) = apply_item_to_needs(&item.id, context.character.needs) {
        mutations.push(Mutation::new(
            "character",
            context.character.id.to_string(),
            "needs",
            json!(context.character.needs),
            json!(needs),
        ));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You use {}.", item.name),
        dice_rolls: Vec::new(),
        state_mutations: mutations,
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::ItemUse,
            format!("{} uses {}.", context.character.name, item.name),
        )
        .with_actor(context.character.id.to_string())],
        xp_gained: 0,
    })
}

fn resolve_store(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let (item_name, item) = resolve_item_param(action, catalog)?;
    let housing = context
        .housing
        .as_ref()
        .ok_or_else(|| EngineError::InvalidAction("you have no home to store items in".into()))?;
    let item_id = ItemId::from_content_slug(&item.id);
    if context.inventory.quantity_of(item_id) == 0 {
        return Err(EngineError::InsufficientResource(format!("you don't have {item_name}")));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You store {}.", item.name),
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
                "housing",
                housing.id.to_string(),
                "add_storage",
                json!(null),
                json!({ "item_id": item_id, "quantity": 1 }),
            ),
        ],
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::ItemStored,
            format!("{} stores {}.", context.character.name, item.name),
        )
        .with_actor(context.character.id.to_string())],
        xp_gained: 0,
    })
}

fn resolve_retrieve(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> EngineResult<ActionResult> {
    let (item_name, item) = resolve_item_param(action, catalog)?;
    let housing = context
        .housing
        .as_ref()
        .ok_or_else(|| EngineError::InvalidAction("you have no home".into()))?;
    let item_id = ItemId::from_content_slug(&item.id);
    if !housing.storage.iter().any(|s| s.item_id == item_id) {
        return Err(EngineError::InsufficientResource(format!("{item_name} isn't in storage")));
    }

    Ok(ActionResult {
        success: true,
        outcome_description: format!("You retrieve {}.", item.name),
        dice_rolls: Vec::new(),
        state_mutations: vec![
            Mutation::new(
                "housing",
                housing.id.to_string(),
                "remove_storage",
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
        events: vec![wrldcore_domain::model::event::GameEvent::new(
            context.game_id,
            context.turn_number,
            EventType::ItemRetrieved,
            format!("{} retrieves {}.", context.character.name, item.name),
        )
        .with_actor(context.character.id.to_string())],
        xp_gained: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::test_support::{bare_character, bare_context, bare_location};
    use crate::systems::GameSystem;
    use wrldcore_domain::ids::GameId;
    use wrldcore_domain::model::inventory::ItemStack;

    fn sword() -> ItemDef {
        ItemDef {
            id: "iron_sword".to_string(),
            name: "Iron Sword".to_string(),
            item_type: "weapon".to_string(),
            base_price: 10,
            properties: std::collections::HashMap::new(),
        }
    }

    fn item_action(action_type: &str, item: &str) -> Action {
        let mut action = Action::new(action_type, "actor", format!("{action_type} {item}"));
        action.parameters.insert("item".to_string(), json!(item));
        action
    }

    #[test]
    fn picking_up_an_item_present_at_the_location_moves_it_to_the_inventory() {
        let game_id = GameId::new();
        let location_id = wrldcore_domain::ids::LocationId::new();
        let character = bare_character(game_id, location_id);
        let mut location = bare_location(game_id, location_id);
        let item_id = ItemId::from_content_slug("iron_sword");
        location.items.push(item_id);
        let context = bare_context(character, location);
        let mut catalog = ContentCatalog::default();
        catalog.items.insert("iron_sword".to_string(), sword());

        let result = InventorySystem.resolve(&item_action("pickup_item", "iron_sword"), &context, &catalog, &NoRandom).unwrap();
        assert!(result.success);
        assert!(result.state_mutations.iter().any(|m| m.field == "remove_item" && m.new_value == json!(item_id)));
        assert!(result.state_mutations.iter().any(|m| m.field == "add_item"));
    }

    #[test]
    fn picking_up_an_item_not_present_fails() {
        let game_id = GameId::new();
        let location_id = wrldcore_domain::ids::LocationId::new();
        let character = bare_character(game_id, location_id);
        let context = bare_context(character, bare_location(game_id, location_id));
        let mut catalog = ContentCatalog::default();
        catalog.items.insert("iron_sword".to_string(), sword());

        let err = InventorySystem.resolve(&item_action("pickup_item", "iron_sword"), &context, &catalog, &NoRandom).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn equipping_a_weapon_sets_the_weapon_slot() {
        let game_id = GameId::new();
        let location_id = wrldcore_domain::ids::LocationId::new();
        let character = bare_character(game_id, location_id);
        let mut context = bare_context(character, bare_location(game_id, location_id));
        context.inventory.items.push(ItemStack { item_id: ItemId::from_content_slug("iron_sword"), quantity: 1 });
        let mut catalog = ContentCatalog::default();
        catalog.items.insert("iron_sword".to_string(), sword());

        let result = InventorySystem.resolve(&item_action("equip_item", "iron_sword"), &context, &catalog, &NoRandom).unwrap();
        let mutation = result.state_mutations.iter().find(|m| m.field == "equipped_weapon_id").expect("weapon slot mutation");
        assert_eq!(mutation.new_value, json!(ItemId::from_content_slug("iron_sword")));
    }

    struct NoRandom;
    impl RandomSource for NoRandom {
        fn gen_range(&self, min: i32, _max: i32) -> i32 {
            min
        }
        fn gen_probability(&self) -> f64 {
            0.0
        }
    }
}
