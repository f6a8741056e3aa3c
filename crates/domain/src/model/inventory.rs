//! NPCs/creatures (`Entity`), and the stacking inventory shared by characters,
//! entities, and housing storage alike.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, EntityId, FactionId, GameId, ItemId, LocationId};
use crate::rules::ability_scores::Ability;
use crate::rules::conditions::Condition;
use crate::rules::world_clock::Period;

/// One stack in an inventory. `quantity > 0` always; stacks merge on insert and
/// are removed entirely when decremented to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: ItemId,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub owner_id: String,
    pub items: Vec<ItemStack>,
}

impl Inventory {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            items: Vec::new(),
        }
    }

    /// Merge `quantity` of `item_id` into an existing stack, or append a new one.
    pub fn add(&mut self, item_id: ItemId, quantity: i32) {
        if quantity <= 0 {
            return;
        }
        if let Some(stack) = self.items.iter_mut().find(|s| s.item_id == item_id) {
            stack.quantity += quantity;
        } else {
            self.items.push(ItemStack { item_id, quantity });
        }
    }

    /// Decrement a stack, removing it entirely at zero. Returns `false` if the
    /// item isn't present or the stack holds less than `quantity`.
    pub fn remove(&mut self, item_id: ItemId, quantity: i32) -> bool {
        if quantity <= 0 {
            return false;
        }
        if let Some(pos) = self.items.iter().position(|s| s.item_id == item_id) {
            if self.items[pos].quantity < quantity {
                return false;
            }
            self.items[pos].quantity -= quantity;
            if self.items[pos].quantity == 0 {
                self.items.remove(pos);
            }
            true
        } else {
            false
        }
    }

    pub fn quantity_of(&self, item_id: ItemId) -> i32 {
        self.items
            .iter()
            .find(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }
}

/// An NPC/creature's location per named time-of-day period (dawn, morning, ...).
pub type Schedule = HashMap<Period, LocationId>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDef {
    pub name: String,
    pub attack_bonus: i32,
    pub damage_dice: String,
    pub damage_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub game_id: GameId,
    pub name: String,
    pub ability_scores: HashMap<Ability, i32>,
    pub hp_current: i32,
    pub hp_max: i32,
    pub armor_class: i32,
    pub attacks: Vec<AttackDef>,
    pub behavior_tags: HashSet<String>,
    pub loot_table: Vec<ItemStack>,
    pub is_hostile: bool,
    pub is_alive: bool,
    pub faction_id: Option<FactionId>,
    pub schedule: Schedule,
    pub unavailable_periods: HashSet<Period>,
    pub current_location_id: LocationId,
    pub level: i32,
    pub active_conditions: Vec<Condition>,
    pub quest_hook: Option<String>,
    pub expires_at_time: Option<i32>,
    /// Set on anything the Director conjured mid-playthrough rather than an
    /// authored content bundle, so it can be told apart in the ledger.
    #[serde(default)]
    pub generated: bool,
}

impl Entity {
    pub fn weakest_alive<'a>(entities: impl Iterator<Item = &'a Entity>) -> Option<&'a Entity> {
        entities
            .filter(|e| e.is_alive)
            .min_by_key(|e| e.hp_current)
    }
}

/// Convenience grouping used when materializing combatants; not a stored entity
/// in its own right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatantKind {
    Character(CharacterId),
    Entity(EntityId),
}
