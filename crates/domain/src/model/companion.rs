use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, CompanionId, EntityId, GameId, HousingId, ItemId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Companion {
    pub id: CompanionId,
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub entity_id: EntityId,
    pub is_active: bool,
    pub affinity_at_recruitment: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingStorage {
    pub item_id: ItemId,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Housing {
    pub id: HousingId,
    pub game_id: GameId,
    pub character_id: CharacterId,
    pub name: String,
    pub upgrade_level: i32,
    pub storage: Vec<HousingStorage>,
}

impl Housing {
    pub fn add_storage(&mut self, item_id: ItemId, quantity: i32) {
        if quantity <= 0 {
            return;
        }
        if let Some(s) = self.storage.iter_mut().find(|s| s.item_id == item_id) {
            s.quantity += quantity;
        } else {
            self.storage.push(HousingStorage { item_id, quantity });
        }
    }

    pub fn remove_storage(&mut self, item_id: ItemId, quantity: i32) -> bool {
        if let Some(pos) = self.storage.iter().position(|s| s.item_id == item_id) {
            if self.storage[pos].quantity < quantity {
                return false;
            }
            self.storage[pos].quantity -= quantity;
            if self.storage[pos].quantity == 0 {
                self.storage.remove(pos);
            }
            true
        } else {
            false
        }
    }
}

pub const MAX_ACTIVE_COMPANIONS: usize = 2;
