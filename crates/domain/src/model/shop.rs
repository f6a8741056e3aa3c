//! A merchant's stock, keyed to the NPC entity that runs it. `ShopSystem`
//! computes prices from `rules::economy` against this state; restocking
//! resets `stock` toward `base_stock` every N turns.

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, GameId, ItemId, ShopId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopStock {
    pub item_id: ItemId,
    pub quantity: i32,
    pub base_quantity: i32,
    pub price_override: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub game_id: GameId,
    pub npc_id: EntityId,
    pub gold_reserve: i32,
    pub stock: Vec<ShopStock>,
    pub last_restock_turn: i64,
    /// Ambient multiplier layered on top of every price at this shop, moved
    /// by world events (a bandit raid on the trade road, a bumper harvest).
    /// Carried on the struct rather than per-stock-line since it reflects
    /// the shop's standing, not any one item's supply.
    #[serde(default = "default_price_modifier")]
    pub price_modifier: f64,
}

fn default_price_modifier() -> f64 {
    1.0
}

impl Shop {
    pub fn find_stock(&self, item_id: ItemId) -> Option<&ShopStock> {
        self.stock.iter().find(|s| s.item_id == item_id)
    }

    pub fn find_stock_mut(&mut self, item_id: ItemId) -> Option<&mut ShopStock> {
        self.stock.iter_mut().find(|s| s.item_id == item_id)
    }

    /// Restock every line back toward its baseline, halfway, never exceeding it.
    pub fn restock(&mut self, turn: i64) {
        for line in &mut self.stock {
            if line.quantity < line.base_quantity {
                line.quantity = (line.quantity + (line.base_quantity - line.quantity).div_ceil(2)).min(line.base_quantity);
            }
        }
        self.last_restock_turn = turn;
    }
}
