//! Merchant stock and gold reserves. `base_stock` records each line's
//! baseline quantity so `Shop::restock` has something to recover toward;
//! the repository just keeps it alongside the live `stock` blob.

use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{EntityId, GameId, ItemId, ShopId};
use wrldcore_domain::model::shop::{Shop, ShopStock};

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

#[derive(Serialize, Deserialize)]
struct BaseStockLine {
    item_id: ItemId,
    base_quantity: i32,
}

pub async fn save<'e, E>(executor: E, shop: &Shop) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let base_stock: Vec<BaseStockLine> = shop
        .stock
        .iter()
        .map(|s| BaseStockLine {
            item_id: s.item_id,
            base_quantity: s.base_quantity,
        })
        .collect();

    sqlx::query(
        r#"
        INSERT INTO shops (id, game_id, npc_id, gold_reserve, stock, base_stock, last_restock_turn, data)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            gold_reserve = excluded.gold_reserve,
            stock = excluded.stock,
            base_stock = excluded.base_stock,
            last_restock_turn = excluded.last_restock_turn,
            data = excluded.data
        "#,
    )
    .bind(shop.id.to_string())
    .bind(shop.game_id.to_string())
    .bind(shop.npc_id.to_string())
    .bind(shop.gold_reserve)
    .bind(to_json(&shop.stock)?)
    .bind(to_json(&base_stock)?)
    .bind(shop.last_restock_turn)
    .bind(to_json(shop)?)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: ShopId) -> EngineResult<Shop>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM shops WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("shop", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn get_for_npc<'e, E>(executor: E, game_id: GameId, npc_id: EntityId) -> EngineResult<Option<Shop>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM shops WHERE game_id = ? AND npc_id = ?")
        .bind(game_id.to_string())
        .bind(npc_id.to_string())
        .fetch_optional(executor)
        .await?;
    row.map(|r| from_json(&r.get::<String, _>("data"))).transpose()
}

pub async fn list_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Shop>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM shops WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_stock_line_round_trips_through_json() {
        let line = BaseStockLine {
            item_id: ItemId::new(),
            base_quantity: 10,
        };
        let json = serde_json::to_string(&line).unwrap();
        let back: BaseStockLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base_quantity, 10);
    }

    #[test]
    fn shop_stock_carries_quantity() {
        let stock = ShopStock {
            item_id: ItemId::new(),
            quantity: 3,
            base_quantity: 5,
            price_override: None,
        };
        assert_eq!(stock.quantity, 3);
    }
}
