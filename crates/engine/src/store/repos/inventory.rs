use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::GameId;
use wrldcore_domain::model::inventory::Inventory;

use super::{from_json, to_json};
use crate::error::EngineResult;

pub async fn save<'e, E>(executor: E, game_id: GameId, inventory: &Inventory) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items = to_json(&inventory.items)?;
    sqlx::query(
        r#"
        INSERT INTO inventory (id, game_id, owner_id, items)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(owner_id) DO UPDATE SET items = excluded.items
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(game_id.to_string())
    .bind(&inventory.owner_id)
    .bind(items)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, owner_id: &str) -> EngineResult<Inventory>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT items FROM inventory WHERE owner_id = ?")
        .bind(owner_id)
        .fetch_optional(executor)
        .await?;
    match row {
        Some(r) => Ok(Inventory {
            owner_id: owner_id.to_string(),
            items: from_json(&r.get::<String, _>("items"))?,
        }),
        None => Ok(Inventory::new(owner_id)),
    }
}
