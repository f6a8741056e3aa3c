use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{CharacterId, GameId, HousingId};
use wrldcore_domain::model::companion::Housing;

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, housing: &Housing) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let data = to_json(housing)?;
    sqlx::query(
        r#"
        INSERT INTO housing (id, game_id, character_id, name, upgrade_level, data)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            upgrade_level = excluded.upgrade_level,
            data = excluded.data
        "#,
    )
    .bind(housing.id.to_string())
    .bind(housing.game_id.to_string())
    .bind(housing.character_id.to_string())
    .bind(&housing.name)
    .bind(housing.upgrade_level)
    .bind(data)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: HousingId) -> EngineResult<Housing>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM housing WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("housing", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn list_for_character<'e, E>(executor: E, game_id: GameId, character_id: CharacterId) -> EngineResult<Vec<Housing>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM housing WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter()
        .map(|r| from_json::<Housing>(&r.get::<String, _>("data")))
        .collect::<EngineResult<Vec<_>>>()
        .map(|all| all.into_iter().filter(|h| h.character_id == character_id).collect())
}

/// Every housing row for the game, for the snapshotter's world-partition
/// capture/restore.
pub async fn list_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Housing>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM housing WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

pub async fn clear_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM housing WHERE game_id = ?")
        .bind(game_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}
