use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{CharacterId, GameId};
use wrldcore_domain::model::character::Character;

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, character: &Character) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let data = to_json(character)?;
    sqlx::query(
        r#"
        INSERT INTO characters (id, game_id, name, hp_current, hp_max, current_location_id, data)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            hp_current = excluded.hp_current,
            hp_max = excluded.hp_max,
            current_location_id = excluded.current_location_id,
            data = excluded.data
        "#,
    )
    .bind(character.id.to_string())
    .bind(character.game_id.to_string())
    .bind(&character.name)
    .bind(character.hp_current)
    .bind(character.hp_max)
    .bind(character.current_location_id.to_string())
    .bind(data)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: CharacterId) -> EngineResult<Character>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM characters WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("character", id.to_string()))?;
    let data: String = row.get("data");
    from_json(&data)
}

pub async fn get_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Character>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM characters WHERE game_id = ? LIMIT 1")
        .bind(game_id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("character", format!("for game {game_id}")))?;
    let data: String = row.get("data");
    from_json(&data)
}
