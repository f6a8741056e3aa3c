use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{EntityId, GameId, LocationId};
use wrldcore_domain::model::inventory::Entity;

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, entity: &Entity) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let data = to_json(entity)?;
    sqlx::query(
        r#"
        INSERT INTO entities (id, game_id, name, hp_current, hp_max, is_hostile, is_alive,
                               current_location_id, level, expires_at_time, data)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            hp_current = excluded.hp_current,
            hp_max = excluded.hp_max,
            is_hostile = excluded.is_hostile,
            is_alive = excluded.is_alive,
            current_location_id = excluded.current_location_id,
            level = excluded.level,
            expires_at_time = excluded.expires_at_time,
            data = excluded.data
        "#,
    )
    .bind(entity.id.to_string())
    .bind(entity.game_id.to_string())
    .bind(&entity.name)
    .bind(entity.hp_current)
    .bind(entity.hp_max)
    .bind(entity.is_hostile)
    .bind(entity.is_alive)
    .bind(entity.current_location_id.to_string())
    .bind(entity.level)
    .bind(entity.expires_at_time)
    .bind(data)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: EntityId) -> EngineResult<Entity>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM entities WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("entity", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn list_at_location<'e, E>(executor: E, game_id: GameId, location_id: LocationId) -> EngineResult<Vec<Entity>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM entities WHERE game_id = ? AND current_location_id = ?")
        .bind(game_id.to_string())
        .bind(location_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

/// Every entity belonging to this game regardless of location, for the world
/// simulation tick, which must visit NPCs wherever they currently stand.
pub async fn list_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Entity>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM entities WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

pub async fn list_expired<'e, E>(executor: E, game_id: GameId, world_time: i32) -> EngineResult<Vec<Entity>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT data FROM entities WHERE game_id = ? AND expires_at_time IS NOT NULL AND expires_at_time <= ?",
    )
    .bind(game_id.to_string())
    .bind(world_time)
    .fetch_all(executor)
    .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

pub async fn delete<'e, E>(executor: E, id: EntityId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM entities WHERE id = ?").bind(id.to_string()).execute(executor).await?;
    Ok(())
}
