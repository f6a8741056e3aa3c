use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{CharacterId, CompanionId, GameId};
use wrldcore_domain::model::companion::Companion;

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, companion: &Companion) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let data = to_json(companion)?;
    sqlx::query(
        r#"
        INSERT INTO companions (id, game_id, entity_id, name, is_active, affinity, data)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            is_active = excluded.is_active,
            affinity = excluded.affinity,
            data = excluded.data
        "#,
    )
    .bind(companion.id.to_string())
    .bind(companion.game_id.to_string())
    .bind(companion.entity_id.to_string())
    .bind(format!("companion-{}", companion.entity_id))
    .bind(companion.is_active)
    .bind(companion.affinity_at_recruitment)
    .bind(data)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: CompanionId) -> EngineResult<Companion>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM companions WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("companion", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn list_active<'e, E>(executor: E, game_id: GameId, character_id: CharacterId) -> EngineResult<Vec<Companion>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM companions WHERE game_id = ? AND is_active = 1")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter()
        .map(|r| from_json::<Companion>(&r.get::<String, _>("data")))
        .collect::<EngineResult<Vec<_>>>()
        .map(|all| all.into_iter().filter(|c| c.character_id == character_id).collect())
}

/// Every companion row for the game regardless of active state, for the
/// snapshotter's social-partition capture/restore.
pub async fn list_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Companion>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM companions WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

pub async fn clear_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM companions WHERE game_id = ?")
        .bind(game_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}
