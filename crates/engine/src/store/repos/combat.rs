use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{CombatId, GameId};
use wrldcore_domain::model::combat::CombatInstance;

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, combat: &CombatInstance) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let data = to_json(combat)?;
    sqlx::query(
        r#"
        INSERT INTO combat_instances (id, game_id, is_active, round_number, current_turn_index, data)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            is_active = excluded.is_active,
            round_number = excluded.round_number,
            current_turn_index = excluded.current_turn_index,
            data = excluded.data
        "#,
    )
    .bind(combat.id.to_string())
    .bind(combat.game_id.to_string())
    .bind(combat.is_active())
    .bind(combat.round_number)
    .bind(combat.current_turn_index as i64)
    .bind(data)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: CombatId) -> EngineResult<CombatInstance>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM combat_instances WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("combat instance", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn get_active_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Option<CombatInstance>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM combat_instances WHERE game_id = ? AND is_active = 1 LIMIT 1")
        .bind(game_id.to_string())
        .fetch_optional(executor)
        .await?;
    row.map(|r| from_json(&r.get::<String, _>("data"))).transpose()
}
