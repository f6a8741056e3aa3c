use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{GameId, QuestId};
use wrldcore_domain::model::quest::{Quest, QuestStatus};

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, quest: &Quest) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let data = to_json(quest)?;
    sqlx::query(
        r#"
        INSERT INTO quests (id, game_id, name, status, data)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            status = excluded.status,
            data = excluded.data
        "#,
    )
    .bind(quest.id.to_string())
    .bind(quest.game_id.to_string())
    .bind(&quest.name)
    .bind(status_str(quest.status))
    .bind(data)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: QuestId) -> EngineResult<Quest>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM quests WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("quest", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn list_active<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Quest>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM quests WHERE game_id = ? AND status = 'active'")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

pub async fn list_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Quest>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM quests WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

pub async fn clear_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM quests WHERE game_id = ?")
        .bind(game_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

fn status_str(status: QuestStatus) -> &'static str {
    match status {
        QuestStatus::Available => "available",
        QuestStatus::Active => "active",
        QuestStatus::Completed => "completed",
        QuestStatus::Failed => "failed",
    }
}
