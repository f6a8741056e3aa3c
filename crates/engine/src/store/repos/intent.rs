//! Director-noted intents: quest hooks and pacing opportunities the Director
//! wrote down for itself and may act on in a later turn.

use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{GameId, IntentId};
use wrldcore_domain::model::Intent;

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, intent: &Intent) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO intents (id, game_id, intent_type, description, data, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            description = excluded.description,
            data = excluded.data,
            is_active = excluded.is_active,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(intent.id.to_string())
    .bind(intent.game_id.to_string())
    .bind(&intent.intent_type)
    .bind(&intent.description)
    .bind(to_json(&intent.data)?)
    .bind(intent.is_active)
    .bind(intent.created_at.to_rfc3339())
    .bind(intent.updated_at.to_rfc3339())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: IntentId) -> EngineResult<Intent>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, game_id, intent_type, description, data, is_active, created_at, updated_at \
         FROM intents WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| EngineError::not_found("intent", id.to_string()))?;
    row_to_intent(&row)
}

pub async fn list_active<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Intent>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, intent_type, description, data, is_active, created_at, updated_at \
         FROM intents WHERE game_id = ? AND is_active = 1",
    )
    .bind(game_id.to_string())
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_intent).collect()
}

pub async fn deactivate<'e, E>(executor: E, id: IntentId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE intents SET is_active = 0, updated_at = ? WHERE id = ?")
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

fn row_to_intent(row: &sqlx::sqlite::SqliteRow) -> EngineResult<Intent> {
    let id: String = row.get("id");
    let game_id: String = row.get("game_id");
    let data: String = row.get("data");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Intent {
        id: id.parse().map_err(|_| EngineError::SchemaFailure("invalid intent id".into()))?,
        game_id: game_id.parse().map_err(|_| EngineError::SchemaFailure("invalid game id".into()))?,
        intent_type: row.get("intent_type"),
        description: row.get("description"),
        data: from_json(&data)?,
        is_active: row.get("is_active"),
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| EngineError::SchemaFailure(e.to_string()))?
            .with_timezone(&chrono::Utc),
        updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|e| EngineError::SchemaFailure(e.to_string()))?
            .with_timezone(&chrono::Utc),
    })
}
