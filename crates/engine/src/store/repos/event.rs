//! Append-only event ledger. `append` is the only write; the schema's
//! triggers make UPDATE/DELETE abort outside of `game::delete_game`.

use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{GameId, LocationId};
use wrldcore_domain::model::event::{EventType, GameEvent};

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn append<'e, E>(executor: E, event: &GameEvent) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO events (id, game_id, event_type, turn_number, timestamp, actor_id, target_id,
                             location_id, description, mechanical_details, timeline_id, is_canonical)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.id.to_string())
    .bind(event.game_id.to_string())
    .bind(event_type_str(&event.event_type))
    .bind(event.turn_number)
    .bind(event.timestamp.to_rfc3339())
    .bind(&event.actor_id)
    .bind(&event.target_id)
    .bind(event.location_id.map(|id| id.to_string()))
    .bind(&event.description)
    .bind(to_json(&event.mechanical_details)?)
    .bind(&event.timeline_id)
    .bind(event.is_canonical)
    .execute(executor)
    .await?;
    Ok(())
}

/// Most recent events on `timeline_id`. Events from a timeline a rewind has
/// since branched away from stay in the ledger for audit but never surface
/// here.
pub async fn recent<'e, E>(executor: E, game_id: GameId, timeline_id: &str, limit: i64) -> EngineResult<Vec<GameEvent>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, event_type, turn_number, timestamp, actor_id, target_id, location_id, \
         description, mechanical_details, timeline_id, is_canonical FROM events \
         WHERE game_id = ? AND timeline_id = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(game_id.to_string())
    .bind(timeline_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_event).collect()
}

/// `WorldEvent`s from exactly `turn_number` on `timeline_id`, for the world
/// tick's economy-effect scan. Scoped to one turn so a standing effect is
/// never re-applied on every subsequent tick.
pub async fn world_events_for_turn<'e, E>(executor: E, game_id: GameId, timeline_id: &str, turn_number: i64) -> EngineResult<Vec<GameEvent>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, event_type, turn_number, timestamp, actor_id, target_id, location_id, \
         description, mechanical_details, timeline_id, is_canonical FROM events \
         WHERE game_id = ? AND timeline_id = ? AND turn_number = ? AND event_type = ? \
         ORDER BY timestamp ASC, id ASC",
    )
    .bind(game_id.to_string())
    .bind(timeline_id)
    .bind(turn_number)
    .bind(event_type_str(&EventType::WorldEvent))
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_event).collect()
}

pub async fn by_actor<'e, E>(executor: E, game_id: GameId, actor_id: &str) -> EngineResult<Vec<GameEvent>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, event_type, turn_number, timestamp, actor_id, target_id, location_id, \
         description, mechanical_details, timeline_id, is_canonical FROM events \
         WHERE game_id = ? AND actor_id = ? ORDER BY timestamp ASC, id ASC",
    )
    .bind(game_id.to_string())
    .bind(actor_id)
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_event).collect()
}

pub async fn by_location<'e, E>(executor: E, game_id: GameId, location_id: LocationId) -> EngineResult<Vec<GameEvent>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, event_type, turn_number, timestamp, actor_id, target_id, location_id, \
         description, mechanical_details, timeline_id, is_canonical FROM events \
         WHERE game_id = ? AND location_id = ? ORDER BY timestamp ASC, id ASC",
    )
    .bind(game_id.to_string())
    .bind(location_id.to_string())
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_event).collect()
}

pub async fn by_type<'e, E>(executor: E, game_id: GameId, event_type: &EventType) -> EngineResult<Vec<GameEvent>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, event_type, turn_number, timestamp, actor_id, target_id, location_id, \
         description, mechanical_details, timeline_id, is_canonical FROM events \
         WHERE game_id = ? AND event_type = ? ORDER BY timestamp ASC, id ASC",
    )
    .bind(game_id.to_string())
    .bind(event_type_str(event_type))
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_event).collect()
}

fn event_type_str(event_type: &EventType) -> String {
    match event_type {
        EventType::Custom(name) => name.clone(),
        other => serde_json::to_value(other)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "CUSTOM".to_string()),
    }
}

fn parse_event_type(s: &str) -> EventType {
    let wrapped = format!("\"{s}\"");
    serde_json::from_str(&wrapped).unwrap_or_else(|_| EventType::Custom(s.to_string()))
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> EngineResult<GameEvent> {
    let id: String = row.get("id");
    let game_id: String = row.get("game_id");
    let event_type: String = row.get("event_type");
    let timestamp: String = row.get("timestamp");
    let location_id: Option<String> = row.get("location_id");
    let mechanical_details: String = row.get("mechanical_details");

    Ok(GameEvent {
        id: id.parse().map_err(|_| EngineError::SchemaFailure("invalid event id".into()))?,
        game_id: game_id.parse().map_err(|_| EngineError::SchemaFailure("invalid game id".into()))?,
        event_type: parse_event_type(&event_type),
        turn_number: row.get("turn_number"),
        timestamp: chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| EngineError::SchemaFailure(e.to_string()))?
            .with_timezone(&chrono::Utc),
        actor_id: row.get("actor_id"),
        target_id: row.get("target_id"),
        location_id: location_id
            .map(|s| s.parse().map_err(|_| EngineError::SchemaFailure("invalid location id".into())))
            .transpose()?,
        description: row.get("description"),
        mechanical_details: from_json(&mechanical_details)?,
        is_canonical: row.get("is_canonical"),
        timeline_id: row.get("timeline_id"),
    })
}
