//! Snapshot repository: insertion plus the two lookups the
//! snapshotter needs (latest, and at-or-before a turn), plus retention
//! pruning to the most recent *K* per game.

use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{GameId, SnapshotId};
use wrldcore_domain::model::snapshot::{RewindTrigger, Snapshot};

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, snapshot: &Snapshot) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO snapshots
            (id, game_id, turn_number, world_time, timestamp, trigger, location_id,
             player_state, inventory_state, world_state, quest_state, social_state, metadata)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(snapshot.id.to_string())
    .bind(snapshot.game_id.to_string())
    .bind(snapshot.turn_number)
    .bind(snapshot.world_time)
    .bind(snapshot.timestamp.to_rfc3339())
    .bind(trigger_str(snapshot.trigger))
    .bind(snapshot.location_id.to_string())
    .bind(to_json(&snapshot.player_state)?)
    .bind(to_json(&snapshot.inventory_state)?)
    .bind(to_json(&snapshot.world_state)?)
    .bind(to_json(&snapshot.quest_state)?)
    .bind(to_json(&snapshot.social_state)?)
    .bind(to_json(&snapshot.metadata)?)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: SnapshotId) -> EngineResult<Snapshot>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, game_id, turn_number, world_time, timestamp, trigger, location_id, \
         player_state, inventory_state, world_state, quest_state, social_state, metadata \
         FROM snapshots WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| EngineError::not_found("snapshot", id.to_string()))?;
    row_to_snapshot(&row)
}

pub async fn latest_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Option<Snapshot>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, game_id, turn_number, world_time, timestamp, trigger, location_id, \
         player_state, inventory_state, world_state, quest_state, social_state, metadata \
         FROM snapshots WHERE game_id = ? ORDER BY turn_number DESC LIMIT 1",
    )
    .bind(game_id.to_string())
    .fetch_optional(executor)
    .await?;
    row.map(|r| row_to_snapshot(&r)).transpose()
}

pub async fn at_or_before_turn<'e, E>(executor: E, game_id: GameId, turn_number: i64) -> EngineResult<Option<Snapshot>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, game_id, turn_number, world_time, timestamp, trigger, location_id, \
         player_state, inventory_state, world_state, quest_state, social_state, metadata \
         FROM snapshots WHERE game_id = ? AND turn_number <= ? ORDER BY turn_number DESC LIMIT 1",
    )
    .bind(game_id.to_string())
    .bind(turn_number)
    .fetch_optional(executor)
    .await?;
    row.map(|r| row_to_snapshot(&r)).transpose()
}

/// Delete everything but the most recent `retain` snapshots for this game.
pub async fn prune<'e, E>(executor: E, game_id: GameId, retain: i64) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        DELETE FROM snapshots
        WHERE game_id = ? AND id NOT IN (
            SELECT id FROM snapshots WHERE game_id = ? ORDER BY turn_number DESC LIMIT ?
        )
        "#,
    )
    .bind(game_id.to_string())
    .bind(game_id.to_string())
    .bind(retain)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn count_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<i64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snapshots WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_one(executor)
        .await?;
    Ok(count)
}

fn trigger_str(trigger: RewindTrigger) -> &'static str {
    match trigger {
        RewindTrigger::Artifact => "artifact",
        RewindTrigger::Death => "death",
        RewindTrigger::FullReset => "full_reset",
        RewindTrigger::Manual => "manual",
    }
}

fn parse_trigger(s: &str) -> RewindTrigger {
    match s {
        "artifact" => RewindTrigger::Artifact,
        "death" => RewindTrigger::Death,
        "full_reset" => RewindTrigger::FullReset,
        _ => RewindTrigger::Manual,
    }
}

fn row_to_snapshot(row: &sqlx::sqlite::SqliteRow) -> EngineResult<Snapshot> {
    let id: String = row.get("id");
    let game_id: String = row.get("game_id");
    let timestamp: String = row.get("timestamp");
    let trigger: String = row.get("trigger");
    let location_id: String = row.get("location_id");

    Ok(Snapshot {
        id: id.parse().map_err(|_| EngineError::SchemaFailure("invalid snapshot id".into()))?,
        game_id: game_id.parse().map_err(|_| EngineError::SchemaFailure("invalid game id".into()))?,
        turn_number: row.get("turn_number"),
        world_time: row.get("world_time"),
        timestamp: chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| EngineError::SchemaFailure(e.to_string()))?
            .with_timezone(&chrono::Utc),
        trigger: parse_trigger(&trigger),
        location_id: location_id.parse().map_err(|_| EngineError::SchemaFailure("invalid location id".into()))?,
        player_state: from_json(&row.get::<String, _>("player_state"))?,
        inventory_state: from_json(&row.get::<String, _>("inventory_state"))?,
        world_state: from_json(&row.get::<String, _>("world_state"))?,
        quest_state: from_json(&row.get::<String, _>("quest_state"))?,
        social_state: from_json(&row.get::<String, _>("social_state"))?,
        metadata: from_json(&row.get::<String, _>("metadata"))?,
    })
}
