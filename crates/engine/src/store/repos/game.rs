use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{CharacterId, GameId, LocationId};
use wrldcore_domain::model::game::Game;

use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, game: &Game) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO games (id, name, created_at, turn_number, world_time, current_location_id,
                            character_id, is_active, loop_count, timeline_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            turn_number = excluded.turn_number,
            world_time = excluded.world_time,
            current_location_id = excluded.current_location_id,
            character_id = excluded.character_id,
            is_active = excluded.is_active,
            loop_count = excluded.loop_count,
            timeline_id = excluded.timeline_id
        "#,
    )
    .bind(game.id.to_string())
    .bind(&game.name)
    .bind(game.created_at.to_rfc3339())
    .bind(game.turn_number)
    .bind(game.world_time)
    .bind(game.current_location_id.to_string())
    .bind(game.character_id.to_string())
    .bind(game.is_active)
    .bind(game.loop_count)
    .bind(&game.timeline_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: GameId) -> EngineResult<Game>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, name, created_at, turn_number, world_time, current_location_id, \
         character_id, is_active, loop_count, timeline_id FROM games WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| EngineError::not_found("game", id.to_string()))?;

    row_to_game(&row)
}

pub async fn list_active<'e, E>(executor: E) -> EngineResult<Vec<Game>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, name, created_at, turn_number, world_time, current_location_id, \
         character_id, is_active, loop_count, timeline_id FROM games WHERE is_active = 1 \
         ORDER BY created_at DESC",
    )
    .fetch_all(executor)
    .await?;

    rows.iter().map(row_to_game).collect()
}

fn row_to_game(row: &sqlx::sqlite::SqliteRow) -> EngineResult<Game> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let current_location_id: String = row.get("current_location_id");
    let character_id: String = row.get("character_id");

    Ok(Game {
        id: id.parse().map_err(|_| EngineError::SchemaFailure("invalid game id".into()))?,
        name: row.get("name"),
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| EngineError::SchemaFailure(e.to_string()))?
            .with_timezone(&chrono::Utc),
        turn_number: row.get("turn_number"),
        world_time: row.get("world_time"),
        current_location_id: current_location_id
            .parse::<LocationId>()
            .map_err(|_| EngineError::SchemaFailure("invalid location id".into()))?,
        character_id: character_id
            .parse::<CharacterId>()
            .map_err(|_| EngineError::SchemaFailure("invalid character id".into()))?,
        loop_count: row.get("loop_count"),
        timeline_id: row.get("timeline_id"),
        is_active: row.get("is_active"),
    })
}

/// Deletes every row belonging to `game_id` across all tables, then the game
/// row itself. The event ledger's delete trigger is lifted for the duration
/// of this one operation and recreated immediately after — the only
/// sanctioned exception to "events are immutable".
pub async fn delete_game(pool: &sqlx::SqlitePool, game_id: GameId) -> EngineResult<()> {
    let id = game_id.to_string();
    let mut tx = pool.begin().await?;

    sqlx::query("DROP TRIGGER IF EXISTS prevent_event_delete").execute(&mut *tx).await?;

    for table in [
        "characters",
        "entities",
        "locations",
        "regions",
        "inventory",
        "quests",
        "combat_instances",
        "events",
        "intents",
        "snapshots",
        "faction_reputation",
        "npc_reputation",
        "bounties",
        "shops",
        "companions",
        "housing",
        "character_traits",
        "behavior_counters",
        "discovered_combinations",
        "location_connections",
        "trade_skills",
        "known_recipes",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE game_id = ?"))
            .bind(&id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM games WHERE id = ?").bind(&id).execute(&mut *tx).await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS prevent_event_delete
        BEFORE DELETE ON events
        BEGIN
            SELECT RAISE(ABORT, 'events are immutable');
        END;
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
