//! `LocationConnection` repository, including the breadth-first
//! `get_nearby_graph` traversal and the union-based `count_all` (open
//! Questions: the source's superseded first query is not reproduced).

use std::collections::{HashMap, HashSet, VecDeque};

use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{ConnectionId, GameId, LocationId};
use wrldcore_domain::model::location::{Direction, LocationConnection, LockSpec};
use wrldcore_domain::rules::skills::Skill;

use crate::error::EngineResult;

/// Idempotent on `(game_id, source_location_id, direction)`.
pub async fn add_connection<'e, E>(executor: E, conn: &LocationConnection) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let (lock_key, lock_skill, lock_dc) = split_lock(&conn.lock);
    sqlx::query(
        r#"
        INSERT INTO location_connections
            (id, game_id, source_location_id, target_location_id, direction, description,
             is_locked, lock_key_item_id, lock_skill, lock_dc)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(game_id, source_location_id, direction) DO UPDATE SET
            target_location_id = excluded.target_location_id,
            description = excluded.description,
            is_locked = excluded.is_locked,
            lock_key_item_id = excluded.lock_key_item_id,
            lock_skill = excluded.lock_skill,
            lock_dc = excluded.lock_dc
        "#,
    )
    .bind(conn.id.to_string())
    .bind(conn.game_id.to_string())
    .bind(conn.source_location_id.to_string())
    .bind(conn.target_location_id.to_string())
    .bind(conn.direction.as_str())
    .bind(&conn.description)
    .bind(conn.is_locked)
    .bind(lock_key)
    .bind(lock_skill)
    .bind(lock_dc)
    .execute(executor)
    .await?;
    Ok(())
}

/// Adds both directions of a passage in one transaction. Returns the
/// forward connection (source -> target) so a caller mid-turn can graft it
/// onto an already-loaded `GameContext` without a reload.
pub async fn add_bidirectional(
    pool: &sqlx::SqlitePool,
    game_id: GameId,
    source: LocationId,
    target: LocationId,
    direction: Direction,
    description: &str,
    lock: Option<LockSpec>,
) -> EngineResult<LocationConnection> {
    let mut tx = pool.begin().await?;
    let forward = LocationConnection {
        id: ConnectionId::new(),
        game_id,
        source_location_id: source,
        target_location_id: target,
        direction,
        description: description.to_string(),
        is_locked: lock.is_some(),
        lock: lock.clone(),
    };
    let backward = LocationConnection {
        id: ConnectionId::new(),
        game_id,
        source_location_id: target,
        target_location_id: source,
        direction: direction.opposite(),
        description: description.to_string(),
        is_locked: lock.is_some(),
        lock,
    };
    add_connection(&mut *tx, &forward).await?;
    add_connection(&mut *tx, &backward).await?;
    tx.commit().await?;
    Ok(forward)
}

pub async fn find_connection<'e, E>(
    executor: E,
    game_id: GameId,
    source: LocationId,
    direction: Direction,
) -> EngineResult<Option<LocationConnection>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, game_id, source_location_id, target_location_id, direction, description, \
         is_locked, lock_key_item_id, lock_skill, lock_dc FROM location_connections \
         WHERE game_id = ? AND source_location_id = ? AND direction = ?",
    )
    .bind(game_id.to_string())
    .bind(source.to_string())
    .bind(direction.as_str())
    .fetch_optional(executor)
    .await?;

    row.map(|r| row_to_connection(&r)).transpose()
}

pub async fn get<'e, E>(executor: E, id: ConnectionId) -> EngineResult<Option<LocationConnection>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, game_id, source_location_id, target_location_id, direction, description, \
         is_locked, lock_key_item_id, lock_skill, lock_dc FROM location_connections WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(executor)
    .await?;

    row.map(|r| row_to_connection(&r)).transpose()
}

pub async fn list_from<'e, E>(executor: E, game_id: GameId, source: LocationId) -> EngineResult<Vec<LocationConnection>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, source_location_id, target_location_id, direction, description, \
         is_locked, lock_key_item_id, lock_skill, lock_dc FROM location_connections \
         WHERE game_id = ? AND source_location_id = ?",
    )
    .bind(game_id.to_string())
    .bind(source.to_string())
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_connection).collect()
}

/// Breadth-first traversal from `start`, bounded to `max_depth` hops. Returns
/// every reachable location mapped to its outgoing connections.
pub async fn get_nearby_graph(
    pool: &sqlx::SqlitePool,
    game_id: GameId,
    start: LocationId,
    max_depth: u32,
) -> EngineResult<HashMap<LocationId, Vec<LocationConnection>>> {
    let mut result = HashMap::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back((start, 0u32));
    visited.insert(start);

    while let Some((location, depth)) = queue.pop_front() {
        if depth > max_depth {
            continue;
        }
        let outgoing = list_from(pool, game_id, location).await?;
        for conn in &outgoing {
            if !visited.contains(&conn.target_location_id) && depth < max_depth {
                visited.insert(conn.target_location_id);
                queue.push_back((conn.target_location_id, depth + 1));
            }
        }
        result.insert(location, outgoing);
    }

    Ok(result)
}

/// Distinct locations appearing as either a source or a target of any
/// connection in the game (union, not sum-of-distinct-counts).
pub async fn count_all(pool: &sqlx::SqlitePool, game_id: GameId) -> EngineResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM (
            SELECT source_location_id AS loc FROM location_connections WHERE game_id = ?
            UNION
            SELECT target_location_id AS loc FROM location_connections WHERE game_id = ?
        )
        "#,
    )
    .bind(game_id.to_string())
    .bind(game_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

fn split_lock(lock: &Option<LockSpec>) -> (Option<String>, Option<String>, Option<i32>) {
    match lock {
        None => (None, None, None),
        Some(spec) => {
            let key = spec.key_item_id.map(|id| id.to_string());
            let (skill, dc) = match spec.skill {
                Some((skill, dc)) => (Some(skill_str(skill).to_string()), Some(dc as i32)),
                None => (None, None),
            };
            (key, skill, dc)
        }
    }
}

fn skill_str(skill: Skill) -> &'static str {
    match skill {
        Skill::Acrobatics => "acrobatics",
        Skill::AnimalHandling => "animal_handling",
        Skill::Arcana => "arcana",
        Skill::Athletics => "athletics",
        Skill::Deception => "deception",
        Skill::History => "history",
        Skill::Insight => "insight",
        Skill::Intimidation => "intimidation",
        Skill::Investigation => "investigation",
        Skill::Medicine => "medicine",
        Skill::Nature => "nature",
        Skill::Perception => "perception",
        Skill::Performance => "performance",
        Skill::Persuasion => "persuasion",
        Skill::Religion => "religion",
        Skill::SleightOfHand => "sleight_of_hand",
        Skill::Stealth => "stealth",
        Skill::Survival => "survival",
    }
}

fn parse_skill(s: &str) -> Option<Skill> {
    Some(match s {
        "acrobatics" => Skill::Acrobatics,
        "animal_handling" => Skill::AnimalHandling,
        "arcana" => Skill::Arcana,
        "athletics" => Skill::Athletics,
        "deception" => Skill::Deception,
        "history" => Skill::History,
        "insight" => Skill::Insight,
        "intimidation" => Skill::Intimidation,
        "investigation" => Skill::Investigation,
        "medicine" => Skill::Medicine,
        "nature" => Skill::Nature,
        "perception" => Skill::Perception,
        "performance" => Skill::Performance,
        "persuasion" => Skill::Persuasion,
        "religion" => Skill::Religion,
        "sleight_of_hand" => Skill::SleightOfHand,
        "stealth" => Skill::Stealth,
        "survival" => Skill::Survival,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DataStore;
    use wrldcore_domain::ids::GameId;

    #[tokio::test]
    async fn add_connection_is_idempotent_on_game_source_direction() {
        let store = DataStore::connect_in_memory().await.unwrap();
        let game_id = GameId::new();
        let source = LocationId::new();
        let target = LocationId::new();

        let mut conn = LocationConnection {
            id: ConnectionId::new(),
            game_id,
            source_location_id: source,
            target_location_id: target,
            direction: Direction::North,
            description: "a dim corridor".to_string(),
            is_locked: false,
            lock: None,
        };
        add_connection(store.pool(), &conn).await.unwrap();

        // Same (game_id, source, direction) tuple, different id and payload.
        conn.id = ConnectionId::new();
        conn.description = "a brightly lit corridor".to_string();
        conn.is_locked = true;
        conn.lock = Some(LockSpec {
            key_item_id: None,
            skill: Some((Skill::Athletics, 15)),
        });
        add_connection(store.pool(), &conn).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM location_connections WHERE game_id = ?")
            .bind(game_id.to_string())
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let found = find_connection(store.pool(), game_id, source, Direction::North).await.unwrap().unwrap();
        assert_eq!(found.description, "a brightly lit corridor");
        assert!(found.is_locked);
    }

    #[tokio::test]
    async fn get_nearby_graph_respects_max_depth() {
        let store = DataStore::connect_in_memory().await.unwrap();
        let game_id = GameId::new();
        let a = LocationId::new();
        let b = LocationId::new();
        let c = LocationId::new();

        add_bidirectional(store.pool(), game_id, a, b, Direction::North, "a to b", None).await.unwrap();
        add_bidirectional(store.pool(), game_id, b, c, Direction::North, "b to c", None).await.unwrap();

        let graph = get_nearby_graph(store.pool(), game_id, a, 1).await.unwrap();
        assert!(graph.contains_key(&a));
        assert!(graph.contains_key(&b));
        assert!(!graph.contains_key(&c));
    }
}

fn row_to_connection(row: &sqlx::sqlite::SqliteRow) -> EngineResult<LocationConnection> {
    use crate::error::EngineError;

    let id: String = row.get("id");
    let game_id: String = row.get("game_id");
    let source: String = row.get("source_location_id");
    let target: String = row.get("target_location_id");
    let direction: String = row.get("direction");
    let lock_key_item_id: Option<String> = row.get("lock_key_item_id");
    let lock_skill: Option<String> = row.get("lock_skill");
    let lock_dc: Option<i32> = row.get("lock_dc");

    let lock = if lock_key_item_id.is_some() || lock_skill.is_some() {
        Some(LockSpec {
            key_item_id: lock_key_item_id
                .map(|s| s.parse().map_err(|_| EngineError::SchemaFailure("invalid item id".into())))
                .transpose()?,
            skill: match (lock_skill.as_deref().and_then(parse_skill), lock_dc) {
                (Some(skill), Some(dc)) => Some((skill, dc as u8)),
                _ => None,
            },
        })
    } else {
        None
    };

    Ok(LocationConnection {
        id: id.parse().map_err(|_| EngineError::SchemaFailure("invalid connection id".into()))?,
        game_id: game_id.parse().map_err(|_| EngineError::SchemaFailure("invalid game id".into()))?,
        source_location_id: source.parse().map_err(|_| EngineError::SchemaFailure("invalid location id".into()))?,
        target_location_id: target.parse().map_err(|_| EngineError::SchemaFailure("invalid location id".into()))?,
        direction: Direction::parse(&direction).ok_or_else(|| EngineError::SchemaFailure("invalid direction".into()))?,
        description: row.get("description"),
        is_locked: row.get("is_locked"),
        lock,
    })
}
