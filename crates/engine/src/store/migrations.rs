//! Forward-only, numbered migration chain. A `schema_version` table
//! records applied migration numbers; `run` applies every migration whose
//! number is absent, each in its own transaction, in order. Grounded on the
//! original core's `storage/migrations/001_initial.py` through `020_size.py`
//! — column-adding migrations are collapsed here into fewer, denser steps
//! while preserving the same forward-only, idempotent contract.

use sqlx::SqlitePool;

use crate::error::EngineResult;

struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: INITIAL_SCHEMA,
    },
    Migration {
        version: 2,
        sql: DIRECTOR_COLUMNS,
    },
    Migration {
        version: 3,
        sql: SURVIVAL_AND_PROGRESSION,
    },
    Migration {
        version: 4,
        sql: REPUTATION_AND_WORLD_CLOCK,
    },
    Migration {
        version: 5,
        sql: SHOPS_DEATH_WOUNDS,
    },
    Migration {
        version: 6,
        sql: COMPANIONS_AND_HOUSING,
    },
    Migration {
        version: 7,
        sql: CONNECTIONS_TABLE,
    },
    Migration {
        version: 8,
        sql: SNAPSHOTS_AND_TIMELINES,
    },
    Migration {
        version: 9,
        sql: CLASS_RESOURCES_AND_TRAITS,
    },
    Migration {
        version: 10,
        sql: ELEMENTS_SPELLS_AND_SIZE,
    },
    Migration {
        version: 11,
        sql: BLOB_COLUMNS,
    },
];

pub async fn run(pool: &SqlitePool) -> EngineResult<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)")
        .execute(pool)
        .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(pool)
        .await?;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        let mut tx = pool.begin().await?;
        sqlx::query(migration.sql).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(migration.version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(version = migration.version, "applied migration");
    }

    Ok(())
}

const INITIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id                    TEXT PRIMARY KEY,
    name                  TEXT NOT NULL,
    created_at            TEXT NOT NULL,
    turn_number           INTEGER NOT NULL DEFAULT 0,
    world_time            INTEGER NOT NULL DEFAULT 360,
    current_location_id   TEXT,
    character_id          TEXT,
    is_active             BOOLEAN NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS characters (
    id                          TEXT PRIMARY KEY,
    game_id                     TEXT NOT NULL REFERENCES games(id),
    name                        TEXT NOT NULL,
    race                        TEXT,
    class_levels                TEXT NOT NULL DEFAULT '{}',
    xp                          INTEGER NOT NULL DEFAULT 0,
    ability_scores               TEXT NOT NULL DEFAULT '{}',
    hp_current                  INTEGER NOT NULL DEFAULT 0,
    hp_max                      INTEGER NOT NULL DEFAULT 0,
    armor_class                 INTEGER NOT NULL DEFAULT 10,
    proficiency_bonus           INTEGER NOT NULL DEFAULT 2,
    skill_proficiencies         TEXT NOT NULL DEFAULT '[]',
    saving_throw_proficiencies  TEXT NOT NULL DEFAULT '[]',
    equipped_weapon_id          TEXT,
    equipped_armor_id           TEXT,
    conditions                  TEXT NOT NULL DEFAULT '[]',
    hit_dice_remaining          INTEGER NOT NULL DEFAULT 1,
    gold                        INTEGER NOT NULL DEFAULT 0,
    current_location_id         TEXT
);

CREATE TABLE IF NOT EXISTS entities (
    id                TEXT PRIMARY KEY,
    game_id           TEXT NOT NULL REFERENCES games(id),
    name              TEXT NOT NULL,
    ability_scores    TEXT NOT NULL DEFAULT '{}',
    hp_current        INTEGER NOT NULL DEFAULT 0,
    hp_max            INTEGER NOT NULL DEFAULT 0,
    armor_class       INTEGER NOT NULL DEFAULT 10,
    attacks           TEXT NOT NULL DEFAULT '[]',
    behavior_tags     TEXT NOT NULL DEFAULT '[]',
    loot_table        TEXT NOT NULL DEFAULT '[]',
    is_hostile        BOOLEAN NOT NULL DEFAULT 0,
    is_alive          BOOLEAN NOT NULL DEFAULT 1,
    faction_id        TEXT,
    current_location_id TEXT,
    level             INTEGER NOT NULL DEFAULT 1,
    active_conditions TEXT NOT NULL DEFAULT '[]',
    quest_hook        TEXT,
    expires_at_time   INTEGER
);

CREATE TABLE IF NOT EXISTS locations (
    id              TEXT PRIMARY KEY,
    game_id         TEXT NOT NULL REFERENCES games(id),
    name            TEXT NOT NULL,
    region_id       TEXT,
    description     TEXT NOT NULL DEFAULT '',
    location_type   TEXT NOT NULL DEFAULT 'generic',
    items           TEXT NOT NULL DEFAULT '[]',
    visited         BOOLEAN NOT NULL DEFAULT 0,
    properties      TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS regions (
    id              TEXT PRIMARY KEY,
    game_id         TEXT NOT NULL REFERENCES games(id),
    name            TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    level_range_min INTEGER NOT NULL DEFAULT 1,
    level_range_max INTEGER NOT NULL DEFAULT 5,
    climate         TEXT NOT NULL DEFAULT 'temperate',
    faction         TEXT
);

CREATE TABLE IF NOT EXISTS inventory (
    id        TEXT PRIMARY KEY,
    game_id   TEXT NOT NULL REFERENCES games(id),
    owner_id  TEXT NOT NULL UNIQUE,
    items     TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS quests (
    id                TEXT PRIMARY KEY,
    game_id           TEXT NOT NULL REFERENCES games(id),
    name              TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'available',
    objectives        TEXT NOT NULL DEFAULT '[]',
    quest_giver_id    TEXT,
    reward_gold       INTEGER NOT NULL DEFAULT 0,
    reward_xp         INTEGER NOT NULL DEFAULT 0,
    chain_depth       INTEGER NOT NULL DEFAULT 0,
    allows_followup   BOOLEAN NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS combat_instances (
    id                  TEXT PRIMARY KEY,
    game_id             TEXT NOT NULL REFERENCES games(id),
    is_active           BOOLEAN NOT NULL DEFAULT 1,
    round_number        INTEGER NOT NULL DEFAULT 1,
    current_turn_index  INTEGER NOT NULL DEFAULT 0,
    combatants          TEXT NOT NULL DEFAULT '[]',
    turn_order          TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS events (
    id                  TEXT PRIMARY KEY,
    game_id             TEXT NOT NULL REFERENCES games(id),
    event_type          TEXT NOT NULL,
    turn_number         INTEGER NOT NULL,
    timestamp           TEXT NOT NULL,
    actor_id            TEXT,
    target_id           TEXT,
    location_id         TEXT,
    description         TEXT NOT NULL DEFAULT '',
    mechanical_details  TEXT NOT NULL DEFAULT '{}',
    timeline_id         TEXT NOT NULL DEFAULT 'prime'
);

CREATE INDEX IF NOT EXISTS idx_events_game_order ON events(game_id, timestamp, id);
CREATE INDEX IF NOT EXISTS idx_events_actor ON events(game_id, actor_id);
CREATE INDEX IF NOT EXISTS idx_events_location ON events(game_id, location_id);
CREATE INDEX IF NOT EXISTS idx_events_type ON events(game_id, event_type);

CREATE TRIGGER IF NOT EXISTS prevent_event_update
BEFORE UPDATE ON events
BEGIN
    SELECT RAISE(ABORT, 'events are immutable');
END;

CREATE TRIGGER IF NOT EXISTS prevent_event_delete
BEFORE DELETE ON events
BEGIN
    SELECT RAISE(ABORT, 'events are immutable');
END;

CREATE TABLE IF NOT EXISTS intents (
    id          TEXT PRIMARY KEY,
    game_id     TEXT NOT NULL REFERENCES games(id),
    intent_type TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    data        TEXT NOT NULL DEFAULT '{}',
    is_active   BOOLEAN NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
"#;

const DIRECTOR_COLUMNS: &str = r#"
ALTER TABLE entities ADD COLUMN generated BOOLEAN NOT NULL DEFAULT 0;
ALTER TABLE locations ADD COLUMN generated BOOLEAN NOT NULL DEFAULT 0;
ALTER TABLE quests ADD COLUMN generated BOOLEAN NOT NULL DEFAULT 0;
ALTER TABLE quests ADD COLUMN npc_motivation TEXT;
"#;

const SURVIVAL_AND_PROGRESSION: &str = r#"
ALTER TABLE characters ADD COLUMN hunger INTEGER NOT NULL DEFAULT 100;
ALTER TABLE characters ADD COLUMN thirst INTEGER NOT NULL DEFAULT 100;
ALTER TABLE characters ADD COLUMN warmth INTEGER NOT NULL DEFAULT 100;
ALTER TABLE characters ADD COLUMN morale INTEGER NOT NULL DEFAULT 100;

CREATE TABLE IF NOT EXISTS trade_skills (
    character_id TEXT NOT NULL REFERENCES characters(id),
    skill        TEXT NOT NULL,
    level        INTEGER NOT NULL DEFAULT 0,
    xp           INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (character_id, skill)
);

CREATE TABLE IF NOT EXISTS known_recipes (
    character_id TEXT NOT NULL REFERENCES characters(id),
    recipe_id    TEXT NOT NULL,
    PRIMARY KEY (character_id, recipe_id)
);
"#;

const REPUTATION_AND_WORLD_CLOCK: &str = r#"
CREATE TABLE IF NOT EXISTS faction_reputation (
    game_id    TEXT NOT NULL REFERENCES games(id),
    faction_id TEXT NOT NULL,
    value      INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (game_id, faction_id)
);

CREATE TABLE IF NOT EXISTS npc_reputation (
    game_id   TEXT NOT NULL REFERENCES games(id),
    entity_id TEXT NOT NULL,
    affinity  INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (game_id, entity_id)
);

CREATE TABLE IF NOT EXISTS bounties (
    game_id    TEXT NOT NULL REFERENCES games(id),
    faction_id TEXT NOT NULL,
    amount     INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (game_id, faction_id)
);
"#;

const SHOPS_DEATH_WOUNDS: &str = r#"
CREATE TABLE IF NOT EXISTS shops (
    id             TEXT PRIMARY KEY,
    game_id        TEXT NOT NULL REFERENCES games(id),
    npc_id         TEXT NOT NULL,
    gold_reserve   INTEGER NOT NULL DEFAULT 100,
    stock          TEXT NOT NULL DEFAULT '[]',
    base_stock     TEXT NOT NULL DEFAULT '[]',
    last_restock_turn INTEGER NOT NULL DEFAULT 0
);

ALTER TABLE characters ADD COLUMN wounds TEXT NOT NULL DEFAULT '[]';
"#;

const COMPANIONS_AND_HOUSING: &str = r#"
CREATE TABLE IF NOT EXISTS companions (
    id           TEXT PRIMARY KEY,
    game_id      TEXT NOT NULL REFERENCES games(id),
    entity_id    TEXT NOT NULL,
    name         TEXT NOT NULL,
    is_active    BOOLEAN NOT NULL DEFAULT 1,
    affinity     INTEGER NOT NULL DEFAULT 0,
    recruited_at_turn INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS housing (
    id            TEXT PRIMARY KEY,
    game_id       TEXT NOT NULL REFERENCES games(id),
    character_id  TEXT NOT NULL,
    name          TEXT NOT NULL,
    upgrade_level INTEGER NOT NULL DEFAULT 0,
    storage       TEXT NOT NULL DEFAULT '[]'
);

ALTER TABLE characters ADD COLUMN multiclass_levels TEXT NOT NULL DEFAULT '{}';
"#;

const CONNECTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS location_connections (
    id                 TEXT PRIMARY KEY,
    game_id            TEXT NOT NULL,
    source_location_id TEXT NOT NULL,
    target_location_id TEXT NOT NULL,
    direction          TEXT NOT NULL,
    description        TEXT NOT NULL DEFAULT '',
    is_locked          BOOLEAN NOT NULL DEFAULT 0,
    lock_key_item_id   TEXT,
    lock_skill         TEXT,
    lock_dc            INTEGER,
    UNIQUE(game_id, source_location_id, direction)
);

CREATE INDEX IF NOT EXISTS idx_conn_source ON location_connections(game_id, source_location_id);
CREATE INDEX IF NOT EXISTS idx_conn_target ON location_connections(game_id, target_location_id);
"#;

const SNAPSHOTS_AND_TIMELINES: &str = r#"
CREATE TABLE IF NOT EXISTS snapshots (
    id               TEXT PRIMARY KEY,
    game_id          TEXT NOT NULL REFERENCES games(id),
    turn_number      INTEGER NOT NULL,
    world_time       INTEGER NOT NULL,
    timestamp        TEXT NOT NULL,
    trigger          TEXT NOT NULL,
    location_id      TEXT NOT NULL,
    player_state     TEXT NOT NULL,
    inventory_state  TEXT NOT NULL,
    world_state      TEXT NOT NULL,
    quest_state      TEXT NOT NULL,
    social_state     TEXT NOT NULL,
    metadata         TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_snapshot_game ON snapshots(game_id, turn_number DESC);

ALTER TABLE games ADD COLUMN loop_count INTEGER NOT NULL DEFAULT 0;
ALTER TABLE games ADD COLUMN timeline_id TEXT NOT NULL DEFAULT 'prime';
"#;

const CLASS_RESOURCES_AND_TRAITS: &str = r#"
ALTER TABLE characters ADD COLUMN class_resources TEXT NOT NULL DEFAULT '{}';
ALTER TABLE characters ADD COLUMN known_spells TEXT NOT NULL DEFAULT '[]';
ALTER TABLE characters ADD COLUMN prepared_spells TEXT NOT NULL DEFAULT '[]';
ALTER TABLE characters ADD COLUMN custom_spells TEXT NOT NULL DEFAULT '[]';
ALTER TABLE characters ADD COLUMN spell_slots_max TEXT NOT NULL DEFAULT '{}';
ALTER TABLE characters ADD COLUMN spell_slots_remaining TEXT NOT NULL DEFAULT '{}';

CREATE TABLE IF NOT EXISTS character_traits (
    id                 TEXT PRIMARY KEY,
    game_id            TEXT NOT NULL REFERENCES games(id),
    character_id       TEXT NOT NULL,
    name               TEXT NOT NULL,
    pattern            TEXT NOT NULL,
    tier               INTEGER NOT NULL,
    effects            TEXT NOT NULL DEFAULT '[]',
    acquired_at_turn   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS behavior_counters (
    game_id TEXT NOT NULL REFERENCES games(id),
    pattern TEXT NOT NULL,
    count   INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (game_id, pattern)
);
"#;

const ELEMENTS_SPELLS_AND_SIZE: &str = r#"
CREATE TABLE IF NOT EXISTS discovered_combinations (
    game_id      TEXT NOT NULL REFERENCES games(id),
    character_id TEXT NOT NULL,
    combination  TEXT NOT NULL,
    PRIMARY KEY (game_id, character_id, combination)
);

ALTER TABLE entities ADD COLUMN size TEXT NOT NULL DEFAULT 'medium';
ALTER TABLE characters ADD COLUMN size TEXT NOT NULL DEFAULT 'medium';
"#;

/// Every structured field a repository round-trips is, in practice,
/// the entire aggregate minus the handful of columns queries filter and sort
/// on. Rather than spread one column per struct field across the schema
/// above, each aggregate table carries one `data` blob holding the full
/// serialized struct; the indexed columns stay in sync on every write so the
/// query patterns (by location, by status, recent-N, ...) still run
/// as plain SQL `WHERE`/`ORDER BY` clauses against real columns.
const BLOB_COLUMNS: &str = r#"
ALTER TABLE characters ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE entities ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE locations ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE regions ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE quests ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE combat_instances ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE companions ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE housing ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE shops ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE character_traits ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE location_connections ADD COLUMN data TEXT NOT NULL DEFAULT '{}';
ALTER TABLE events ADD COLUMN is_canonical BOOLEAN NOT NULL DEFAULT 1;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn fresh_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite pool")
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = fresh_pool().await;
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn event_table_rejects_updates() {
        let pool = fresh_pool().await;
        run(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO games (id, name, created_at) VALUES ('g1', 'Test', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO events (id, game_id, event_type, turn_number, timestamp) \
             VALUES ('e1', 'g1', 'TURN_COMPLETED', 1, '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = sqlx::query("UPDATE events SET description = 'tampered' WHERE id = 'e1'")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
