//! Character trait awards and the behavior counters that trigger them.

use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{CharacterId, GameId, TraitId};
use wrldcore_domain::model::traits::{BehaviorPattern, CharacterTrait};

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, character_trait: &CharacterTrait, acquired_at_turn: i64) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO character_traits
            (id, game_id, character_id, name, pattern, tier, effects, acquired_at_turn, data)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            tier = excluded.tier,
            effects = excluded.effects,
            data = excluded.data
        "#,
    )
    .bind(character_trait.id.to_string())
    .bind(character_trait.game_id.to_string())
    .bind(character_trait.character_id.to_string())
    .bind(&character_trait.name)
    .bind(pattern_str(character_trait.pattern))
    .bind(character_trait.tier)
    .bind(to_json(&character_trait.effects)?)
    .bind(acquired_at_turn)
    .bind(to_json(character_trait)?)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: TraitId) -> EngineResult<CharacterTrait>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM character_traits WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("character_trait", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn list_for_character<'e, E>(executor: E, game_id: GameId, character_id: CharacterId) -> EngineResult<Vec<CharacterTrait>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM character_traits WHERE game_id = ? AND character_id = ?")
        .bind(game_id.to_string())
        .bind(character_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}

/// Count of the character's currently-held traits for `pattern`, used to
/// decide whether a new tier's threshold has already been satisfied.
pub async fn count_for_pattern<'e, E>(
    executor: E,
    game_id: GameId,
    character_id: CharacterId,
    pattern: BehaviorPattern,
) -> EngineResult<i64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM character_traits WHERE game_id = ? AND character_id = ? AND pattern = ?",
    )
    .bind(game_id.to_string())
    .bind(character_id.to_string())
    .bind(pattern_str(pattern))
    .fetch_one(executor)
    .await?;
    Ok(count)
}

pub async fn increment_behavior_counter<'e, E>(executor: E, game_id: GameId, pattern: BehaviorPattern) -> EngineResult<i32>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO behavior_counters (game_id, pattern, count)
        VALUES (?, ?, 1)
        ON CONFLICT(game_id, pattern) DO UPDATE SET count = count + 1
        "#,
    )
    .bind(game_id.to_string())
    .bind(pattern_str(pattern))
    .execute(executor)
    .await?;
    Ok(0)
}

pub async fn get_behavior_counter<'e, E>(executor: E, game_id: GameId, pattern: BehaviorPattern) -> EngineResult<i32>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT count FROM behavior_counters WHERE game_id = ? AND pattern = ?")
        .bind(game_id.to_string())
        .bind(pattern_str(pattern))
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.get::<i32, _>("count")).unwrap_or(0))
}

fn pattern_str(pattern: BehaviorPattern) -> &'static str {
    match pattern {
        BehaviorPattern::Aggressive => "aggressive",
        BehaviorPattern::Diplomatic => "diplomatic",
        BehaviorPattern::Stealthy => "stealthy",
        BehaviorPattern::Generous => "generous",
        BehaviorPattern::Mercantile => "mercantile",
        BehaviorPattern::Curious => "curious",
    }
}

