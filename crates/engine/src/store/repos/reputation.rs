//! Faction/NPC reputation and bounty ledgers. Every write clamps
//! through `rules::reputation::clamp_reputation` / `Bounty::decay` before it
//! reaches the store — the repository trusts the caller already clamped.

use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{EntityId, FactionId, GameId};
use wrldcore_domain::model::reputation::{Bounty, FactionReputation, NpcReputation};

use crate::error::EngineResult;

pub async fn get_faction_reputation<'e, E>(executor: E, game_id: GameId, faction_id: FactionId) -> EngineResult<FactionReputation>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT value FROM faction_reputation WHERE game_id = ? AND faction_id = ?")
        .bind(game_id.to_string())
        .bind(faction_id.to_string())
        .fetch_optional(executor)
        .await?;
    Ok(FactionReputation {
        game_id,
        faction_id,
        value: row.map(|r| r.get::<i32, _>("value")).unwrap_or(0),
    })
}

pub async fn set_faction_reputation<'e, E>(executor: E, rep: &FactionReputation) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO faction_reputation (game_id, faction_id, value)
        VALUES (?, ?, ?)
        ON CONFLICT(game_id, faction_id) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(rep.game_id.to_string())
    .bind(rep.faction_id.to_string())
    .bind(rep.value)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_faction_reputation<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<FactionReputation>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT faction_id, value FROM faction_reputation WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter()
        .map(|r| {
            let faction_id: String = r.get("faction_id");
            Ok(FactionReputation {
                game_id,
                faction_id: faction_id
                    .parse()
                    .map_err(|_| crate::error::EngineError::SchemaFailure("invalid faction id".into()))?,
                value: r.get("value"),
            })
        })
        .collect()
}

pub async fn get_npc_reputation<'e, E>(executor: E, game_id: GameId, entity_id: EntityId) -> EngineResult<NpcReputation>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT affinity FROM npc_reputation WHERE game_id = ? AND entity_id = ?")
        .bind(game_id.to_string())
        .bind(entity_id.to_string())
        .fetch_optional(executor)
        .await?;
    Ok(NpcReputation {
        game_id,
        entity_id,
        value: row.map(|r| r.get::<i32, _>("affinity")).unwrap_or(0),
    })
}

pub async fn list_npc_reputation<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<NpcReputation>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT entity_id, affinity FROM npc_reputation WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter()
        .map(|r| {
            let entity_id: String = r.get("entity_id");
            Ok(NpcReputation {
                game_id,
                entity_id: entity_id
                    .parse()
                    .map_err(|_| crate::error::EngineError::SchemaFailure("invalid entity id".into()))?,
                value: r.get("affinity"),
            })
        })
        .collect()
}

pub async fn set_npc_reputation<'e, E>(executor: E, rep: &NpcReputation) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO npc_reputation (game_id, entity_id, affinity)
        VALUES (?, ?, ?)
        ON CONFLICT(game_id, entity_id) DO UPDATE SET affinity = excluded.affinity
        "#,
    )
    .bind(rep.game_id.to_string())
    .bind(rep.entity_id.to_string())
    .bind(rep.value)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_bounty<'e, E>(executor: E, game_id: GameId, region: &str) -> EngineResult<Bounty>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT amount FROM bounties WHERE game_id = ? AND faction_id = ?")
        .bind(game_id.to_string())
        .bind(region)
        .fetch_optional(executor)
        .await?;
    Ok(Bounty {
        game_id,
        region: region.to_string(),
        amount: row.map(|r| r.get::<i32, _>("amount")).unwrap_or(0),
    })
}

pub async fn set_bounty<'e, E>(executor: E, bounty: &Bounty) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO bounties (game_id, faction_id, amount)
        VALUES (?, ?, ?)
        ON CONFLICT(game_id, faction_id) DO UPDATE SET amount = excluded.amount
        "#,
    )
    .bind(bounty.game_id.to_string())
    .bind(&bounty.region)
    .bind(bounty.amount)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_bounties<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Bounty>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT faction_id, amount FROM bounties WHERE game_id = ?")
        .bind(game_id.to_string())
        .fetch_all(executor)
        .await?;
    Ok(rows
        .iter()
        .map(|r| Bounty {
            game_id,
            region: r.get("faction_id"),
            amount: r.get("amount"),
        })
        .collect())
}

/// Wipes every reputation/bounty row for a game, used by the snapshotter when
/// a rewind's restore configuration calls for "losing" that partition —
/// replaced immediately afterward by whatever the snapshot captured.
pub async fn clear_all_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM faction_reputation WHERE game_id = ?")
        .bind(game_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn clear_npc_reputation_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM npc_reputation WHERE game_id = ?")
        .bind(game_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn clear_bounties_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM bounties WHERE game_id = ?")
        .bind(game_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}
