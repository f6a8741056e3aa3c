use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{GameId, LocationId, RegionId};
use wrldcore_domain::model::location::Location;

use super::{from_json, to_json};
use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, location: &Location) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let data = to_json(location)?;
    sqlx::query(
        r#"
        INSERT INTO locations (id, game_id, name, region_id, visited, data)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            region_id = excluded.region_id,
            visited = excluded.visited,
            data = excluded.data
        "#,
    )
    .bind(location.id.to_string())
    .bind(location.game_id.to_string())
    .bind(&location.name)
    .bind(location.region_id.to_string())
    .bind(location.visited)
    .bind(data)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: LocationId) -> EngineResult<Location>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT data FROM locations WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| EngineError::not_found("location", id.to_string()))?;
    from_json(&row.get::<String, _>("data"))
}

pub async fn list_in_region<'e, E>(executor: E, game_id: GameId, region_id: RegionId) -> EngineResult<Vec<Location>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT data FROM locations WHERE game_id = ? AND region_id = ?")
        .bind(game_id.to_string())
        .bind(region_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(|r| from_json(&r.get::<String, _>("data"))).collect()
}
