use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{GameId, RegionId};
use wrldcore_domain::model::location::Region;
use wrldcore_domain::rules::survival::Climate;

use crate::error::{EngineError, EngineResult};

pub async fn save<'e, E>(executor: E, region: &Region) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO regions (id, game_id, name, description, level_range_min, level_range_max, climate, faction)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            level_range_min = excluded.level_range_min,
            level_range_max = excluded.level_range_max,
            climate = excluded.climate,
            faction = excluded.faction
        "#,
    )
    .bind(region.id.to_string())
    .bind(region.game_id.to_string())
    .bind(&region.name)
    .bind(&region.description)
    .bind(region.level_range_min)
    .bind(region.level_range_max)
    .bind(climate_str(region.climate))
    .bind(&region.faction)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get<'e, E>(executor: E, id: RegionId) -> EngineResult<Region>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, game_id, name, description, level_range_min, level_range_max, climate, faction \
         FROM regions WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| EngineError::not_found("region", id.to_string()))?;

    row_to_region(&row)
}

pub async fn list_for_game<'e, E>(executor: E, game_id: GameId) -> EngineResult<Vec<Region>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, game_id, name, description, level_range_min, level_range_max, climate, faction \
         FROM regions WHERE game_id = ?",
    )
    .bind(game_id.to_string())
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_region).collect()
}

fn row_to_region(row: &sqlx::sqlite::SqliteRow) -> EngineResult<Region> {
    let id: String = row.get("id");
    let game_id: String = row.get("game_id");
    let climate: String = row.get("climate");
    Ok(Region {
        id: id.parse().map_err(|_| EngineError::SchemaFailure("invalid region id".into()))?,
        game_id: game_id.parse().map_err(|_| EngineError::SchemaFailure("invalid game id".into()))?,
        name: row.get("name"),
        description: row.get("description"),
        level_range_min: row.get("level_range_min"),
        level_range_max: row.get("level_range_max"),
        climate: parse_climate(&climate),
        faction: row.get("faction"),
    })
}

fn climate_str(climate: Climate) -> &'static str {
    match climate {
        Climate::Freezing => "freezing",
        Climate::Cold => "cold",
        Climate::Cool => "cool",
        Climate::Temperate => "temperate",
        Climate::Warm => "warm",
        Climate::Hot => "hot",
        Climate::Arid => "arid",
    }
}

fn parse_climate(s: &str) -> Climate {
    match s {
        "freezing" => Climate::Freezing,
        "cold" => Climate::Cold,
        "cool" => Climate::Cool,
        "warm" => Climate::Warm,
        "hot" => Climate::Hot,
        "arid" => Climate::Arid,
        _ => Climate::Temperate,
    }
}
