//! Crafting and spellcasting progression ledgers. Trade skills and known
//! recipes get their own small tables; known/prepared/custom spells ride on
//! the character's own blob columns since they're always read alongside the
//! rest of the character anyway.

use sqlx::{Row, Sqlite};
use wrldcore_domain::ids::{CharacterId, GameId, RecipeId};
use wrldcore_domain::model::progression::{DiscoveredCombination, KnownRecipe, TradeSkill};

use crate::error::EngineResult;

pub async fn save_trade_skill<'e, E>(executor: E, skill: &TradeSkill) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO trade_skills (character_id, skill, level, xp)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(character_id, skill) DO UPDATE SET level = excluded.level, xp = excluded.xp
        "#,
    )
    .bind(skill.character_id.to_string())
    .bind(&skill.skill_name)
    .bind(skill.level)
    .bind(skill.xp)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_trade_skills<'e, E>(executor: E, game_id: GameId, character_id: CharacterId) -> EngineResult<Vec<TradeSkill>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT skill, level, xp FROM trade_skills WHERE character_id = ?")
        .bind(character_id.to_string())
        .fetch_all(executor)
        .await?;
    Ok(rows
        .iter()
        .map(|r| TradeSkill {
            game_id,
            character_id,
            skill_name: r.get("skill"),
            level: r.get("level"),
            xp: r.get("xp"),
        })
        .collect())
}

pub async fn learn_recipe<'e, E>(executor: E, recipe: &KnownRecipe) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT OR IGNORE INTO known_recipes (character_id, recipe_id) VALUES (?, ?)")
        .bind(recipe.character_id.to_string())
        .bind(recipe.recipe_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn list_known_recipes<'e, E>(executor: E, game_id: GameId, character_id: CharacterId) -> EngineResult<Vec<KnownRecipe>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT recipe_id FROM known_recipes WHERE character_id = ?")
        .bind(character_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter()
        .map(|r| {
            let recipe_id: String = r.get("recipe_id");
            Ok(KnownRecipe {
                game_id,
                character_id,
                recipe_id: recipe_id
                    .parse::<RecipeId>()
                    .map_err(|_| crate::error::EngineError::SchemaFailure("invalid recipe id".into()))?,
            })
        })
        .collect()
}

pub async fn discover_combination<'e, E>(executor: E, combo: &DiscoveredCombination) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT OR IGNORE INTO discovered_combinations (game_id, character_id, combination) VALUES (?, ?, ?)",
    )
    .bind(combo.game_id.to_string())
    .bind(combo.character_id.to_string())
    .bind(format!("{}+{}", combo.element_a, combo.element_b))
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_discovered_combinations<'e, E>(
    executor: E,
    game_id: GameId,
    character_id: CharacterId,
) -> EngineResult<Vec<DiscoveredCombination>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("SELECT combination FROM discovered_combinations WHERE game_id = ? AND character_id = ?")
        .bind(game_id.to_string())
        .bind(character_id.to_string())
        .fetch_all(executor)
        .await?;
    Ok(rows
        .iter()
        .filter_map(|r| {
            let combo: String = r.get("combination");
            let (a, b) = combo.split_once('+')?;
            Some(DiscoveredCombination {
                game_id,
                character_id,
                element_a: a.to_string(),
                element_b: b.to_string(),
            })
        })
        .collect())
}
