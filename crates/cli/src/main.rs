//! The `wrldcore` binary: a terminal front end around the turn pipeline.
//! Three subcommands, matching the surface the engine crate is built around
//! rather than anything of its own — this crate owns no game logic, only
//! wiring and the read-eval-print loop.

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use wrldcore_domain::ids::{FactionId, GameId};
use wrldcore_domain::model::Game;
use wrldcore_engine::content::{instantiate_character, instantiate_region, ContentLoader};
use wrldcore_engine::director::Director;
use wrldcore_engine::llm::{HttpLlmProvider, NullLlmProvider};
use wrldcore_engine::random::SystemRandom;
use wrldcore_engine::retrieval::{HttpRetrievalStore, NullRetrievalStore};
use wrldcore_engine::store::repos;
use wrldcore_engine::systems::SystemRegistry;
use wrldcore_engine::{AppConfig, DataStore, TurnPipeline};

#[derive(Parser)]
#[command(name = "wrldcore", about = "A single-player text RPG core with a rewindable timeline.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start or resume a game.
    Play {
        /// Save name to start or resume. Defaults to "default".
        #[arg(long, default_value = "default")]
        save: String,
        /// Start a brand new game under this save name, overwriting none —
        /// fails if a save by this name is already active.
        #[arg(long)]
        new: bool,
        /// Override the configured LLM model name for this run.
        #[arg(long)]
        model: Option<String>,
    },
    /// List active saves.
    Saves,
    /// Validate configuration and content without starting a game.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("loading configuration")?;

    match cli.command {
        Command::Play { save, new, model } => play(config, save, new, model).await,
        Command::Saves => saves(config).await,
        Command::Check => check(config).await,
    }
}

async fn check(config: AppConfig) -> Result<()> {
    let store = DataStore::connect_in_memory().await.context("migrating schema in-memory")?;
    drop(store);
    let catalog = ContentLoader::load_all(&config.content_dir).context("loading content bundles")?;
    println!(
        "content ok: {} races, {} classes, {} items, {} spells, {} factions, {} regions",
        catalog.races.len(),
        catalog.classes.len(),
        catalog.items.len(),
        catalog.spells.len(),
        catalog.factions.len(),
        catalog.regions.len(),
    );
    println!("database path: {} (not touched by check)", config.database_path);
    Ok(())
}

async fn saves(config: AppConfig) -> Result<()> {
    let store = DataStore::connect(&config.database_path).await.context("opening database")?;
    let games = repos::game::list_active(store.pool()).await.context("listing saves")?;
    if games.is_empty() {
        println!("no active saves");
        return Ok(());
    }
    for game in games {
        println!("{}\tturn {}\tloop {}\t{}", game.name, game.turn_number, game.loop_count, game.timeline_id);
    }
    Ok(())
}

async fn play(config: AppConfig, save: String, new: bool, model: Option<String>) -> Result<()> {
    let store = DataStore::connect(&config.database_path).await.context("opening database")?;
    let catalog = ContentLoader::load_all(&config.content_dir).context("loading content bundles")?;

    let existing = repos::game::list_active(store.pool())
        .await
        .context("listing saves")?
        .into_iter()
        .find(|g| g.name == save);

    let game = match (existing, new) {
        (Some(_), true) => bail!("a save named '{save}' already exists; drop --new to resume it"),
        (Some(game), false) => game,
        (None, _) => bootstrap_game(&store, &catalog, &save).await.context("starting a new game")?,
    };

    let llm_model = model.unwrap_or(config.llm_model.clone());
    let llm: Box<dyn wrldcore_engine::llm::LlmProvider> = if config.llm_base_url.is_empty() {
        Box::new(NullLlmProvider)
    } else {
        Box::new(HttpLlmProvider::new(config.llm_base_url.clone(), llm_model, config.llm_timeout()))
    };
    let retrieval: Box<dyn wrldcore_engine::retrieval::RetrievalStore> = match &config.retrieval_base_url {
        Some(url) => Box::new(HttpRetrievalStore::new(url.clone())),
        None => Box::new(NullRetrievalStore),
    };
    let default_factions: Vec<FactionId> = catalog.factions.keys().map(|slug| FactionId::from_content_slug(slug)).collect();
    let director = Director::new(llm, retrieval, default_factions);

    let pipeline = TurnPipeline::new(store, SystemRegistry::standard(), catalog, director, config.snapshot_retention);
    let random = SystemRandom;

    println!("Welcome back to {}. Turn {}, loop {}.", save, game.turn_number, game.loop_count);
    println!("Type your action, or 'quit' to save and exit.");

    run_repl(&pipeline, game.id, &random).await
}

async fn run_repl(pipeline: &TurnPipeline, game_id: GameId, random: &SystemRandom) -> Result<()> {
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        line.clear();
        if stdin.read_line(&mut line).context("reading input")? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        match pipeline.run_turn(game_id, input, random).await {
            Ok(result) => {
                println!("{}", result.outcome_description);
                for event in &result.events {
                    info!(event_type = ?event.event_type, "{}", event.description);
                }
            }
            Err(err) => {
                eprintln!("that turn could not be resolved: {err}");
            }
        }
    }

    println!("Until next time.");
    Ok(())
}

/// Stand up a brand new game: the first region and the first race/class pair
/// the loaded catalog offers. A real front end would prompt for these; this
/// terminal shell keeps character creation out of scope and just picks the
/// catalog's first entries deterministically.
async fn bootstrap_game(store: &DataStore, catalog: &wrldcore_engine::content::ContentCatalog, save_name: &str) -> Result<Game> {
    let (_, bundle) = catalog.regions.iter().next().context("no region content loaded; populate the content directory's regions/")?;
    let race = catalog.races.values().next().context("no race content loaded")?;
    let class = catalog.classes.values().next().context("no class content loaded")?;

    let game_id = GameId::new();
    let instantiated = instantiate_region(game_id, bundle, &catalog.factions).context("instantiating region content")?;

    let start_slug = bundle.locations.iter().find(|l| l.is_starting_location).map(|l| l.slug.as_str());
    let start_location = start_slug
        .and_then(|slug| instantiated.location_ids.get(slug).copied())
        .or_else(|| instantiated.locations.first().map(|l| l.id))
        .context("region content defines no locations")?;

    let character = instantiate_character(game_id, "Wanderer", race, class, start_location)?;

    let mut tx = store.transaction().await.context("opening bootstrap transaction")?;
    repos::region::save(&mut *tx, &instantiated.region).await?;
    for location in &instantiated.locations {
        repos::location::save(&mut *tx, location).await?;
    }
    for connection in &instantiated.connections {
        repos::connection::add_connection(&mut *tx, connection).await?;
    }
    for entity in &instantiated.entities {
        repos::entity::save(&mut *tx, entity).await?;
    }
    for quest in &instantiated.quests {
        repos::quest::save(&mut *tx, quest).await?;
    }
    for shop_template in &instantiated.shops {
        if let Some(npc_id) = instantiated.entity_ids.get(&shop_template.npc_slug).copied() {
            let stock = shop_template
                .stock
                .iter()
                .map(|s| wrldcore_domain::model::shop::ShopStock {
                    item_id: wrldcore_domain::ids::ItemId::from_content_slug(&s.item_id),
                    quantity: s.quantity,
                    base_quantity: s.quantity,
                    price_override: s.price_override,
                })
                .collect();
            let shop = wrldcore_domain::model::shop::Shop {
                id: wrldcore_domain::ids::ShopId::new(),
                game_id,
                npc_id,
                gold_reserve: 500,
                stock,
                last_restock_turn: 0,
                price_modifier: 1.0,
            };
            repos::shop::save(&mut *tx, &shop).await?;
        }
    }
    repos::character::save(&mut *tx, &character).await?;

    let game = Game::new(save_name, character.id, start_location);
    repos::game::save(&mut *tx, &game).await?;
    tx.commit().await.context("committing bootstrap transaction")?;

    Ok(game)
}
