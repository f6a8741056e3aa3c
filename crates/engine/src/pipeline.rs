//! The turn pipeline: classify -> load context -> validate -> dispatch ->
//! resolve -> mutate -> append events -> advance clock -> world tick ->
//! post-turn consequences. Steps 5-7 (mutate/append/advance) commit as one
//! transaction; the world tick and each post-turn consequence run in their
//! own, independently atomic, transactions so a failure downstream never
//! rolls back a turn that already completed.

use serde_json::{json, Value};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, warn};

use wrldcore_domain::ids::{CharacterId, CompanionId, GameId, HousingId, ItemId};
use wrldcore_domain::model::action::{Action, ActionResult, GameContext, Mutation};
use wrldcore_domain::model::combat::CombatState;
use wrldcore_domain::model::companion::{Companion, Housing};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::model::progression::{KnownSpell, PreparedSpell};
use wrldcore_domain::model::reputation::{Bounty, NpcReputation};
use wrldcore_domain::model::shop::ShopStock;
use wrldcore_domain::model::snapshot::{RestoreConfig, RewindTrigger};
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::combat_math::{self, NpcAction};
use wrldcore_domain::rules::conditions::can_take_actions;
use wrldcore_domain::rules::world_clock;

use crate::classifier::InputClassifier;
use crate::content::ContentCatalog;
use crate::director::Director;
use crate::error::{EngineError, EngineResult};
use crate::snapshotter;
use crate::store::{repos, DataStore};
use crate::systems::{combat as combat_system, SystemRegistry};
use crate::world_sim;

/// Minutes the world clock advances per resolved turn.
const MINUTES_PER_TURN: i32 = world_clock::MINUTES_PER_TURN;

/// A routine structural capture runs every this many turns, independent of
/// any gameplay trigger, so a death or artifact rewind always has something
/// recent to restore from.
const SNAPSHOT_INTERVAL_TURNS: i64 = 20;

pub struct TurnPipeline {
    store: DataStore,
    registry: SystemRegistry,
    catalog: ContentCatalog,
    director: Director,
    snapshot_retention: i64,
}

impl TurnPipeline {
    pub fn new(store: DataStore, registry: SystemRegistry, catalog: ContentCatalog, director: Director, snapshot_retention: i64) -> Self {
        Self { store, registry, catalog, director, snapshot_retention }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Run one full turn for `game_id` from raw player input. Never panics;
    /// every internal failure is recovered into a generic `ActionResult`
    /// rather than bubbling past this call, except store errors encountered
    /// while loading the game itself (there is no turn to recover without a
    /// game and character to hang it on).
    pub async fn run_turn(&self, game_id: GameId, raw_input: &str, random: &dyn RandomSource) -> EngineResult<ActionResult> {
        let pool = self.store.pool();
        let game = repos::game::get(pool, game_id).await?;
        let character = repos::character::get_for_game(pool, game_id).await?;
        let action = InputClassifier::classify(raw_input, &character.id.to_string());

        debug!(game_id = %game_id, turn = game.turn_number, action_type = %action.action_type, "classified action");

        let context = self.load_context(&game, &character).await?;

        if action.is_meta {
            let result = self.resolve_meta(&action, &context);
            return Ok(result);
        }

        if let Some(reason) = validate(&action, &context) {
            return Ok(ActionResult::empty_failure(reason));
        }

        let (result, advances_turn) = self.dispatch(&action, &context, random).await;
        if !advances_turn {
            return Ok(result);
        }

        self.apply_turn(game, context, action, result, random).await
    }

    /// Step 2: assemble the immutable snapshot every subsystem resolves
    /// against, from repositories.
    async fn load_context(&self, game: &wrldcore_domain::model::Game, character: &wrldcore_domain::model::Character) -> EngineResult<GameContext> {
        let pool = self.store.pool();

        let current_location = repos::location::get(pool, character.current_location_id).await?;
        let entities_here = repos::entity::list_at_location(pool, game.id, current_location.id).await?;
        let active_combat = repos::combat::get_active_for_game(pool, game.id).await?;
        let inventory = repos::inventory::get(pool, &character.id.to_string()).await?;
        let recent_events = repos::event::recent(pool, game.id, &game.timeline_id, 20).await?;
        let active_quests = repos::quest::list_active(pool, game.id).await?;
        let companions = repos::companion::list_active(pool, game.id, character.id).await?;
        let connections = repos::connection::list_from(pool, game.id, current_location.id).await?;

        let mut shop = None;
        for entity in &entities_here {
            if let Some(found) = repos::shop::get_for_npc(pool, game.id, entity.id).await? {
                shop = Some(found);
                break;
            }
        }
        let housing = repos::housing::list_for_character(pool, game.id, character.id).await?.into_iter().next();

        let trade_skills = repos::progression::list_trade_skills(pool, game.id, character.id).await?;
        let known_recipes = repos::progression::list_known_recipes(pool, game.id, character.id).await?;
        let discovered_combinations = repos::progression::list_discovered_combinations(pool, game.id, character.id).await?;

        // Known/prepared/custom spells live on the character's own blob
        // columns, not a separate repository, since they're always read
        // alongside the rest of the character anyway.
        let known_spells = character
            .known_spells
            .iter()
            .map(|&spell_id| KnownSpell { game_id: game.id, character_id: character.id, spell_id })
            .collect();
        let prepared_spells = character
            .prepared_spells
            .iter()
            .map(|&spell_id| PreparedSpell { game_id: game.id, character_id: character.id, spell_id })
            .collect();
        let custom_spells = character.custom_spells.clone();

        let faction_reputations = repos::reputation::list_faction_reputation(pool, game.id).await?;
        let mut npc_reputations = Vec::with_capacity(entities_here.len());
        for entity in &entities_here {
            npc_reputations.push(repos::reputation::get_npc_reputation(pool, game.id, entity.id).await?);
        }
        let bounties = repos::reputation::list_bounties(pool, game.id).await?;
        let traits = repos::trait_repo::list_for_character(pool, game.id, character.id).await?;

        Ok(GameContext {
            game_id: game.id,
            turn_number: game.turn_number,
            world_time: game.world_time,
            loop_count: game.loop_count,
            timeline_id: game.timeline_id.clone(),
            character: character.clone(),
            current_location,
            entities_here,
            active_combat,
            inventory,
            recent_events,
            active_quests,
            companions,
            connections,
            shop,
            housing,
            trade_skills,
            known_recipes,
            known_spells,
            prepared_spells,
            custom_spells,
            discovered_combinations,
            faction_reputations,
            npc_reputations,
            bounties,
            traits,
        })
    }

    /// `view_inventory`/`help`/`view_map`: no `GameSystem` claims these, so
    /// they're answered straight from `GameContext` without touching the
    /// registry. They cost no turn.
    fn resolve_meta(&self, action: &Action, context: &GameContext) -> ActionResult {
        match action.action_type.as_str() {
            "view_inventory" => {
                let mut lines = Vec::new();
                for stack in &context.inventory.items {
                    lines.push(format!("{} x{}", stack.item_id, stack.quantity));
                }
                if let Some(weapon) = context.character.equipped_weapon_id {
                    lines.push(format!("wielding {weapon}"));
                }
                if let Some(armor) = context.character.equipped_armor_id {
                    lines.push(format!("wearing {armor}"));
                }
                let description = if lines.is_empty() { "You carry nothing.".to_string() } else { lines.join("\n") };
                ActionResult::empty_success(description)
            }
            "help" => {
                let mut hints = self.registry.all_hints(context);
                hints.sort();
                hints.dedup();
                let description = if hints.is_empty() {
                    "Nothing obvious to do here.".to_string()
                } else {
                    format!("You could try:\n{}", hints.join("\n"))
                };
                ActionResult::empty_success(description)
            }
            "view_map" => {
                let mut lines = vec![format!("{} ({})", context.current_location.name, if context.current_location.visited { "visited" } else { "unvisited" })];
                for conn in &context.connections {
                    let lock_note = if conn.is_locked { " (locked)" } else { "" };
                    lines.push(format!("  {} -> {}{}", conn.direction.as_str(), conn.target_location_id, lock_note));
                }
                ActionResult::empty_success(lines.join("\n"))
            }
            other => ActionResult::empty_failure(format!("don't know how to show {other}")),
        }
    }

    /// Step 3: pipeline-level validation performed before a subsystem ever
    /// sees the action. Rejections here do not advance the turn.
    async fn dispatch(&self, action: &Action, context: &GameContext, random: &dyn RandomSource) -> (ActionResult, bool) {
        // Attacking outside an active encounter starts one.
        if action.action_type == "attack" && !context.active_combat.as_ref().is_some_and(|c| c.is_active()) {
            match self.begin_combat(action, context, random).await {
                Ok(started_context) => {
                    return self.resolve_with_registry(action, &started_context, random).await;
                }
                Err(err) => {
                    warn!(error = %err, "could not start combat");
                    return (ActionResult::empty_failure("There's nothing here to fight."), false);
                }
            }
        }

        // A move toward a direction with no outgoing connection is the
        // Director's cue to generate one on the spot, not a dead-end error.
        if action.action_type == "move" {
            if let Some(extended_context) = self.extend_move_context(action, context).await {
                return self.resolve_with_registry(action, &extended_context, random).await;
            }
        }

        self.resolve_with_registry(action, context, random).await
    }

    /// If `action` is a move toward a direction with no existing connection,
    /// has the Director generate one and returns a context with it grafted
    /// onto `connections` so the exploration system can resolve the move
    /// against it without a reload. Returns `None` when the direction is
    /// missing/unparseable or already connected, leaving `action` for
    /// `ExplorationSystem` to handle (or reject) as usual.
    async fn extend_move_context(&self, action: &Action, context: &GameContext) -> Option<GameContext> {
        let direction_str = action.param_str("direction")?;
        let direction = wrldcore_domain::model::location::Direction::parse(direction_str)?;
        if context.connections.iter().any(|c| c.direction == direction) {
            return None;
        }

        match self.director.generate_location_for_move(&self.store, context.game_id, context, direction).await {
            Ok(connection) => {
                let mut extended = context.clone();
                extended.connections.push(connection);
                Some(extended)
            }
            Err(err) => {
                warn!(error = %err, direction = direction_str, "could not generate a location for an unconnected direction");
                None
            }
        }
    }

    async fn resolve_with_registry(&self, action: &Action, context: &GameContext, random: &dyn RandomSource) -> (ActionResult, bool) {
        if let Some(system) = self.registry.find_handler(action, context) {
            return match system.resolve(action, context, &self.catalog, random) {
                Ok(result) => (result, true),
                Err(err) => {
                    warn!(error = %err, system = system.system_id(), "subsystem resolve failed, recovering");
                    let event = GameEvent::new(context.game_id, context.turn_number, EventType::Error, format!("action failed: {err}"))
                        .with_actor(action.actor_id.clone())
                        .with_location(context.current_location.id);
                    (
                        ActionResult {
                            success: false,
                            outcome_description: "Something goes wrong trying that.".to_string(),
                            dice_rolls: Vec::new(),
                            state_mutations: Vec::new(),
                            events: vec![event],
                            xp_gained: 0,
                        },
                        true,
                    )
                }
            };
        }

        match self.director.attempt_creative_action(action, context, &self.catalog, random).await {
            Some(result) => (result, true),
            None => (ActionResult::empty_failure(format!("You aren't sure how to \"{}\".", action.raw_input)), false),
        }
    }

    /// Build combatants and initiative for a freshly triggered encounter and
    /// return a context with `active_combat` populated, so the subsequent
    /// dispatch to `CombatSystem::resolve` sees an active fight.
    async fn begin_combat(&self, action: &Action, context: &GameContext, random: &dyn RandomSource) -> EngineResult<GameContext> {
        let target_id = action.target_id.as_deref().ok_or_else(|| EngineError::InvalidInput("attack requires a target".into()))?;
        let target = context.entity_at_location(target_id).ok_or_else(|| EngineError::not_found("Entity", target_id))?;

        let player_initiative_mod = context.character.ability_modifier(wrldcore_domain::rules::ability_scores::Ability::Dexterity);
        let (combatants, turn_order) = combat_system::start_combat(
            context.character.id.to_string(),
            player_initiative_mod,
            &[(target.id.to_string(), 0)],
            random,
        );

        let combat = wrldcore_domain::model::combat::CombatInstance {
            id: wrldcore_domain::ids::CombatId::new(),
            game_id: context.game_id,
            state: CombatState::InProgress,
            round_number: 1,
            current_turn_index: 0,
            combatants,
            turn_order,
        };
        repos::combat::save(self.store.pool(), &combat).await?;

        let mut started = context.clone();
        started.active_combat = Some(combat);
        Ok(started)
    }

    /// Steps 6-10: apply what `dispatch` produced, persist it, tick the
    /// clock and the world, then run post-turn consequences.
    async fn apply_turn(
        &self,
        mut game: wrldcore_domain::model::Game,
        context: GameContext,
        action: Action,
        mut result: ActionResult,
        random: &dyn RandomSource,
    ) -> EngineResult<ActionResult> {
        let mut tx = self.store.transaction().await?;

        for mutation in &result.state_mutations {
            apply_mutation(&mut tx, context.game_id, context.character.id, mutation).await?;
        }

        // A player attack that did not end the fight runs the defeated
        // side's turns immediately, inline, before the turn completes.
        if action.action_type == "attack" {
            if let Some(mut combat) = repos::combat::get_active_for_game(&mut *tx, context.game_id).await? {
                if combat.is_active() {
                    sync_combatant_deaths(&mut combat, &result.state_mutations);
                    if !combat.enemy_side_alive() {
                        combat.state = CombatState::Resolved;
                        result.events.push(
                            GameEvent::new(context.game_id, context.turn_number, EventType::CombatEnd, "The fight is over.".to_string())
                                .with_actor(context.character.id.to_string())
                                .with_location(context.current_location.id)
                                .with_timeline(context.timeline_id.clone()),
                        );
                    } else {
                        let npc_results = self.run_npc_turns(&mut tx, &mut combat, &context, random).await?;
                        for npc_result in npc_results {
                            for mutation in &npc_result.state_mutations {
                                apply_mutation(&mut tx, context.game_id, context.character.id, mutation).await?;
                            }
                            result.events.extend(npc_result.events);
                            result.dice_rolls.extend(npc_result.dice_rolls);
                        }
                        if !combat.player_side_alive() {
                            combat.state = CombatState::Resolved;
                        }
                    }
                    repos::combat::save(&mut *tx, &combat).await?;
                }
            }
        }

        if result.xp_gained > 0 {
            let mut character = repos::character::get(&mut *tx, context.character.id).await?;
            character.xp += result.xp_gained;
            character.level = wrldcore_domain::rules::leveling::level_for_xp(character.xp);
            character.proficiency_bonus = wrldcore_domain::rules::leveling::proficiency_bonus(character.level);
            repos::character::save(&mut *tx, &character).await?;
        }

        for event in &mut result.events {
            event.timeline_id = context.timeline_id.clone();
            repos::event::append(&mut *tx, event).await?;
        }

        game.world_time = world_clock::advance(game.world_time, 1);
        game.turn_number += 1;
        repos::event::append(
            &mut *tx,
            &GameEvent::new(game.id, game.turn_number, EventType::TurnCompleted, "turn resolved")
                .with_actor(action.actor_id.clone())
                .with_location(context.current_location.id)
                .with_timeline(context.timeline_id.clone()),
        )
        .await?;
        repos::game::save(&mut *tx, &game).await?;

        tx.commit().await?;

        if let Err(err) = world_sim::tick(&self.store, game.id, game.world_time, game.turn_number).await {
            warn!(error = %err, "world tick failed, continuing");
        }

        if let Err(err) = self.maybe_capture(&game, &context).await {
            warn!(error = %err, "periodic snapshot capture failed, continuing");
        }

        if let Err(err) = self.maybe_rewind_on_death(&game, &context).await {
            warn!(error = %err, "death rewind failed, continuing");
        }

        if let Err(err) = self.run_post_turn_consequences(game.id, &context, &result, random).await {
            warn!(error = %err, "post-turn consequences failed, continuing");
        }

        Ok(result)
    }

    /// A routine capture every [`SNAPSHOT_INTERVAL_TURNS`], tagged `Manual`
    /// since it isn't tied to any particular gameplay moment — just the
    /// periodic safety net a death or artifact rewind restores from.
    async fn maybe_capture(&self, game: &wrldcore_domain::model::Game, context: &GameContext) -> EngineResult<()> {
        if game.turn_number % SNAPSHOT_INTERVAL_TURNS != 0 {
            return Ok(());
        }
        snapshotter::capture(
            &self.store,
            game.id,
            context.character.id,
            game.turn_number,
            game.world_time,
            context.character.current_location_id,
            RewindTrigger::Manual,
            self.snapshot_retention,
        )
        .await?;
        Ok(())
    }

    /// When the turn just applied leaves the character dead, revive them and
    /// roll the rest of the game back to the latest snapshot under the
    /// `Death` restore policy — player and spellcasting state stay as just
    /// revived (never overwritten by the older snapshot), everything else
    /// the policy marks `lose` reverts.
    async fn maybe_rewind_on_death(&self, game: &wrldcore_domain::model::Game, context: &GameContext) -> EngineResult<()> {
        let pool = self.store.pool();
        let mut character = repos::character::get(pool, context.character.id).await?;
        if character.is_alive() {
            return Ok(());
        }

        let Some(snapshot) = repos::snapshot::latest_for_game(pool, game.id).await? else {
            return Ok(());
        };

        character.hp_current = character.hp_max;
        character.active_conditions.clear();
        character.clamp_hp();
        repos::character::save(pool, &character).await?;

        let config = RestoreConfig::for_trigger(RewindTrigger::Death);
        let new_timeline = format!("loop-{}", game.loop_count + 1);
        snapshotter::restore(&self.store, game.id, context.character.id, &snapshot, config, new_timeline).await?;
        Ok(())
    }

    async fn run_npc_turns(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        combat: &mut wrldcore_domain::model::combat::CombatInstance,
        context: &GameContext,
        random: &dyn RandomSource,
    ) -> EngineResult<Vec<ActionResult>> {
        let mut results = Vec::new();
        let player_id = context.character.id.to_string();

        while combat.is_active() && combat.current_actor().is_some_and(|id| id != player_id) {
            let npc_id = combat.current_actor().unwrap().to_string();
            let Ok(npc_uuid) = npc_id.parse::<wrldcore_domain::ids::EntityId>() else { break };
            let npc = repos::entity::get(&mut **tx, npc_uuid).await?;
            if !npc.is_alive {
                combat.advance_turn();
                continue;
            }

            let targets = vec![(player_id.clone(), context.character.hp_current, context.character.armor_class)];
            let attack = npc.attacks.first();
            let npc_result = combat_system::resolve_npc_turn(
                &npc_id,
                &npc.name,
                npc.hp_current,
                npc.hp_max,
                attack.map(|a| a.attack_bonus).unwrap_or(2),
                attack.map(|a| a.damage_dice.as_str()).unwrap_or("1d4"),
                &targets,
                context.game_id,
                context.turn_number,
                random,
            )?;

            if matches!(
                wrldcore_domain::rules::combat_math::npc_choose_action(npc.hp_current, npc.hp_max, &[(player_id.clone(), context.character.hp_current)]),
                NpcAction::Flee
            ) {
                combat.state = CombatState::Resolved;
            }

            results.push(npc_result);
            combat.advance_turn();
        }

        Ok(results)
    }

    /// Step 10: quest progress, reputation fallout, story beats, faction
    /// goals, world events, trait proposals, Director pacing — in that
    /// fixed order, each its own transaction so a failure in one doesn't
    /// undo an earlier one.
    async fn run_post_turn_consequences(&self, game_id: GameId, context: &GameContext, result: &ActionResult, random: &dyn RandomSource) -> EngineResult<()> {
        self.advance_quests(game_id, context, result).await?;
        self.director.record_behavior(&self.store, game_id, context, result).await?;
        self.director.maybe_propose_trait(&self.store, game_id, context).await?;
        self.director.pace(&self.store, game_id, context, &self.catalog, random).await?;
        Ok(())
    }

    async fn advance_quests(&self, game_id: GameId, context: &GameContext, result: &ActionResult) -> EngineResult<()> {
        if context.active_quests.is_empty() {
            return Ok(());
        }
        let mut tx = self.store.transaction().await?;
        for quest in &context.active_quests {
            let mut quest = quest.clone();
            let mut changed = false;
            for objective in &mut quest.objectives {
                if !objective.is_complete && result.outcome_description.to_lowercase().contains(&objective.description.to_lowercase()) {
                    objective.is_complete = true;
                    changed = true;
                }
            }
            if changed {
                if quest.is_complete() {
                    quest.status = wrldcore_domain::model::quest::QuestStatus::Completed;
                    repos::event::append(
                        &mut *tx,
                        &GameEvent::new(game_id, context.turn_number, EventType::QuestCompleted, format!("Quest complete: {}", quest.name))
                            .with_timeline(context.timeline_id.clone()),
                    )
                    .await?;
                }
                repos::quest::save(&mut *tx, &quest).await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Marks any combatant whose `is_alive` the just-applied mutations flipped to
/// `false`, so `enemy_side_alive`/`player_side_alive` reflect this turn's
/// kill before the inline NPC turns (or the end-of-fight check) run.
fn sync_combatant_deaths(combat: &mut wrldcore_domain::model::combat::CombatInstance, mutations: &[Mutation]) {
    for mutation in mutations {
        if mutation.target_type == "entity" && mutation.field == "is_alive" && mutation.new_value == json!(false) {
            if let Some(combatant) = combat.combatants.iter_mut().find(|c| c.id == mutation.target_id) {
                combatant.is_alive = false;
            }
        }
    }
}

/// Pipeline-level validation, run before any subsystem sees the action.
/// Rejections here do not advance the turn.
fn validate(action: &Action, context: &GameContext) -> Option<String> {
    if !can_take_actions(&context.character.active_conditions) {
        return Some("You are incapacitated and cannot take actions.".to_string());
    }
    if let Some(combat) = context.active_combat.as_ref().filter(|c| c.is_active()) {
        let is_combat_action = matches!(action.action_type.as_str(), "attack" | "flee");
        if is_combat_action && !combat.is_actors_turn(&context.character.id.to_string()) {
            return Some("It's not your turn.".to_string());
        }
    }
    None
}

/// Applies one `Mutation` through its owning repository. Most fields are a
/// literal overwrite; inventory/stock/storage fields are verb-based
/// (fetch-apply-save through the domain type's own mutator); recruit/
/// purchase/prepare fields insert a new row keyed by `target_id`.
async fn apply_mutation(tx: &mut Transaction<'_, Sqlite>, game_id: GameId, character_id: CharacterId, mutation: &Mutation) -> EngineResult<()> {
    match (mutation.target_type.as_str(), mutation.field.as_str()) {
        ("entity", "hp_current") => {
            let id = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad entity id".into()))?;
            let mut entity = repos::entity::get(&mut **tx, id).await?;
            entity.hp_current = as_i32(&mutation.new_value).clamp(0, entity.hp_max.max(0));
            repos::entity::save(&mut **tx, &entity).await?;
        }
        ("entity", "is_alive") => {
            let id = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad entity id".into()))?;
            let mut entity = repos::entity::get(&mut **tx, id).await?;
            entity.is_alive = mutation.new_value.as_bool().unwrap_or(entity.is_alive);
            repos::entity::save(&mut **tx, &entity).await?;
        }
        ("character", "hp_current") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            character.hp_current = as_i32(&mutation.new_value);
            character.clamp_hp();
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "gold") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            character.gold = as_i32(&mutation.new_value).max(0);
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "current_location_id") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            if let Some(location_id) = mutation.new_value.as_str().and_then(|s| s.parse().ok()) {
                character.current_location_id = location_id;
            }
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "equipped_weapon_id") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            character.equipped_weapon_id = value_as_option::<ItemId>(&mutation.new_value);
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "equipped_armor_id") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            character.equipped_armor_id = value_as_option::<ItemId>(&mutation.new_value);
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "needs") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            if let Ok(needs) = serde_json::from_value(mutation.new_value.clone()) {
                character.needs = needs;
            }
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "spell_slots_remaining") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            if let Ok(slots) = serde_json::from_value(mutation.new_value.clone()) {
                character.spell_slots_remaining = slots;
                character.clamp_spell_slots();
            }
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "concentration_spell_id") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            character.concentration_spell_id = mutation.new_value.as_str().map(str::to_string);
            repos::character::save(&mut **tx, &character).await?;
        }
        ("character", "wounds") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            if let Ok(wounds) = serde_json::from_value(mutation.new_value.clone()) {
                character.wounds = wounds;
            }
            repos::character::save(&mut **tx, &character).await?;
        }
        ("combat", "state") => {
            let id = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad combat id".into()))?;
            let mut combat = repos::combat::get(&mut **tx, id).await?;
            if let Ok(state) = serde_json::from_value::<CombatState>(mutation.new_value.clone()) {
                combat.state = state;
            }
            repos::combat::save(&mut **tx, &combat).await?;
        }
        ("location", "visited") => {
            let id = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad location id".into()))?;
            let mut location = repos::location::get(&mut **tx, id).await?;
            location.visited = mutation.new_value.as_bool().unwrap_or(true);
            repos::location::save(&mut **tx, &location).await?;
        }
        ("location", "add_item") => {
            let id = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad location id".into()))?;
            let mut location = repos::location::get(&mut **tx, id).await?;
            if let Some(item_id) = value_as::<ItemId>(&mutation.new_value) {
                location.items.push(item_id);
            }
            repos::location::save(&mut **tx, &location).await?;
        }
        ("location", "remove_item") => {
            let id = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad location id".into()))?;
            let mut location = repos::location::get(&mut **tx, id).await?;
            if let Some(item_id) = value_as::<ItemId>(&mutation.new_value) {
                if let Some(pos) = location.items.iter().position(|i| *i == item_id) {
                    location.items.remove(pos);
                }
            }
            repos::location::save(&mut **tx, &location).await?;
        }
        ("connection", "is_locked") => {
            let id: wrldcore_domain::ids::ConnectionId =
                mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad connection id".into()))?;
            if let Some(mut conn) = repos::connection::get(&mut **tx, id).await? {
                conn.is_locked = mutation.new_value.as_bool().unwrap_or(false);
                repos::connection::add_connection(&mut **tx, &conn).await?;
            }
        }
        ("inventory", "add_item") => {
            let (item_id, quantity) = item_and_quantity(&mutation.new_value);
            let mut inventory = repos::inventory::get(&mut **tx, &mutation.target_id).await?;
            if let Some(item_id) = item_id {
                inventory.add(item_id, quantity);
            }
            repos::inventory::save(&mut **tx, game_id, &inventory).await?;
        }
        ("inventory", "remove_item") => {
            let (item_id, quantity) = item_and_quantity(&mutation.new_value);
            let mut inventory = repos::inventory::get(&mut **tx, &mutation.target_id).await?;
            if let Some(item_id) = item_id {
                inventory.remove(item_id, quantity);
            }
            repos::inventory::save(&mut **tx, game_id, &inventory).await?;
        }
        ("housing", "add_storage") | ("housing", "remove_storage") => {
            let id: HousingId = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad housing id".into()))?;
            let mut housing = repos::housing::get(&mut **tx, id).await?;
            let (item_id, quantity) = item_and_quantity(&mutation.new_value);
            if let Some(item_id) = item_id {
                if mutation.field == "add_storage" {
                    housing.add_storage(item_id, quantity);
                } else {
                    housing.remove_storage(item_id, quantity);
                }
            }
            repos::housing::save(&mut **tx, &housing).await?;
        }
        ("housing", "purchase") => {
            let id: HousingId = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad housing id".into()))?;
            let name = mutation.new_value.get("name").and_then(Value::as_str).unwrap_or("a home").to_string();
            let housing = Housing { id, game_id, character_id, name, upgrade_level: 0, storage: Vec::new() };
            repos::housing::save(&mut **tx, &housing).await?;
        }
        ("companion", "recruit") => {
            let id: CompanionId = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad companion id".into()))?;
            let entity_id = mutation
                .new_value
                .get("entity_id")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| EngineError::SchemaFailure("recruit mutation missing entity_id".into()))?;
            let affinity_at_recruitment = mutation.new_value.get("affinity_at_recruitment").and_then(Value::as_i64).unwrap_or(0) as i32;
            let companion = Companion { id, game_id, character_id, entity_id, is_active: true, affinity_at_recruitment };
            repos::companion::save(&mut **tx, &companion).await?;
        }
        ("companion", "is_active") => {
            let id: CompanionId = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad companion id".into()))?;
            let mut companion = repos::companion::get(&mut **tx, id).await?;
            companion.is_active = mutation.new_value.as_bool().unwrap_or(false);
            repos::companion::save(&mut **tx, &companion).await?;
        }
        ("shop", "remove_stock") | ("shop", "add_stock") => {
            let id: wrldcore_domain::ids::ShopId = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad shop id".into()))?;
            let mut shop = repos::shop::get(&mut **tx, id).await?;
            let (item_id, quantity) = item_and_quantity(&mutation.new_value);
            if let Some(item_id) = item_id {
                let delta = if mutation.field == "add_stock" { quantity } else { -quantity };
                if let Some(line) = shop.find_stock_mut(item_id) {
                    line.quantity = (line.quantity + delta).max(0);
                } else if delta > 0 {
                    shop.stock.push(ShopStock { item_id, quantity: delta, base_quantity: delta, price_override: None });
                }
            }
            repos::shop::save(&mut **tx, &shop).await?;
        }
        ("npc_reputation", "value") => {
            let entity_id = mutation.target_id.parse().map_err(|_| EngineError::SchemaFailure("bad entity id".into()))?;
            let value = as_i32(&mutation.new_value);
            repos::reputation::set_npc_reputation(&mut **tx, &NpcReputation { game_id, entity_id, value }).await?;
        }
        ("bounty", "amount") => {
            let amount = as_i32(&mutation.new_value);
            repos::reputation::set_bounty(&mut **tx, &Bounty { game_id, region: mutation.target_id.clone(), amount }).await?;
        }
        ("prepared_spell", "spell_id") => {
            let mut character = repos::character::get(&mut **tx, character_id).await?;
            if let Some(spell_id) = mutation.new_value.as_str().and_then(|s| s.parse().ok()) {
                character.prepared_spells.insert(spell_id);
            }
            repos::character::save(&mut **tx, &character).await?;
        }
        (target_type, field) => {
            warn!(target_type, field, "unhandled mutation shape, dropping");
        }
    }
    Ok(())
}

fn as_i32(value: &Value) -> i32 {
    value.as_i64().unwrap_or(0) as i32
}

fn value_as<T: std::str::FromStr>(value: &Value) -> Option<T> {
    value.as_str().and_then(|s| s.parse::<T>().ok())
}

fn value_as_option<T: std::str::FromStr>(value: &Value) -> Option<T> {
    value_as(value)
}

fn item_and_quantity(value: &Value) -> (Option<ItemId>, i32) {
    if let Some(obj) = value.as_object() {
        let item_id = obj.get("item_id").and_then(Value::as_str).and_then(|s| s.parse().ok());
        let quantity = obj.get("quantity").and_then(Value::as_i64).unwrap_or(1) as i32;
        (item_id, quantity)
    } else {
        (value_as::<ItemId>(value), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_and_quantity_parses_object_shape() {
        let item_id = ItemId::new();
        let value = json!({ "item_id": item_id.to_string(), "quantity": 3 });
        let (parsed, qty) = item_and_quantity(&value);
        assert_eq!(parsed, Some(item_id));
        assert_eq!(qty, 3);
    }

    #[test]
    fn item_and_quantity_parses_bare_item_id() {
        let item_id = ItemId::new();
        let value = json!(item_id.to_string());
        let (parsed, qty) = item_and_quantity(&value);
        assert_eq!(parsed, Some(item_id));
        assert_eq!(qty, 1);
    }

    mod turn_scenarios {
        use std::collections::HashMap;

        use wrldcore_domain::ids::{LocationId, RegionId};
        use wrldcore_domain::model::character::Character;
        use wrldcore_domain::model::event::EventType;
        use wrldcore_domain::model::inventory::{AttackDef, Entity, Inventory};
        use wrldcore_domain::model::location::{Direction, Location, LocationConnection};
        use wrldcore_domain::rules::ability_scores::Ability;
        use wrldcore_domain::rules::survival::Needs;

        use crate::content::ContentCatalog;
        use crate::director::Director;
        use crate::llm::NullLlmProvider;
        use crate::random::FixedRandom;
        use crate::retrieval::NullRetrievalStore;
        use crate::store::{repos, DataStore};
        use crate::systems::SystemRegistry;

        use super::*;

        fn bare_character(game_id: wrldcore_domain::ids::GameId, location: LocationId) -> Character {
            let mut ability_scores = HashMap::new();
            for ability in Ability::ALL {
                ability_scores.insert(ability, 14);
            }
            Character {
                id: CharacterId::new(),
                game_id,
                name: "Arden".to_string(),
                ability_scores,
                hp_current: 10,
                hp_max: 10,
                hp_temporary: 0,
                armor_class: 14,
                proficiency_bonus: 2,
                level: 1,
                xp: 0,
                class_levels: HashMap::from([("fighter".to_string(), 1)]),
                skill_proficiencies: Default::default(),
                saving_throw_proficiencies: Default::default(),
                equipped_weapon_id: None,
                equipped_armor_id: None,
                active_conditions: Vec::new(),
                hit_dice_remaining: 1,
                speed: 30,
                gold: 0,
                needs: Needs { hunger: 100, thirst: 100, warmth: 100, morale: 100 },
                spellcasting_ability: None,
                spell_slots_max: HashMap::new(),
                spell_slots_remaining: HashMap::new(),
                concentration_spell_id: None,
                wounds: Vec::new(),
                size: "medium".to_string(),
                origin_id: None,
                class_resources: HashMap::new(),
                current_location_id: location,
                known_spells: Default::default(),
                prepared_spells: Default::default(),
                custom_spells: Vec::new(),
            }
        }

        fn bare_pipeline(store: DataStore) -> TurnPipeline {
            let director = Director::new(Box::new(NullLlmProvider), Box::new(NullRetrievalStore), Vec::new());
            TurnPipeline::new(store, SystemRegistry::standard(), ContentCatalog::default(), director, 20)
        }

        /// End-to-end scenario 1 from the turn pipeline's testable properties:
        /// moving through a known connection advances the clock and records a
        /// `MOVE` event at the destination.
        #[tokio::test]
        async fn movement_through_a_known_connection() {
            let store = DataStore::connect_in_memory().await.unwrap();
            let game_id = wrldcore_domain::ids::GameId::new();
            let region_id = RegionId::new();
            let square = LocationId::new();
            let market = LocationId::new();

            for (id, name) in [(square, "thornfield_square"), (market, "thornfield_market")] {
                repos::location::save(
                    store.pool(),
                    &Location {
                        id,
                        game_id,
                        name: name.to_string(),
                        region_id,
                        description: String::new(),
                        location_type: "generic".to_string(),
                        items: Vec::new(),
                        visited: id == square,
                        properties: HashMap::new(),
                        generated: false,
                    },
                )
                .await
                .unwrap();
            }
            repos::connection::add_connection(
                store.pool(),
                &LocationConnection {
                    id: wrldcore_domain::ids::ConnectionId::new(),
                    game_id,
                    source_location_id: square,
                    target_location_id: market,
                    direction: Direction::North,
                    description: "a path north".to_string(),
                    is_locked: false,
                    lock: None,
                },
            )
            .await
            .unwrap();

            let character = bare_character(game_id, square);
            repos::character::save(store.pool(), &character).await.unwrap();
            repos::inventory::save(store.pool(), game_id, &Inventory::new(character.id.to_string())).await.unwrap();
            let game = wrldcore_domain::model::Game::new("Test Game", character.id, square);
            repos::game::save(store.pool(), &game).await.unwrap();

            let pipeline = bare_pipeline(store);
            let random = FixedRandom::new(Vec::new(), Vec::new());
            let result = pipeline.run_turn(game_id, "go north", &random).await.unwrap();

            assert!(result.success);
            assert!(result.events.iter().any(|e| e.event_type == EventType::Move && e.location_id == Some(market)));

            let updated_game = repos::game::get(pipeline.store().pool(), game_id).await.unwrap();
            assert_eq!(updated_game.turn_number, 1);
            assert_eq!(updated_game.world_time, 10);
            let updated_character = repos::character::get_for_game(pipeline.store().pool(), game_id).await.unwrap();
            assert_eq!(updated_character.current_location_id, market);
        }

        /// End-to-end scenario 2: a hit that reduces a lone hostile to 0 HP
        /// kills it, ends the encounter, and awards XP.
        #[tokio::test]
        async fn attack_kills_lone_hostile_and_ends_combat() {
            let store = DataStore::connect_in_memory().await.unwrap();
            let game_id = wrldcore_domain::ids::GameId::new();
            let region_id = RegionId::new();
            let clearing = LocationId::new();

            repos::location::save(
                store.pool(),
                &Location {
                    id: clearing,
                    game_id,
                    name: "clearing".to_string(),
                    region_id,
                    description: String::new(),
                    location_type: "generic".to_string(),
                    items: Vec::new(),
                    visited: true,
                    properties: HashMap::new(),
                    generated: false,
                },
            )
            .await
            .unwrap();

            let goblin_id = wrldcore_domain::ids::EntityId::new();
            let goblin = Entity {
                id: goblin_id,
                game_id,
                name: "goblin".to_string(),
                ability_scores: HashMap::new(),
                hp_current: 1,
                hp_max: 7,
                armor_class: 12,
                attacks: vec![AttackDef { name: "scimitar".to_string(), attack_bonus: 4, damage_dice: "1d6".to_string(), damage_type: "slashing".to_string() }],
                behavior_tags: Default::default(),
                loot_table: Vec::new(),
                is_hostile: true,
                is_alive: true,
                faction_id: None,
                schedule: Default::default(),
                unavailable_periods: Default::default(),
                current_location_id: clearing,
                level: 1,
                active_conditions: Vec::new(),
                quest_hook: None,
                expires_at_time: None,
                generated: false,
            };
            repos::entity::save(store.pool(), &goblin).await.unwrap();

            let character = bare_character(game_id, clearing);
            repos::character::save(store.pool(), &character).await.unwrap();
            repos::inventory::save(store.pool(), game_id, &Inventory::new(character.id.to_string())).await.unwrap();
            let game = wrldcore_domain::model::Game::new("Test Game", character.id, clearing);
            repos::game::save(store.pool(), &game).await.unwrap();

            let pipeline = bare_pipeline(store);
            // Initiative rolls (player, goblin) then an attack roll that
            // always hits (20) with a damage roll high enough to kill.
            let random = FixedRandom::new(vec![15, 5, 20, 8], Vec::new());
            let result = pipeline.run_turn(game_id, "attack goblin", &random).await.unwrap();

            assert!(result.success);
            assert!(result.events.iter().any(|e| e.event_type == EventType::Attack));
            assert!(result.events.iter().any(|e| e.event_type == EventType::Damage));
            assert!(result.events.iter().any(|e| e.event_type == EventType::Death));
            assert!(result.events.iter().any(|e| e.event_type == EventType::CombatEnd));
            assert_eq!(result.xp_gained, 10);

            let updated_goblin = repos::entity::get(pipeline.store().pool(), goblin_id).await.unwrap();
            assert!(!updated_goblin.is_alive);

            let updated_character = repos::character::get_for_game(pipeline.store().pool(), game_id).await.unwrap();
            assert_eq!(updated_character.xp, 10);

            let combat = repos::combat::get_active_for_game(pipeline.store().pool(), game_id).await.unwrap();
            assert!(combat.is_none());
        }
    }
}
