//! The one subsystem allowed to reach for an LLM. Three responsibilities:
//! arbitrating creative actions no registered system claims, proposing traits
//! once a behavior pattern is well established, and pacing content generation
//! so a long playthrough doesn't stand still. Every LLM call degrades to a
//! curated fallback — a quiet world is always a safe outcome, a crashed one
//! is not.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use wrldcore_domain::ids::{EntityId, FactionId, GameId, ItemId, LocationId, QuestId, TraitId};
use wrldcore_domain::model::action::{Action, ActionResult, DiceRollRecord, GameContext};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::model::inventory::{AttackDef, Entity};
use wrldcore_domain::model::location::{Direction, Location, Region};
use wrldcore_domain::model::quest::{Quest, QuestObjective, QuestRewards, QuestStatus};
use wrldcore_domain::model::traits::{tier_for_count, BehaviorPattern, CharacterTrait, TraitEffect};
use wrldcore_domain::model::Intent;
use wrldcore_domain::random::RandomSource;
use wrldcore_domain::rules::skills::{skill_check, Skill};

use crate::content::ContentCatalog;
use crate::error::{log_external_unavailable, EngineResult};
use crate::llm::LlmProvider;
use crate::retrieval::RetrievalStore;
use crate::store::{repos, DataStore};

/// Turns between pacing beats.
const PACING_INTERVAL: i64 = 10;
/// Quest chains stop spawning follow-ups at this depth.
const MAX_QUEST_CHAIN_DEPTH: i32 = 3;
/// A location with this many or fewer outgoing connections reads as a dead end.
const SPARSE_CONNECTION_THRESHOLD: usize = 1;
/// How long a Director-spawned NPC lingers before `world_sim` sweeps it away.
const GENERATED_NPC_LIFESPAN_MINUTES: i32 = 2880;
/// Bounty, in gold, that starts drawing hired steel.
const BOUNTY_HUNTER_THRESHOLD: i32 = 50;
/// Above this bounty the spawn chance stops climbing.
const BOUNTY_HUNTER_CHANCE_CAP: f64 = 0.5;
/// Bounty-to-probability divisor: `(bounty / this).min(CAP)`.
const BOUNTY_HUNTER_CHANCE_DIVISOR: f64 = 200.0;

const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::Up,
    Direction::Down,
    Direction::In,
    Direction::Out,
];

const ALL_PATTERNS: [BehaviorPattern; 6] = [
    BehaviorPattern::Aggressive,
    BehaviorPattern::Diplomatic,
    BehaviorPattern::Stealthy,
    BehaviorPattern::Generous,
    BehaviorPattern::Mercantile,
    BehaviorPattern::Curious,
];

pub struct Director {
    llm: Box<dyn LlmProvider>,
    retrieval: Box<dyn RetrievalStore>,
    /// Factions to fall back to when a region declares none, or the declared
    /// one isn't in the loaded catalog. Resolves the long-standing question
    /// of where faction ids come from when content doesn't supply them.
    default_factions: Vec<FactionId>,
}

impl Director {
    pub fn new(llm: Box<dyn LlmProvider>, retrieval: Box<dyn RetrievalStore>, default_factions: Vec<FactionId>) -> Self {
        Self {
            llm,
            retrieval,
            default_factions,
        }
    }

    /// Used only for narrative grounding right now (past-event recall for
    /// creative-action prompts); kept as a field rather than threaded through
    /// every call so future prompts can reach for it without a signature change.
    pub fn retrieval(&self) -> &dyn RetrievalStore {
        self.retrieval.as_ref()
    }

    fn resolve_region_faction(&self, catalog: &ContentCatalog, region: &Region) -> Option<FactionId> {
        region
            .faction
            .as_deref()
            .filter(|slug| catalog.factions.contains_key(*slug))
            .map(FactionId::from_content_slug)
            .or_else(|| self.default_factions.first().copied())
    }

    // ---------------------------------------------------------------- creative

    pub async fn attempt_creative_action(
        &self,
        action: &Action,
        context: &GameContext,
        catalog: &ContentCatalog,
        random: &dyn RandomSource,
    ) -> Option<ActionResult> {
        if action.is_meta {
            return None;
        }
        if let Some(missing) = referenced_uncarried_item(action, context, catalog) {
            return Some(ActionResult::empty_failure(format!("You don't have {missing}.")));
        }
        if !self.llm.is_available() {
            log_external_unavailable("llm", "not configured, skipping creative action");
            return None;
        }

        let plausibility = self
            .llm
            .generate_structured(&format!(
                "The player {} is at {} ({}) and attempts: \"{}\". Decide whether this is a \
                 plausible action for a text RPG turn. Respond as JSON with keys \
                 plausible (bool), skill (string, a D&D skill name), dc (number), and \
                 failure_description (string, what happens if the attempt fails).",
                context.character.name, context.current_location.name, context.current_location.description, action.raw_input,
            ))
            .await;

        let plausible = plausibility.get("plausible").and_then(Value::as_bool).unwrap_or(false);
        if !plausible {
            return None;
        }

        let skill = plausibility
            .get("skill")
            .and_then(Value::as_str)
            .and_then(parse_skill)
            .unwrap_or(Skill::Investigation);
        let ability = skill.governing_ability();
        let score = context.character.ability_scores.get(&ability).copied().unwrap_or(10);
        let is_proficient = context.character.is_proficient_skill(skill);
        let dc = plausibility.get("dc").and_then(Value::as_i64).map(|v| v as i32).unwrap_or(12);
        let failure_description = plausibility
            .get("failure_description")
            .and_then(Value::as_str)
            .unwrap_or("Nothing comes of it.")
            .to_string();

        let outcome = skill_check(score, context.character.proficiency_bonus, is_proficient, dc, false, false, random);
        let roll_record = DiceRollRecord::from_roll("creative_action", &outcome.roll);

        if !outcome.success {
            return Some(ActionResult {
                success: false,
                outcome_description: failure_description.clone(),
                dice_rolls: vec![roll_record],
                state_mutations: Vec::new(),
                events: vec![GameEvent::new(context.game_id, context.turn_number, EventType::ExplorationFail, failure_description)
                    .with_actor(context.character.id.to_string())
                    .with_location(context.current_location.id)
                    .with_timeline(context.timeline_id.clone())],
                xp_gained: 0,
            });
        }

        let resolution = self
            .llm
            .generate_structured(&format!(
                "The player {} succeeds at: \"{}\". Narrate the outcome in one or two sentences. \
                 Respond as JSON with keys description (string) and xp (number, 0-25).",
                context.character.name, action.raw_input,
            ))
            .await;
        let description = resolution
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("You succeed, though the effect is subtle.")
            .to_string();
        let xp_gained = resolution.get("xp").and_then(Value::as_i64).unwrap_or(5) as i32;

        Some(ActionResult {
            success: true,
            outcome_description: description.clone(),
            dice_rolls: vec![roll_record],
            state_mutations: Vec::new(),
            events: vec![GameEvent::new(context.game_id, context.turn_number, EventType::CreativeAction, description)
                .with_actor(context.character.id.to_string())
                .with_location(context.current_location.id)
                .with_timeline(context.timeline_id.clone())],
            xp_gained,
        })
    }

    // ---------------------------------------------------------------- behavior

    pub async fn record_behavior(&self, store: &DataStore, game_id: GameId, _context: &GameContext, result: &ActionResult) -> EngineResult<()> {
        let Some(pattern) = infer_pattern(result) else {
            return Ok(());
        };
        repos::trait_repo::increment_behavior_counter(store.pool(), game_id, pattern).await?;
        Ok(())
    }

    pub async fn maybe_propose_trait(&self, store: &DataStore, game_id: GameId, context: &GameContext) -> EngineResult<()> {
        for pattern in ALL_PATTERNS {
            let count = repos::trait_repo::get_behavior_counter(store.pool(), game_id, pattern).await?;
            let Some((tier, budget)) = tier_for_count(count) else {
                continue;
            };
            let already_held = repos::trait_repo::count_for_pattern(store.pool(), game_id, context.character.id, pattern).await? as i32;
            if already_held >= tier {
                continue;
            }
            let character_trait = self.propose_trait(pattern, tier, budget, context).await;
            repos::trait_repo::save(store.pool(), &character_trait, context.turn_number).await?;
            repos::event::append(
                store.pool(),
                &GameEvent::new(
                    game_id,
                    context.turn_number,
                    EventType::TraitAwarded,
                    format!("{} develops a reputation: {}.", context.character.name, character_trait.name),
                )
                .with_actor(context.character.id.to_string())
                .with_timeline(context.timeline_id.clone()),
            )
            .await?;
        }
        Ok(())
    }

    async fn propose_trait(&self, pattern: BehaviorPattern, tier: i32, budget: i32, context: &GameContext) -> CharacterTrait {
        let (name, description, effect_type) = if self.llm.is_available() {
            let proposal = self
                .llm
                .generate_structured(&format!(
                    "Design a tier {tier} character trait for a {} play style (effect budget {budget} points). \
                     Respond as JSON with keys name (string), description (string), effect_type (string).",
                    pattern_label(pattern),
                ))
                .await;
            (
                proposal.get("name").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| fallback_trait_name(pattern)),
                proposal
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| fallback_trait_description(pattern)),
                proposal.get("effect_type").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| "passive_bonus".to_string()),
            )
        } else {
            (fallback_trait_name(pattern), fallback_trait_description(pattern), "passive_bonus".to_string())
        };

        CharacterTrait {
            id: TraitId::new(),
            game_id: context.game_id,
            character_id: context.character.id,
            name,
            description,
            pattern,
            tier,
            effects: vec![TraitEffect {
                effect_type,
                magnitude: budget,
                cost: budget,
            }],
        }
    }

    // ---------------------------------------------------------------- pacing

    pub async fn pace(&self, store: &DataStore, game_id: GameId, context: &GameContext, catalog: &ContentCatalog, random: &dyn RandomSource) -> EngineResult<()> {
        let region = repos::region::get(store.pool(), context.current_location.region_id).await?;

        self.maybe_spawn_npc(store, game_id, context, &region, catalog, random).await?;
        self.maybe_generate_location(store, game_id, context, random).await?;
        self.maybe_offer_quests(store, game_id, context, random).await?;
        self.maybe_offer_followup_quests(store, game_id, context, random).await?;
        self.maybe_enrich_location(store, context).await?;
        self.maybe_pacing_beat(store, game_id, context).await?;
        self.maybe_spawn_bounty_hunter(store, game_id, context, &region, catalog, random).await?;
        Ok(())
    }

    async fn maybe_spawn_npc(
        &self,
        store: &DataStore,
        game_id: GameId,
        context: &GameContext,
        region: &Region,
        catalog: &ContentCatalog,
        random: &dyn RandomSource,
    ) -> EngineResult<()> {
        let alive_count = context.entities_here.iter().filter(|e| e.is_alive).count();
        if alive_count >= 2 {
            return Ok(());
        }

        let is_settlement_location = is_settlement(&context.current_location.location_type);
        if is_settlement_location {
            if alive_count >= 1 {
                return Ok(());
            }
        } else {
            let turns_at_location = context
                .recent_events
                .iter()
                .filter(|e| e.location_id == Some(context.current_location.id))
                .count();
            let dialogue_at_location = context.recent_events.iter().any(|e| {
                e.location_id == Some(context.current_location.id) && matches!(&e.event_type, EventType::Custom(tag) if tag == "dialogue")
            });
            if !(turns_at_location >= 3 && !dialogue_at_location && alive_count == 0) {
                return Ok(());
            }
        }

        let level_min = region.level_range_min.max(1);
        let level_max = region.level_range_max.max(level_min);
        let target_level = (context.character.level + random.gen_range(-2, 2)).clamp(level_min, level_max);
        let hp_max = (target_level * 6).max(4);
        let armor_class = (10 + target_level).min(20);

        let (name, description) = self.describe_generated_npc(context, target_level).await;

        let entity = Entity {
            id: EntityId::new(),
            game_id,
            name: name.clone(),
            ability_scores: HashMap::new(),
            hp_current: hp_max,
            hp_max,
            armor_class,
            attacks: vec![AttackDef {
                name: "strike".to_string(),
                attack_bonus: target_level,
                damage_dice: "1d6".to_string(),
                damage_type: "bludgeoning".to_string(),
            }],
            behavior_tags: HashSet::new(),
            loot_table: Vec::new(),
            is_hostile: false,
            is_alive: true,
            faction_id: self.resolve_region_faction(catalog, region),
            schedule: HashMap::new(),
            unavailable_periods: HashSet::new(),
            current_location_id: context.current_location.id,
            level: target_level,
            active_conditions: Vec::new(),
            quest_hook: None,
            expires_at_time: Some(context.world_time + GENERATED_NPC_LIFESPAN_MINUTES),
            generated: true,
        };
        repos::entity::save(store.pool(), &entity).await?;
        repos::event::append(
            store.pool(),
            &GameEvent::new(game_id, context.turn_number, EventType::WorldEvent, description)
                .with_actor(entity.id.to_string())
                .with_location(context.current_location.id)
                .with_timeline(context.timeline_id.clone()),
        )
        .await?;
        Ok(())
    }

    async fn describe_generated_npc(&self, context: &GameContext, level: i32) -> (String, String) {
        if !self.llm.is_available() {
            return (
                "a traveling stranger".to_string(),
                format!("A traveling stranger, level {level}, arrives at {}.", context.current_location.name),
            );
        }
        let proposal = self
            .llm
            .generate_structured(&format!(
                "Invent a minor NPC (level {level}) who might plausibly be standing at {} ({}). \
                 Respond as JSON with keys name (string) and description (string, one sentence).",
                context.current_location.name, context.current_location.description,
            ))
            .await;
        let name = proposal.get("name").and_then(Value::as_str).unwrap_or("a traveling stranger").to_string();
        let description = proposal
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{name} arrives at {}.", context.current_location.name));
        (name, description)
    }

    /// Ambient pacing pass: occasionally pads out a sparsely-connected
    /// location even before the player walks into the dead end.
    async fn maybe_generate_location(&self, store: &DataStore, game_id: GameId, context: &GameContext, random: &dyn RandomSource) -> EngineResult<()> {
        if context.connections.len() > SPARSE_CONNECTION_THRESHOLD || random.gen_probability() > 0.2 {
            return Ok(());
        }
        let Some(direction) = unused_direction(context) else {
            return Ok(());
        };
        self.generate_location_in_direction(store, game_id, context, direction).await?;
        Ok(())
    }

    /// A move attempt found no outgoing connection in `direction`. Per
    /// `should_generate_location`, that is unconditional grounds to generate
    /// one — no probability gate, unlike the ambient pacing pass above.
    pub async fn generate_location_for_move(
        &self,
        store: &DataStore,
        game_id: GameId,
        context: &GameContext,
        direction: Direction,
    ) -> EngineResult<wrldcore_domain::model::location::LocationConnection> {
        self.generate_location_in_direction(store, game_id, context, direction).await
    }

    async fn generate_location_in_direction(
        &self,
        store: &DataStore,
        game_id: GameId,
        context: &GameContext,
        direction: Direction,
    ) -> EngineResult<wrldcore_domain::model::location::LocationConnection> {
        let (name, description) = if self.llm.is_available() {
            let proposal = self
                .llm
                .generate_structured(&format!(
                    "The player stands at {} ({}), which has a dead-end passage to the {}. \
                     Invent what lies that way. Respond as JSON with keys name (string) and description (string).",
                    context.current_location.name,
                    context.current_location.description,
                    direction.as_str(),
                ))
                .await;
            (
                proposal.get("name").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| "an unmarked path".to_string()),
                proposal
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| "A path continues, unremarkable but passable.".to_string()),
            )
        } else {
            ("an unmarked path".to_string(), "A path continues, unremarkable but passable.".to_string())
        };

        let location = Location {
            id: LocationId::new(),
            game_id,
            name,
            region_id: context.current_location.region_id,
            description: description.clone(),
            location_type: "generated".to_string(),
            items: Vec::new(),
            visited: false,
            properties: HashMap::new(),
            generated: true,
        };
        repos::location::save(store.pool(), &location).await?;
        let connection =
            repos::connection::add_bidirectional(store.pool(), game_id, context.current_location.id, location.id, direction, &description, None).await?;
        Ok(connection)
    }

    async fn maybe_offer_quests(&self, store: &DataStore, game_id: GameId, context: &GameContext, random: &dyn RandomSource) -> EngineResult<()> {
        for npc in &context.entities_here {
            let Some(hook) = &npc.quest_hook else { continue };
            let already_offered = context.active_quests.iter().any(|q| q.quest_giver_id == Some(npc.id));
            if already_offered || random.gen_probability() > 0.5 {
                continue;
            }

            let (name, objectives, motivation) = self.describe_quest(hook, &npc.name).await;
            let quest = Quest {
                id: QuestId::new(),
                game_id,
                name,
                status: QuestStatus::Available,
                objectives: objectives.into_iter().map(|description| QuestObjective { description, is_complete: false }).collect(),
                quest_giver_id: Some(npc.id),
                rewards: QuestRewards {
                    gold: 10 * npc.level.max(1),
                    xp: 20 * npc.level.max(1),
                },
                chain_depth: 0,
                allows_followup: true,
                generated: true,
                npc_motivation: Some(motivation),
            };
            repos::quest::save(store.pool(), &quest).await?;
            repos::event::append(
                store.pool(),
                &GameEvent::new(game_id, context.turn_number, EventType::QuestOffered, format!("{} offers a task: {}.", npc.name, quest.name))
                    .with_actor(npc.id.to_string())
                    .with_location(context.current_location.id)
                    .with_timeline(context.timeline_id.clone()),
            )
            .await?;
        }
        Ok(())
    }

    async fn describe_quest(&self, hook: &str, npc_name: &str) -> (String, Vec<String>, String) {
        if !self.llm.is_available() {
            return (
                format!("A favor for {npc_name}"),
                vec![hook.to_string()],
                format!("{npc_name} needs help and has no one else to ask."),
            );
        }
        let proposal = self
            .llm
            .generate_structured(&format!(
                "{npc_name} has this quest hook: \"{hook}\". Turn it into a short quest. Respond as JSON with \
                 keys name (string), objectives (array of strings), and motivation (string, why {npc_name} wants this done).",
            ))
            .await;
        let name = proposal.get("name").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| format!("A favor for {npc_name}"));
        let objectives = proposal
            .get("objectives")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect::<Vec<_>>())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec![hook.to_string()]);
        let motivation = proposal
            .get("motivation")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{npc_name} needs help and has no one else to ask."));
        (name, objectives, motivation)
    }

    async fn maybe_offer_followup_quests(&self, store: &DataStore, game_id: GameId, context: &GameContext, random: &dyn RandomSource) -> EngineResult<()> {
        for quest in &context.active_quests {
            if !quest.is_complete() || !quest.allows_followup || quest.chain_depth >= MAX_QUEST_CHAIN_DEPTH {
                continue;
            }
            let Some(giver_id) = quest.quest_giver_id else { continue };
            let Some(giver) = context.entities_here.iter().find(|e| e.id == giver_id) else {
                continue;
            };
            if random.gen_probability() > 0.6 {
                continue;
            }

            let hook = giver.quest_hook.as_deref().unwrap_or("something further that needs doing");
            let (name, objectives, motivation) = self.describe_quest(hook, &giver.name).await;
            let followup = Quest {
                id: QuestId::new(),
                game_id,
                name,
                status: QuestStatus::Available,
                objectives: objectives.into_iter().map(|description| QuestObjective { description, is_complete: false }).collect(),
                quest_giver_id: Some(giver.id),
                rewards: QuestRewards {
                    gold: quest.rewards.gold + 10,
                    xp: quest.rewards.xp + 15,
                },
                chain_depth: quest.chain_depth + 1,
                allows_followup: true,
                generated: true,
                npc_motivation: Some(motivation),
            };
            repos::quest::save(store.pool(), &followup).await?;
            repos::event::append(
                store.pool(),
                &GameEvent::new(game_id, context.turn_number, EventType::QuestOffered, format!("{} has more work: {}.", giver.name, followup.name))
                    .with_actor(giver.id.to_string())
                    .with_location(context.current_location.id)
                    .with_timeline(context.timeline_id.clone()),
            )
            .await?;
        }
        Ok(())
    }

    async fn maybe_enrich_location(&self, store: &DataStore, context: &GameContext) -> EngineResult<()> {
        if !context.current_location.description.trim().is_empty() || !self.llm.is_available() {
            return Ok(());
        }
        let proposal = self
            .llm
            .generate_structured(&format!(
                "Write one evocative sentence describing a location called \"{}\" of type \"{}\". \
                 Respond as JSON with key description (string).",
                context.current_location.name, context.current_location.location_type,
            ))
            .await;
        let Some(description) = proposal.get("description").and_then(Value::as_str) else {
            return Ok(());
        };
        let mut location = context.current_location.clone();
        location.description = description.to_string();
        repos::location::save(store.pool(), &location).await?;
        Ok(())
    }

    async fn maybe_pacing_beat(&self, store: &DataStore, game_id: GameId, context: &GameContext) -> EngineResult<()> {
        if context.turn_number == 0 || context.turn_number % PACING_INTERVAL != 0 {
            return Ok(());
        }
        let description = if self.llm.is_available() {
            let proposal = self
                .llm
                .generate_structured(&format!(
                    "Suggest one upcoming story beat to keep pace for a level {} character currently at {}. \
                     Respond as JSON with key beat (string, one sentence).",
                    context.character.level, context.current_location.name,
                ))
                .await;
            proposal
                .get("beat")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| "The world quietly shifts; something is stirring nearby.".to_string())
        } else {
            "The world quietly shifts; something is stirring nearby.".to_string()
        };
        let intent = Intent::new(game_id, "pacing_beat", description, Value::Null);
        repos::intent::save(store.pool(), &intent).await?;
        Ok(())
    }

    async fn maybe_spawn_bounty_hunter(
        &self,
        store: &DataStore,
        game_id: GameId,
        context: &GameContext,
        region: &Region,
        catalog: &ContentCatalog,
        random: &dyn RandomSource,
    ) -> EngineResult<()> {
        if is_settlement(&context.current_location.location_type) {
            return Ok(());
        }
        let bounty = repos::reputation::get_bounty(store.pool(), game_id, &region.name).await?;
        if bounty.amount < BOUNTY_HUNTER_THRESHOLD {
            return Ok(());
        }
        let chance = (bounty.amount as f64 / BOUNTY_HUNTER_CHANCE_DIVISOR).min(BOUNTY_HUNTER_CHANCE_CAP);
        if random.gen_probability() >= chance {
            return Ok(());
        }
        if context.entities_here.iter().any(|e| e.quest_hook.as_deref() == Some("bounty_hunter")) {
            return Ok(());
        }

        let target_level = (context.character.level + 1).max(1);
        let entity = Entity {
            id: EntityId::new(),
            game_id,
            name: "a bounty hunter".to_string(),
            ability_scores: HashMap::new(),
            hp_current: target_level * 7,
            hp_max: target_level * 7,
            armor_class: (12 + target_level).min(20),
            attacks: vec![AttackDef {
                name: "crossbow bolt".to_string(),
                attack_bonus: target_level + 2,
                damage_dice: "1d8".to_string(),
                damage_type: "piercing".to_string(),
            }],
            behavior_tags: HashSet::new(),
            loot_table: Vec::new(),
            is_hostile: true,
            is_alive: true,
            faction_id: self.resolve_region_faction(catalog, region),
            schedule: HashMap::new(),
            unavailable_periods: HashSet::new(),
            current_location_id: context.current_location.id,
            level: target_level,
            active_conditions: Vec::new(),
            quest_hook: Some("bounty_hunter".to_string()),
            expires_at_time: Some(context.world_time + GENERATED_NPC_LIFESPAN_MINUTES),
            generated: true,
        };
        repos::entity::save(store.pool(), &entity).await?;
        repos::event::append(
            store.pool(),
            &GameEvent::new(
                game_id,
                context.turn_number,
                EventType::WorldEvent,
                format!("Word of the bounty on {} has drawn a hunter.", context.character.name),
            )
            .with_actor(entity.id.to_string())
            .with_location(context.current_location.id)
            .with_timeline(context.timeline_id.clone()),
        )
        .await?;
        Ok(())
    }
}

/// Guards handle towns; a hired hunter only stalks the wilderness and open
/// road.
fn is_settlement(location_type: &str) -> bool {
    matches!(location_type.to_lowercase().as_str(), "town" | "village" | "settlement" | "tavern" | "shop")
}

fn unused_direction(context: &GameContext) -> Option<Direction> {
    let used: HashSet<Direction> = context.connections.iter().map(|c| c.direction).collect();
    ALL_DIRECTIONS.into_iter().find(|d| !used.contains(d))
}

/// If the raw input names an item the catalog knows but the player isn't
/// carrying, the attempt fails before any LLM call — no need to ask whether
/// it's plausible to use something you don't have.
fn referenced_uncarried_item(action: &Action, context: &GameContext, catalog: &ContentCatalog) -> Option<String> {
    let lowered = action.raw_input.to_lowercase();
    catalog
        .items
        .values()
        .find(|item| lowered.contains(&item.name.to_lowercase()) && context.inventory.quantity_of(ItemId::from_content_slug(&item.id)) == 0)
        .map(|item| item.name.clone())
}

fn infer_pattern(result: &ActionResult) -> Option<BehaviorPattern> {
    result.events.iter().find_map(|event| match &event.event_type {
        EventType::Attack | EventType::CombatStart | EventType::Damage => Some(BehaviorPattern::Aggressive),
        EventType::Discovery => Some(BehaviorPattern::Curious),
        EventType::Custom(tag) => match tag.as_str() {
            "dialogue" | "persuade" => Some(BehaviorPattern::Diplomatic),
            "intimidate" => Some(BehaviorPattern::Aggressive),
            "gift" => Some(BehaviorPattern::Generous),
            "buy_item" | "sell_item" => Some(BehaviorPattern::Mercantile),
            _ => None,
        },
        _ => None,
    })
}

fn pattern_label(pattern: BehaviorPattern) -> &'static str {
    match pattern {
        BehaviorPattern::Aggressive => "aggressive",
        BehaviorPattern::Diplomatic => "diplomatic",
        BehaviorPattern::Stealthy => "stealthy",
        BehaviorPattern::Generous => "generous",
        BehaviorPattern::Mercantile => "mercantile",
        BehaviorPattern::Curious => "curious",
    }
}

fn fallback_trait_name(pattern: BehaviorPattern) -> String {
    match pattern {
        BehaviorPattern::Aggressive => "Hardened Brawler",
        BehaviorPattern::Diplomatic => "Silver Tongue",
        BehaviorPattern::Stealthy => "Shadow's Friend",
        BehaviorPattern::Generous => "Open Hand",
        BehaviorPattern::Mercantile => "Shrewd Trader",
        BehaviorPattern::Curious => "Keen Observer",
    }
    .to_string()
}

fn fallback_trait_description(pattern: BehaviorPattern) -> String {
    match pattern {
        BehaviorPattern::Aggressive => "Years of violence have left their mark; you hit harder when cornered.".to_string(),
        BehaviorPattern::Diplomatic => "Words come easily to you, and people tend to believe them.".to_string(),
        BehaviorPattern::Stealthy => "You've learned to be somewhere else before anyone notices you were there.".to_string(),
        BehaviorPattern::Generous => "Your reputation for giving precedes you, and doors open more easily for it.".to_string(),
        BehaviorPattern::Mercantile => "You know the value of things, and merchants know it too.".to_string(),
        BehaviorPattern::Curious => "You notice what others walk past.".to_string(),
    }
}

fn parse_skill(s: &str) -> Option<Skill> {
    const ALL_SKILLS: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];
    let needle = s.to_lowercase().replace(['_', ' '], "");
    ALL_SKILLS.iter().copied().find(|sk| format!("{sk:?}").to_lowercase() == needle)
}
