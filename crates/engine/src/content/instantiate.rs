//! Turns a loaded `RegionBundle` into runtime entities for a specific game.
//! Every template slug is resolved to a freshly generated id; the resulting
//! `InstantiatedRegion` is what a new-game bootstrap persists via the store.

use std::collections::HashMap;

use wrldcore_domain::ids::{CharacterId, ConnectionId, EntityId, FactionId, GameId, ItemId, LocationId, QuestId, RegionId};
use wrldcore_domain::model::character::Character;
use wrldcore_domain::model::content_defs::{ClassDef, RaceDef};
use wrldcore_domain::model::inventory::{AttackDef, Entity};
use wrldcore_domain::model::location::{Direction, Location, LocationConnection, LockSpec, Region};
use wrldcore_domain::model::quest::{Quest, QuestObjective, QuestRewards, QuestStatus};
use wrldcore_domain::rules::ability_scores::Ability;
use wrldcore_domain::rules::dice::DiceFormula;
use wrldcore_domain::rules::skills::Skill;
use wrldcore_domain::rules::survival::{Climate, Needs};

use super::{RegionBundle, ShopTemplate};
use crate::error::{EngineError, EngineResult};

pub struct InstantiatedRegion {
    pub region: Region,
    pub locations: Vec<Location>,
    pub connections: Vec<LocationConnection>,
    pub entities: Vec<Entity>,
    pub quests: Vec<Quest>,
    pub shops: Vec<ShopTemplate>,
    /// Location slug -> generated id, exposed so the bootstrap can place the
    /// player character in the bundle's designated starting location.
    pub location_ids: HashMap<String, LocationId>,
    /// NPC slug -> generated id, exposed so the bootstrap can wire a
    /// `ShopTemplate`'s `npc_slug` to the entity that runs it.
    pub entity_ids: HashMap<String, EntityId>,
}

fn parse_ability(s: &str) -> Option<Ability> {
    Ability::ALL.iter().copied().find(|a| a.as_str().eq_ignore_ascii_case(s))
}

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

fn parse_skill(s: &str) -> Option<Skill> {
    let needle = s.to_lowercase().replace(['_', ' '], "");
    ALL_SKILLS
        .iter()
        .copied()
        .find(|sk| format!("{sk:?}").to_lowercase() == needle)
}

fn parse_climate(s: &str) -> Climate {
    match s.to_lowercase().as_str() {
        "freezing" => Climate::Freezing,
        "cold" => Climate::Cold,
        "cool" => Climate::Cool,
        "warm" => Climate::Warm,
        "hot" => Climate::Hot,
        "arid" | "desert" => Climate::Arid,
        _ => Climate::Temperate,
    }
}

/// Resolve a faction slug against the loaded faction catalog. Content-addressed
/// like `ItemId::from_content_slug`, so the same faction slug always maps to
/// the same `FactionId` across every game rather than a fresh one per call.
fn resolve_faction(factions: &HashMap<String, FactionDef>, slug: &str) -> Option<FactionId> {
    factions.get(slug).map(|_| FactionId::from_content_slug(slug))
}

/// Items are content-addressed: the slug deterministically maps to the same
/// `ItemId` in every game, so no per-game registry needs to be persisted.
/// `item_ids` still records the mapping for this call's local lookups.
fn alloc_item(slug: &str, item_ids: &mut HashMap<String, ItemId>) -> ItemId {
    *item_ids.entry(slug.to_string()).or_insert_with(|| ItemId::from_content_slug(slug))
}

pub fn instantiate_region(
    game_id: GameId,
    bundle: &RegionBundle,
    factions: &HashMap<String, FactionDef>,
) -> EngineResult<InstantiatedRegion> {
    let template = bundle
        .region
        .as_ref()
        .ok_or_else(|| EngineError::SchemaFailure("region bundle missing region.toml".to_string()))?;

    let region_id = RegionId::new();
    let region = Region {
        id: region_id,
        game_id,
        name: template.name.clone(),
        description: template.description.clone(),
        level_range_min: template.level_range_min,
        level_range_max: template.level_range_max,
        climate: parse_climate(&template.climate),
        faction: template.faction.clone(),
    };

    let mut location_ids: HashMap<String, LocationId> = HashMap::new();
    for loc in &bundle.locations {
        location_ids.insert(loc.slug.clone(), LocationId::new());
    }

    let mut item_ids: HashMap<String, ItemId> = HashMap::new();

    let locations = bundle
        .locations
        .iter()
        .map(|loc| Location {
            id: location_ids[&loc.slug],
            game_id,
            name: loc.name.clone(),
            region_id,
            description: loc.description.clone(),
            location_type: loc.location_type.clone(),
            items: loc
                .starting_items
                .iter()
                .map(|slug| alloc_item(slug, &mut item_ids))
                .collect(),
            visited: false,
            properties: loc.properties.clone(),
            generated: false,
        })
        .collect::<Vec<_>>();

    let mut connections = Vec::new();
    for conn in &bundle.connections {
        let (Some(&from_id), Some(&to_id)) = (location_ids.get(&conn.from), location_ids.get(&conn.to)) else {
            return Err(EngineError::SchemaFailure(format!(
                "connection references unknown location slug: {} -> {}",
                conn.from, conn.to
            )));
        };
        let direction = Direction::parse(&conn.direction)
            .ok_or_else(|| EngineError::SchemaFailure(format!("unknown direction: {}", conn.direction)))?;
        let lock = if conn.key_item_id.is_some() || conn.unlock_skill.is_some() {
            Some(LockSpec {
                key_item_id: conn.key_item_id.as_deref().map(|slug| alloc_item(slug, &mut item_ids)),
                skill: conn
                    .unlock_skill
                    .as_deref()
                    .and_then(parse_skill)
                    .map(|sk| (sk, conn.unlock_dc.unwrap_or(12))),
            })
        } else {
            None
        };
        connections.push(LocationConnection {
            id: ConnectionId::new(),
            game_id,
            source_location_id: from_id,
            target_location_id: to_id,
            direction,
            description: conn.description.clone(),
            is_locked: lock.is_some(),
            lock: lock.clone(),
        });
        if conn.bidirectional {
            connections.push(LocationConnection {
                id: ConnectionId::new(),
                game_id,
                source_location_id: to_id,
                target_location_id: from_id,
                direction: direction.opposite(),
                description: conn.description.clone(),
                is_locked: lock.is_some(),
                lock,
            });
        }
    }

    let mut entity_ids: HashMap<String, EntityId> = HashMap::new();
    for npc in &bundle.npcs {
        entity_ids.insert(npc.slug.clone(), EntityId::new());
    }

    let mut entities = Vec::new();
    for npc in &bundle.npcs {
        let current_location_id = npc
            .location_slug
            .as_ref()
            .and_then(|slug| location_ids.get(slug))
            .copied()
            .unwrap_or_else(LocationId::new);

        let ability_scores = npc
            .ability_scores
            .iter()
            .filter_map(|(k, v)| parse_ability(k).map(|a| (a, *v)))
            .collect::<HashMap<_, _>>();

        entities.push(Entity {
            id: entity_ids[&npc.slug],
            game_id,
            name: npc.name.clone(),
            ability_scores,
            hp_current: npc.hp_max,
            hp_max: npc.hp_max,
            armor_class: npc.armor_class,
            attacks: npc
                .attacks
                .iter()
                .map(|a| AttackDef {
                    name: a.name.clone(),
                    attack_bonus: a.attack_bonus,
                    damage_dice: a.damage_dice.clone(),
                    damage_type: a.damage_type.clone(),
                })
                .collect(),
            behavior_tags: npc.behavior_tags.iter().cloned().collect(),
            loot_table: Vec::new(),
            is_hostile: npc.is_hostile,
            is_alive: true,
            faction_id: npc.faction.as_deref().and_then(|slug| resolve_faction(factions, slug)),
            schedule: HashMap::new(),
            unavailable_periods: Default::default(),
            current_location_id,
            level: npc.level,
            active_conditions: Vec::new(),
            quest_hook: npc.quest_hook.clone(),
            expires_at_time: None,
            generated: false,
        });
    }

    let quests = bundle
        .quests
        .iter()
        .map(|q| Quest {
            id: QuestId::new(),
            game_id,
            name: q.name.clone(),
            status: QuestStatus::Available,
            objectives: q
                .objectives
                .iter()
                .map(|o| QuestObjective {
                    description: o.clone(),
                    is_complete: false,
                })
                .collect(),
            quest_giver_id: q.quest_giver_slug.as_ref().and_then(|slug| entity_ids.get(slug)).copied(),
            rewards: QuestRewards {
                gold: q.reward_gold,
                xp: q.reward_xp,
            },
            chain_depth: 0,
            allows_followup: true,
            generated: false,
            npc_motivation: None,
        })
        .collect();

    Ok(InstantiatedRegion {
        region,
        locations,
        connections,
        entities,
        quests,
        shops: bundle.shops.clone(),
        location_ids,
        entity_ids,
    })
}

/// Build a level-1 `Character` from a race/class pair using the standard
/// ability array in `STR, DEX, CON, INT, WIS, CHA` order, plus the race's
/// flat bonuses. Hit points are the class hit die's max roll plus the
/// Constitution modifier, matching first-level max-HP conventions.
pub fn instantiate_character(
    game_id: GameId,
    name: impl Into<String>,
    race: &RaceDef,
    class: &ClassDef,
    start_location: LocationId,
) -> EngineResult<Character> {
    use wrldcore_domain::rules::ability_scores::STANDARD_ARRAY;

    let mut ability_scores = HashMap::new();
    for (ability, base) in Ability::ALL.iter().zip(STANDARD_ARRAY) {
        let bonus = race.ability_bonuses.get(ability.as_str()).copied().unwrap_or(0);
        ability_scores.insert(*ability, base + bonus);
    }

    let hit_die = DiceFormula::parse(&class.hit_die).map_err(|e| EngineError::SchemaFailure(format!("class {} has an invalid hit_die: {e}", class.id)))?;
    let con_modifier = wrldcore_domain::rules::ability_scores::modifier(ability_scores[&Ability::Constitution]);
    let hp_max = (hit_die.max_roll() + con_modifier).max(1);

    let spellcasting_ability = class.spellcasting_ability.as_deref().and_then(parse_ability);

    let mut class_levels = HashMap::new();
    class_levels.insert(class.id.clone(), 1);

    Ok(Character {
        id: CharacterId::new(),
        game_id,
        name: name.into(),
        ability_scores,
        hp_current: hp_max,
        hp_max,
        hp_temporary: 0,
        armor_class: 10 + con_modifier,
        proficiency_bonus: 2,
        level: 1,
        xp: 0,
        class_levels,
        skill_proficiencies: Default::default(),
        saving_throw_proficiencies: Default::default(),
        equipped_weapon_id: None,
        equipped_armor_id: None,
        active_conditions: Vec::new(),
        hit_dice_remaining: 1,
        speed: 30,
        gold: 50,
        needs: Needs {
            hunger: 100,
            thirst: 100,
            warmth: 100,
            morale: 100,
        },
        spellcasting_ability,
        spell_slots_max: HashMap::new(),
        spell_slots_remaining: HashMap::new(),
        concentration_spell_id: None,
        wounds: Vec::new(),
        size: "medium".to_string(),
        origin_id: None,
        class_resources: HashMap::new(),
        current_location_id: start_location,
        known_spells: Default::default(),
        prepared_spells: Default::default(),
        custom_spells: Vec::new(),
    })
}

fn parse_ability(name: &str) -> Option<Ability> {
    Ability::ALL.into_iter().find(|a| a.as_str().eq_ignore_ascii_case(name))
}
