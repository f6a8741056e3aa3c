//! State capture and rewind. A capture bundles the game into five JSON
//! partitions (player, inventory, world, quest, social); a restore rehydrates
//! whichever of those a [`RestoreConfig`] calls for and always branches the
//! game onto a new timeline, so the turns since the snapshot stay in the
//! ledger for audit without polluting the active-timeline view.
//!
//! The five capture partitions don't line up one-to-one with the six
//! restore-policy switches (`player`/`inventory`/`spells`/`reputation`/
//! `bounties`/`companions`): `player` and `spells` both read and write the
//! same `Character` row, split along which of its fields each governs.
//! `world_state` (entities, shops, housing) and `quest_state` carry no
//! switch of their own — a rewind always returns the physical world and
//! quest log to the snapshot's moment, since the spec's restore table never
//! names them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use wrldcore_domain::ids::{CharacterId, GameId, LocationId, SnapshotId};
use wrldcore_domain::model::character::Character;
use wrldcore_domain::model::companion::{Companion, Housing};
use wrldcore_domain::model::event::{EventType, GameEvent};
use wrldcore_domain::model::inventory::{Entity, Inventory};
use wrldcore_domain::model::quest::Quest;
use wrldcore_domain::model::reputation::{Bounty, FactionReputation, NpcReputation};
use wrldcore_domain::model::shop::Shop;
use wrldcore_domain::model::snapshot::{RestoreConfig, RestoreFieldPolicy, RewindTrigger, Snapshot};
use wrldcore_domain::model::traits::CharacterTrait;

use crate::error::{EngineError, EngineResult};
use crate::store::{repos, DataStore};

#[derive(Serialize, Deserialize)]
struct PlayerBlob {
    character: Character,
    traits: Vec<CharacterTrait>,
}

#[derive(Serialize, Deserialize)]
struct WorldBlob {
    entities: Vec<Entity>,
    shops: Vec<Shop>,
    housing: Vec<Housing>,
}

#[derive(Serialize, Deserialize)]
struct SocialBlob {
    companions: Vec<Companion>,
    faction_reputations: Vec<FactionReputation>,
    npc_reputations: Vec<NpcReputation>,
    bounties: Vec<Bounty>,
}

fn to_value<T: Serialize>(value: &T) -> EngineResult<Value> {
    serde_json::to_value(value).map_err(|e| EngineError::SchemaFailure(e.to_string()))
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> EngineResult<T> {
    serde_json::from_value(value).map_err(|e| EngineError::SchemaFailure(e.to_string()))
}

/// Capture the current state of `game_id` into a new [`Snapshot`] row, then
/// prune older snapshots back to `retain`.
pub async fn capture(
    store: &DataStore,
    game_id: GameId,
    character_id: CharacterId,
    turn_number: i64,
    world_time: i32,
    location_id: LocationId,
    trigger: RewindTrigger,
    retain: i64,
) -> EngineResult<Snapshot> {
    let pool = store.pool();

    let character = repos::character::get(pool, character_id).await?;
    let traits = repos::trait_repo::list_for_character(pool, game_id, character_id).await?;
    let player_state = to_value(&PlayerBlob { character, traits })?;

    let inventory = repos::inventory::get(pool, &character_id.to_string()).await?;
    let inventory_state = to_value(&inventory)?;

    let entities = repos::entity::list_for_game(pool, game_id).await?;
    let shops = repos::shop::list_for_game(pool, game_id).await?;
    let housing = repos::housing::list_for_character(pool, game_id, character_id).await?;
    let world_state = to_value(&WorldBlob { entities, shops, housing })?;

    let quests = repos::quest::list_for_game(pool, game_id).await?;
    let quest_state = to_value(&quests)?;

    let companions = repos::companion::list_for_game(pool, game_id).await?;
    let faction_reputations = repos::reputation::list_faction_reputation(pool, game_id).await?;
    let npc_reputations = repos::reputation::list_npc_reputation(pool, game_id).await?;
    let bounties = repos::reputation::list_bounties(pool, game_id).await?;
    let social_state = to_value(&SocialBlob {
        companions,
        faction_reputations,
        npc_reputations,
        bounties,
    })?;

    let snapshot = Snapshot {
        id: SnapshotId::new(),
        game_id,
        turn_number,
        world_time,
        timestamp: chrono::Utc::now(),
        trigger,
        location_id,
        player_state,
        inventory_state,
        world_state,
        quest_state,
        social_state,
        metadata: Value::Null,
    };

    repos::snapshot::save(pool, &snapshot).await?;
    repos::snapshot::prune(pool, game_id, retain).await?;

    Ok(snapshot)
}

/// Restore `game_id` from `snapshot` per `config`, branching the game onto
/// `new_timeline_id`. Everything not gated by `config` (world state, quest
/// log) is restored unconditionally; events already on the ledger are never
/// touched, only the game's `timeline_id` going forward.
pub async fn restore(store: &DataStore, game_id: GameId, character_id: CharacterId, snapshot: &Snapshot, config: RestoreConfig, new_timeline_id: String) -> EngineResult<()> {
    let player_blob: PlayerBlob = from_value(snapshot.player_state.clone())?;
    let inventory: Inventory = from_value(snapshot.inventory_state.clone())?;
    let world_blob: WorldBlob = from_value(snapshot.world_state.clone())?;
    let quests: Vec<Quest> = from_value(snapshot.quest_state.clone())?;
    let social_blob: SocialBlob = from_value(snapshot.social_state.clone())?;

    let mut tx = store.transaction().await?;

    if config.player == RestoreFieldPolicy::Lose || config.spells == RestoreFieldPolicy::Lose {
        let mut character = repos::character::get(&mut *tx, character_id).await?;
        if config.player == RestoreFieldPolicy::Lose {
            apply_player_fields(&mut character, &player_blob.character);
        }
        if config.spells == RestoreFieldPolicy::Lose {
            apply_spell_fields(&mut character, &player_blob.character);
        }
        repos::character::save(&mut *tx, &character).await?;
    }
    if config.player == RestoreFieldPolicy::Lose {
        for character_trait in &player_blob.traits {
            repos::trait_repo::save(&mut *tx, character_trait, snapshot.turn_number).await?;
        }
    }

    if config.inventory == RestoreFieldPolicy::Lose {
        repos::inventory::save(&mut *tx, game_id, &inventory).await?;
    }

    if config.reputation == RestoreFieldPolicy::Lose {
        repos::reputation::clear_all_for_game(&mut *tx, game_id).await?;
        repos::reputation::clear_npc_reputation_for_game(&mut *tx, game_id).await?;
        for rep in &social_blob.faction_reputations {
            repos::reputation::set_faction_reputation(&mut *tx, rep).await?;
        }
        for rep in &social_blob.npc_reputations {
            repos::reputation::set_npc_reputation(&mut *tx, rep).await?;
        }
    }

    if config.bounties == RestoreFieldPolicy::Lose {
        repos::reputation::clear_bounties_for_game(&mut *tx, game_id).await?;
        for bounty in &social_blob.bounties {
            repos::reputation::set_bounty(&mut *tx, bounty).await?;
        }
    }

    if config.companions == RestoreFieldPolicy::Lose {
        repos::companion::clear_for_game(&mut *tx, game_id).await?;
        for companion in &social_blob.companions {
            repos::companion::save(&mut *tx, companion).await?;
        }
    }

    // World state and the quest log always snap back to the moment captured;
    // the spec's restore table never gates them.
    for entity in &world_blob.entities {
        repos::entity::save(&mut *tx, entity).await?;
    }
    for shop in &world_blob.shops {
        repos::shop::save(&mut *tx, shop).await?;
    }
    for housing in &world_blob.housing {
        repos::housing::save(&mut *tx, housing).await?;
    }

    repos::quest::clear_for_game(&mut *tx, game_id).await?;
    for quest in &quests {
        repos::quest::save(&mut *tx, quest).await?;
    }

    let mut game = repos::game::get(&mut *tx, game_id).await?;
    game.turn_number = snapshot.turn_number;
    game.world_time = snapshot.world_time;
    game.current_location_id = snapshot.location_id;
    game.loop_count += 1;
    game.timeline_id = new_timeline_id.clone();
    repos::game::save(&mut *tx, &game).await?;

    repos::event::append(
        &mut *tx,
        &GameEvent::new(game_id, snapshot.turn_number, EventType::TimeTravel, "Time unravels and resets.")
            .with_location(snapshot.location_id)
            .with_timeline(new_timeline_id),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Fields `RestoreConfig::player` governs: everything but the spellcasting
/// state, which `spells` governs independently on the same row.
fn apply_player_fields(current: &mut Character, captured: &Character) {
    current.ability_scores = captured.ability_scores.clone();
    current.hp_current = captured.hp_current;
    current.hp_max = captured.hp_max;
    current.hp_temporary = captured.hp_temporary;
    current.armor_class = captured.armor_class;
    current.proficiency_bonus = captured.proficiency_bonus;
    current.level = captured.level;
    current.xp = captured.xp;
    current.class_levels = captured.class_levels.clone();
    current.skill_proficiencies = captured.skill_proficiencies.clone();
    current.saving_throw_proficiencies = captured.saving_throw_proficiencies.clone();
    current.equipped_weapon_id = captured.equipped_weapon_id;
    current.equipped_armor_id = captured.equipped_armor_id;
    current.active_conditions = captured.active_conditions.clone();
    current.hit_dice_remaining = captured.hit_dice_remaining;
    current.speed = captured.speed;
    current.gold = captured.gold;
    current.needs = captured.needs.clone();
    current.wounds = captured.wounds.clone();
    current.size = captured.size.clone();
    current.origin_id = captured.origin_id.clone();
    current.class_resources = captured.class_resources.clone();
    current.current_location_id = captured.current_location_id;
}

fn apply_spell_fields(current: &mut Character, captured: &Character) {
    current.spellcasting_ability = captured.spellcasting_ability;
    current.spell_slots_max = captured.spell_slots_max.clone();
    current.spell_slots_remaining = captured.spell_slots_remaining.clone();
    current.concentration_spell_id = captured.concentration_spell_id.clone();
    current.known_spells = captured.known_spells.clone();
    current.prepared_spells = captured.prepared_spells.clone();
    current.custom_spells = captured.custom_spells.clone();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_policy_keeps_player_and_spells() {
        let config = RestoreConfig::for_trigger(RewindTrigger::Artifact);
        assert_eq!(config.player, RestoreFieldPolicy::Keep);
        assert_eq!(config.spells, RestoreFieldPolicy::Keep);
        assert_eq!(config.companions, RestoreFieldPolicy::Lose);
    }

    #[test]
    fn full_reset_policy_loses_everything() {
        let config = RestoreConfig::for_trigger(RewindTrigger::FullReset);
        assert_eq!(config.player, RestoreFieldPolicy::Lose);
        assert_eq!(config.inventory, RestoreFieldPolicy::Lose);
    }
}
