//! Snapshots: structural captures of game state, partitioned into five blobs
//! plus a metadata header, and the restore configuration that decides which
//! partitions survive a rewind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{GameId, LocationId, SnapshotId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewindTrigger {
    Artifact,
    Death,
    FullReset,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub game_id: GameId,
    pub turn_number: i64,
    pub world_time: i32,
    pub timestamp: DateTime<Utc>,
    pub trigger: RewindTrigger,
    pub location_id: LocationId,
    pub player_state: Value,
    pub inventory_state: Value,
    pub world_state: Value,
    pub quest_state: Value,
    pub social_state: Value,
    pub metadata: Value,
}

/// Whether a restore keeps the current game state for a partition or
/// overwrites it ("loses" progress) with the snapshot's captured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreFieldPolicy {
    Keep,
    Lose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreConfig {
    pub player: RestoreFieldPolicy,
    pub inventory: RestoreFieldPolicy,
    pub spells: RestoreFieldPolicy,
    pub reputation: RestoreFieldPolicy,
    pub bounties: RestoreFieldPolicy,
    pub companions: RestoreFieldPolicy,
}

impl RestoreConfig {
    /// Artifact/death outcomes keep player + spells, lose the rest;
    /// full_reset loses everything.
    pub fn for_trigger(trigger: RewindTrigger) -> Self {
        use RestoreFieldPolicy::{Keep, Lose};
        match trigger {
            RewindTrigger::Artifact => Self {
                player: Keep,
                inventory: Keep,
                spells: Keep,
                reputation: Lose,
                bounties: Lose,
                companions: Lose,
            },
            RewindTrigger::Death => Self {
                player: Keep,
                inventory: Lose,
                spells: Keep,
                reputation: Lose,
                bounties: Lose,
                companions: Lose,
            },
            RewindTrigger::FullReset | RewindTrigger::Manual => Self {
                player: Lose,
                inventory: Lose,
                spells: Lose,
                reputation: Lose,
                bounties: Lose,
                companions: Lose,
            },
        }
    }
}
