//! Faction/NPC standing ledgers and regional bounties. Values are clamped to
//! `[-100, 100]` at every mutation (`rules::reputation::clamp_reputation`);
//! bounty is clamped to `>= 0`.

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, FactionId, GameId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionReputation {
    pub game_id: GameId,
    pub faction_id: FactionId,
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcReputation {
    pub game_id: GameId,
    pub entity_id: EntityId,
    /// Affinity score, 0-100 (see `rules::affinity`).
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    pub game_id: GameId,
    pub region: String,
    pub amount: i32,
}

impl Bounty {
    pub fn decay(&mut self, amount: i32) {
        self.amount = (self.amount - amount).max(0);
    }
}
