//! Combat is materialized only while active: the combatant block is built
//! fresh from `Character` + alive `Entity` rows at initiative time, so
//! there's no long-lived duplicate of character/entity state to drift.

use serde::{Deserialize, Serialize};

use crate::ids::{CombatId, GameId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatState {
    Inactive,
    InitiativeRolled,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// `Character` or `Entity` id, stringified — combat addresses both
    /// uniformly the same way the action dispatcher's `ActorId` does.
    pub id: String,
    pub is_player_side: bool,
    pub initiative: i32,
    pub is_alive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatInstance {
    pub id: CombatId,
    pub game_id: GameId,
    pub state: CombatState,
    pub round_number: i32,
    pub current_turn_index: usize,
    pub combatants: Vec<Combatant>,
    pub turn_order: Vec<String>,
}

impl CombatInstance {
    pub fn is_active(&self) -> bool {
        matches!(self.state, CombatState::InitiativeRolled | CombatState::InProgress)
    }

    pub fn current_actor(&self) -> Option<&str> {
        if self.is_active() {
            self.turn_order.get(self.current_turn_index).map(|s| s.as_str())
        } else {
            None
        }
    }

    pub fn is_actors_turn(&self, actor_id: &str) -> bool {
        self.current_actor() == Some(actor_id)
    }

    pub fn player_side_alive(&self) -> bool {
        self.combatants.iter().any(|c| c.is_player_side && c.is_alive)
    }

    pub fn enemy_side_alive(&self) -> bool {
        self.combatants.iter().any(|c| !c.is_player_side && c.is_alive)
    }

    /// Advance to the next alive combatant's turn, wrapping the round.
    pub fn advance_turn(&mut self) {
        if self.turn_order.is_empty() {
            return;
        }
        loop {
            self.current_turn_index += 1;
            if self.current_turn_index >= self.turn_order.len() {
                self.current_turn_index = 0;
                self.round_number += 1;
            }
            let actor = &self.turn_order[self.current_turn_index];
            let alive = self
                .combatants
                .iter()
                .find(|c| &c.id == actor)
                .map(|c| c.is_alive)
                .unwrap_or(false);
            if alive || !self.combatants.iter().any(|c| c.is_alive) {
                break;
            }
        }
    }
}
