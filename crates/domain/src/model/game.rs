//! The top-level aggregate root. A `Game` owns every other entity in this
//! module; deleting it cascades (see `DataStore::delete_game` in the engine
//! crate, which is the one place the event ledger's append-only trigger is
//! temporarily lifted).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, GameId, LocationId};

pub const DEFAULT_TIMELINE: &str = "prime";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub turn_number: i64,
    pub current_location_id: LocationId,
    pub character_id: CharacterId,
    /// Minutes since game start. `MINUTES_PER_TURN` (10) is added every turn.
    pub world_time: i32,
    pub loop_count: i32,
    pub timeline_id: String,
    pub is_active: bool,
}

impl Game {
    pub fn new(name: impl Into<String>, character_id: CharacterId, start_location: LocationId) -> Self {
        Self {
            id: GameId::new(),
            name: name.into(),
            created_at: Utc::now(),
            turn_number: 0,
            current_location_id: start_location,
            character_id,
            world_time: 0,
            loop_count: 0,
            timeline_id: DEFAULT_TIMELINE.to_string(),
            is_active: true,
        }
    }
}
