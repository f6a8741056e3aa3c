//! Places. Connections between locations are a separate, directional relation
//! so that a one-way passage never needs a phantom reverse edge in `Location`
//! itself; `ExplorationSystem` resolves movement entirely through
//! `LocationConnection` lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ConnectionId, GameId, ItemId, LocationId, RegionId};
use crate::rules::skills::Skill;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub game_id: GameId,
    pub name: String,
    pub region_id: RegionId,
    pub description: String,
    pub location_type: String,
    pub items: Vec<ItemId>,
    pub visited: bool,
    /// Unknown content-authoring fields preserved opaquely.
    pub properties: HashMap<String, serde_json::Value>,
    /// Set when the Director conjured this location rather than an authored
    /// content bundle.
    #[serde(default)]
    pub generated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
    In,
    Out,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }

    pub fn parse(s: &str) -> Option<Direction> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Direction::North),
            "south" | "s" => Some(Direction::South),
            "east" | "e" => Some(Direction::East),
            "west" | "w" => Some(Direction::West),
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// Permits either a required key item or a skill check against a DC;
/// `ExplorationSystem` tries the key item first, falling back to the skill
/// check only if no key is configured or the actor doesn't hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSpec {
    pub key_item_id: Option<ItemId>,
    pub skill: Option<(Skill, u8)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConnection {
    pub id: ConnectionId,
    pub game_id: GameId,
    pub source_location_id: LocationId,
    pub target_location_id: LocationId,
    pub direction: Direction,
    pub description: String,
    pub is_locked: bool,
    pub lock: Option<LockSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub game_id: GameId,
    pub name: String,
    pub description: String,
    pub level_range_min: i32,
    pub level_range_max: i32,
    pub climate: crate::rules::survival::Climate,
    pub faction: Option<String>,
}
