//! Ledger events. `GameEvent` is append-only by contract: the engine's
//! `EventLedgerRepo` enforces it with a trigger that aborts any UPDATE or
//! DELETE, so this type has no setters beyond construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{EventId, GameId, LocationId};
use crate::model::game::DEFAULT_TIMELINE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Move,
    Discovery,
    Attack,
    Damage,
    Death,
    CombatStart,
    CombatEnd,
    SpellCast,
    SpellConcentrationLost,
    ItemPickup,
    ItemDrop,
    ItemUse,
    ItemStored,
    ItemRetrieved,
    Equip,
    Unequip,
    ExplorationFail,
    CreativeAction,
    TimeTravel,
    TurnCompleted,
    QuestOffered,
    QuestCompleted,
    QuestFailed,
    ReputationChange,
    TraitAwarded,
    WorldEvent,
    Error,
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: EventId,
    pub game_id: GameId,
    pub event_type: EventType,
    pub turn_number: i64,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Option<String>,
    pub target_id: Option<String>,
    pub location_id: Option<LocationId>,
    pub description: String,
    pub mechanical_details: Value,
    pub is_canonical: bool,
    pub timeline_id: String,
}

impl GameEvent {
    pub fn new(game_id: GameId, turn_number: i64, event_type: EventType, description: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            game_id,
            event_type,
            turn_number,
            timestamp: Utc::now(),
            actor_id: None,
            target_id: None,
            location_id: None,
            description: description.into(),
            mechanical_details: Value::Null,
            is_canonical: true,
            timeline_id: DEFAULT_TIMELINE.to_string(),
        }
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_location(mut self, location_id: LocationId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.mechanical_details = details;
        self
    }

    pub fn with_timeline(mut self, timeline_id: impl Into<String>) -> Self {
        self.timeline_id = timeline_id.into();
        self
    }
}
