//! Director-planned future content: a quest hook, a pacing opportunity, or a
//! pending follow-up the Director noted for itself on a previous turn and may
//! act on later. Plain data — the Director decides what an `intent_type`
//! means; the store just persists and lists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{GameId, IntentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub game_id: GameId,
    pub intent_type: String,
    pub description: String,
    pub data: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intent {
    pub fn new(game_id: GameId, intent_type: impl Into<String>, description: impl Into<String>, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: IntentId::new(),
            game_id,
            intent_type: intent_type.into(),
            description: description.into(),
            data,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
