use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, GameId, QuestId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Available,
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjective {
    pub description: String,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub game_id: GameId,
    pub name: String,
    pub status: QuestStatus,
    pub objectives: Vec<QuestObjective>,
    pub quest_giver_id: Option<EntityId>,
    pub rewards: QuestRewards,
    /// How many chained follow-up quests this one has already spawned.
    /// `Director` follow-up generation stops at chain depth 3.
    pub chain_depth: i32,
    pub allows_followup: bool,
    #[serde(default)]
    pub generated: bool,
    /// Short LLM-authored rationale for why the giver wants this done;
    /// populated only for Director-generated quests.
    #[serde(default)]
    pub npc_motivation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestRewards {
    pub gold: i32,
    pub xp: i32,
}

impl Quest {
    pub fn is_complete(&self) -> bool {
        self.objectives.iter().all(|o| o.is_complete)
    }
}
