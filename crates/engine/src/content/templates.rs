//! World templates: the shapes content authors write for a region's locations,
//! connections, NPCs, quests, and shops. Templates reference each other by
//! author-chosen string slugs rather than generated ids — `instantiate_region`
//! resolves slugs to fresh ids when a new game is created from a bundle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegionTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level_range_min: i32,
    #[serde(default)]
    pub level_range_max: i32,
    #[serde(default = "default_climate")]
    pub climate: String,
    #[serde(default)]
    pub faction: Option<String>,
}

fn default_climate() -> String {
    "temperate".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationTemplate {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_location_type")]
    pub location_type: String,
    #[serde(default)]
    pub starting_items: Vec<String>,
    #[serde(default)]
    pub is_starting_location: bool,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

fn default_location_type() -> String {
    "generic".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionTemplate {
    pub from: String,
    pub to: String,
    pub direction: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub key_item_id: Option<String>,
    #[serde(default)]
    pub unlock_skill: Option<String>,
    #[serde(default)]
    pub unlock_dc: Option<u8>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NpcTemplate {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub location_slug: Option<String>,
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default = "default_hp")]
    pub hp_max: i32,
    #[serde(default = "default_ac")]
    pub armor_class: i32,
    #[serde(default)]
    pub ability_scores: HashMap<String, i32>,
    #[serde(default)]
    pub attacks: Vec<NpcAttackTemplate>,
    #[serde(default)]
    pub is_hostile: bool,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub behavior_tags: Vec<String>,
    #[serde(default)]
    pub quest_hook: Option<String>,
}

fn default_level() -> i32 {
    1
}
fn default_hp() -> i32 {
    8
}
fn default_ac() -> i32 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NpcAttackTemplate {
    pub name: String,
    pub attack_bonus: i32,
    pub damage_dice: String,
    pub damage_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuestTemplate {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub quest_giver_slug: Option<String>,
    #[serde(default)]
    pub reward_gold: i32,
    #[serde(default)]
    pub reward_xp: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopTemplate {
    pub npc_slug: String,
    #[serde(default)]
    pub stock: Vec<ShopStockTemplate>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopStockTemplate {
    pub item_id: String,
    pub quantity: i32,
    #[serde(default)]
    pub price_override: Option<i32>,
}
