//! Declarative content-bundle shapes: races, classes, regions, items,
//! spells, factions, stories, origins. The core reads the fields named here;
//! anything else in an authored file is preserved opaquely in `properties`
//! rather than rejected, so content authors can add fields the core doesn't
//! know about yet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RaceDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ability_bonuses: HashMap<String, i32>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClassDef {
    pub id: String,
    pub name: String,
    pub hit_die: String,
    #[serde(default)]
    pub spellcasting_ability: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegionDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level_range_min: i32,
    pub level_range_max: i32,
    pub climate: String,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub item_type: String,
    #[serde(default)]
    pub base_price: i32,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpellDef {
    pub id: String,
    pub name: String,
    pub level: i32,
    #[serde(default)]
    pub is_cantrip: bool,
    #[serde(default)]
    pub is_concentration: bool,
    #[serde(default)]
    pub damage_dice: Option<String>,
    #[serde(default)]
    pub damage_type: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FactionDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub opposing_factions: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoryDef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecipeIngredient {
    pub item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecipeDef {
    pub id: String,
    pub name: String,
    pub trade_skill: String,
    pub dc: i32,
    #[serde(default)]
    pub inputs: Vec<RecipeIngredient>,
    pub output_item_id: String,
    #[serde(default = "default_output_quantity")]
    pub output_quantity: i32,
    #[serde(default = "default_true")]
    pub consumes_on_failure: bool,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

fn default_output_quantity() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OriginDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub starting_gold: i32,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}
