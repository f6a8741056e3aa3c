//! The data model: every entity a game owns, named with an explicit structured
//! type per field rather than a generic mapping or sequence. Every cross-entity reference is a stable id
//! from `crate::ids`, never an embedded object, so cycles (game owns character,
//! character references inventory, entities reference locations and factions,
//! connections reference two locations) never need to exist in memory.

pub mod action;
pub mod character;
pub mod combat;
pub mod companion;
pub mod content_defs;
pub mod event;
pub mod game;
pub mod intent;
pub mod inventory;
pub mod location;
pub mod progression;
pub mod quest;
pub mod reputation;
pub mod shop;
pub mod snapshot;
pub mod traits;

pub use action::{Action, ActionResult, DiceRollRecord, GameContext, Mutation};
pub use character::{Character, CharacterClassLevels, ClassResourceState};
pub use combat::{Combatant, CombatInstance, CombatState};
pub use companion::{Companion, Housing, HousingStorage};
pub use content_defs::{
    ClassDef, FactionDef, ItemDef, OriginDef, RaceDef, RegionDef, SpellDef, StoryDef,
};
pub use event::GameEvent;
pub use game::Game;
pub use intent::Intent;
pub use inventory::{Entity, Inventory, ItemStack, Schedule};
pub use location::{Location, LocationConnection, Region};
pub use progression::{
    CustomSpell, DiscoveredCombination, KnownRecipe, KnownSpell, PreparedSpell, TradeSkill,
};
pub use quest::Quest;
pub use reputation::{Bounty, FactionReputation, NpcReputation};
pub use shop::{Shop, ShopStock};
pub use snapshot::{RestoreConfig, RestoreFieldPolicy, RewindTrigger, Snapshot};
pub use traits::{BehaviorEvent, CharacterTrait};
