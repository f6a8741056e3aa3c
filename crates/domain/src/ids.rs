//! Stable identifiers. Every cross-entity reference in the data model is one of
//! these, never an embedded object — that's how the model's cycles (game owns
//! character, character references inventory, entities reference locations and
//! factions, connections reference two locations) are broken.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(self) -> Uuid {
                self.0
            }

            /// A stable id derived from a content slug (e.g. an `ItemDef.id`
            /// like `"rations"`), so the same authored item resolves to the
            /// same runtime id in every game without a separate registry.
            pub fn from_content_slug(slug: &str) -> Self {
                const NAMESPACE: Uuid = Uuid::from_bytes([
                    0x9e, 0x4a, 0x3c, 0x1f, 0x7b, 0x2d, 0x4e, 0x61, 0x8a, 0x0c, 0x5f, 0x3a, 0x6b, 0x2e, 0x9d, 0x71,
                ]);
                Self(Uuid::new_v5(&NAMESPACE, slug.as_bytes()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(GameId);
define_id!(CharacterId);
define_id!(EntityId);
define_id!(LocationId);
define_id!(ConnectionId);
define_id!(RegionId);
define_id!(QuestId);
define_id!(CombatId);
define_id!(EventId);
define_id!(SnapshotId);
define_id!(ItemId);
define_id!(FactionId);
define_id!(CompanionId);
define_id!(HousingId);
define_id!(TraitId);
define_id!(IntentId);
define_id!(RecipeId);
define_id!(SpellId);
define_id!(ShopId);

/// An entity id narrowed to the "actor" role: a character, a companion, or an NPC entity.
/// Kept as a plain string at the boundary because actors are addressed uniformly by the
/// action dispatcher regardless of which repository ultimately owns them.
pub type ActorId = String;
